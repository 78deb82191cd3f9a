use chrono::{DateTime, Local};
use std::time::SystemTime;

pub fn format_file_modified(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// Clock label for status lines such as "Exported at 14:05".
pub fn clock_label() -> String {
    Local::now().format("%H:%M:%S").to_string()
}
