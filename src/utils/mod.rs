pub mod file;
pub mod text;
pub mod time;

pub use file::{list_csv_files, FileEntry};
pub use text::{format_compact, truncate_to_width};
pub use time::{clock_label, format_file_modified};
