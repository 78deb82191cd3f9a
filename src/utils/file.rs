use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Metadata for a CSV file offered by the upload picker.
#[derive(Clone, Debug)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub modified: SystemTime,
    pub size: u64,
}

impl FileEntry {
    pub fn size_kb(&self) -> f64 {
        self.size as f64 / 1024.0
    }
}

/// Files in `dir` whose extension is `.csv` (any case), newest first.
///
/// An unreadable directory yields an empty list.
pub fn list_csv_files(dir: impl AsRef<Path>) -> Vec<FileEntry> {
    let Ok(read_dir) = fs::read_dir(dir.as_ref()) else {
        return Vec::new();
    };

    let mut entries: Vec<FileEntry> = read_dir
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            let is_csv = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false);
            if !is_csv {
                return None;
            }
            let metadata = entry.metadata().ok().filter(|meta| meta.is_file())?;
            let name = path.file_name()?.to_str()?.to_string();
            Some(FileEntry {
                name,
                modified: metadata.modified().unwrap_or(UNIX_EPOCH),
                size: metadata.len(),
                path,
            })
        })
        .collect();

    entries.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_only_csv_files() {
        let dir = std::env::temp_dir().join(format!("msme-files-{}", std::process::id()));
        fs::create_dir_all(dir.join("nested.csv")).expect("create dirs");
        fs::write(dir.join("a.csv"), "x\n1\n").expect("write a");
        fs::write(dir.join("B.CSV"), "x\n2\n").expect("write b");
        fs::write(dir.join("notes.txt"), "skip").expect("write txt");

        let mut names: Vec<String> = list_csv_files(&dir).into_iter().map(|e| e.name).collect();
        names.sort();

        assert_eq!(names, vec!["B.CSV", "a.csv"]);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_directory_is_empty() {
        assert!(list_csv_files("/definitely/not/here").is_empty());
    }
}
