use std::fs::{self, FileTimes, OpenOptions};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Abstract interface for file system operations.
pub trait FileSystem: Send + Sync {
    /// Read the raw bytes of a file. Decoding is left to the caller.
    fn read_bytes(&self, path: &Path) -> std::io::Result<Vec<u8>>;

    /// Replace the contents of a file with UTF-8 text.
    fn write_string(&self, path: &Path, content: &str) -> std::io::Result<()>;

    /// Replace the contents of a file with already-encoded bytes.
    fn write_bytes(&self, path: &Path, content: &[u8]) -> std::io::Result<()>;

    /// Copy a file, keeping its permissions and timestamps.
    /// Parent directories of `to` are created on demand.
    fn copy_preserving(&self, from: &Path, to: &Path) -> std::io::Result<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn create_dir_all(&self, path: &Path) -> std::io::Result<()>;

    /// List files with the given extension under `root`, sorted by path.
    /// Only the top level is listed unless `recursive` is set.
    fn list_files(&self, root: &Path, extension: &str, recursive: bool) -> Vec<PathBuf>;
}

/// Standard implementation of FileSystem using std::fs and walkdir.
pub struct PhysicalFileSystem;

impl FileSystem for PhysicalFileSystem {
    fn read_bytes(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write_string(&self, path: &Path, content: &str) -> std::io::Result<()> {
        fs::write(path, content)
    }

    fn write_bytes(&self, path: &Path, content: &[u8]) -> std::io::Result<()> {
        fs::write(path, content)
    }

    fn copy_preserving(&self, from: &Path, to: &Path) -> std::io::Result<()> {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        // fs::copy carries permission bits over; timestamps need a second step.
        fs::copy(from, to)?;

        let meta = fs::metadata(from)?;
        let mut times = FileTimes::new();
        if let Ok(modified) = meta.modified() {
            times = times.set_modified(modified);
        }
        if let Ok(accessed) = meta.accessed() {
            times = times.set_accessed(accessed);
        }
        OpenOptions::new().write(true).open(to)?.set_times(times)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        fs::create_dir_all(path)
    }

    fn list_files(&self, root: &Path, extension: &str, recursive: bool) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .max_depth(if recursive { usize::MAX } else { 1 });

        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext == extension {
                        files.push(path.to_path_buf());
                    }
                }
            }
        }

        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_files_respects_depth() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("b.md"), "b").unwrap();
        fs::write(root.join("a.md"), "a").unwrap();
        fs::write(root.join("notes.txt"), "x").unwrap();
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("sub").join("c.md"), "c").unwrap();

        let flat = PhysicalFileSystem.list_files(root, "md", false);
        assert_eq!(flat, vec![root.join("a.md"), root.join("b.md")]);

        let deep = PhysicalFileSystem.list_files(root, "md", true);
        assert_eq!(deep.len(), 3);
        assert!(deep.contains(&root.join("sub").join("c.md")));
    }

    #[test]
    fn test_copy_preserving_keeps_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src.md");
        fs::write(&src, "content").unwrap();
        let old = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_600_000_000);
        OpenOptions::new()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(old)
            .unwrap();

        let dst = temp_dir.path().join("deep").join("dir").join("dst.md");
        PhysicalFileSystem.copy_preserving(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(&dst).unwrap(), "content");
        assert_eq!(fs::metadata(&dst).unwrap().modified().unwrap(), old);
    }
}
