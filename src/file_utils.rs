use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Replace a file's content so readers never observe a partial write
    ///
    /// The content goes to a sibling temporary file first, which is then
    /// renamed over the target.
    pub fn replace_file<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            Self::ensure_dir(parent)?;
        }

        let staging = Self::staging_path(path);
        fs::write(&staging, content)
            .with_context(|| format!("Failed to write staging file: {:?}", staging))?;
        fs::rename(&staging, path)
            .with_context(|| format!("Failed to move {:?} into place at {:?}", staging, path))?;

        Ok(())
    }

    // @returns: Hidden sibling path used while replacing `path`
    fn staging_path(path: &Path) -> PathBuf {
        let file_name = path.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        path.with_file_name(format!(".{}.partial", file_name))
    }
}
