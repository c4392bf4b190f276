use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

// @module: File and directory utilities

/// Extensions treated as XLIFF documents, compared case-insensitively
pub const XLIFF_EXTENSIONS: [&str; 2] = ["xlf", "xliff"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Whether `path` has an XLIFF extension
    pub fn is_xliff_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy();
                XLIFF_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false)
    }

    /// Find XLIFF files under `dir`, recursively, sorted by path
    pub fn find_xliff_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::is_xliff_file(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    // @generates: Output path mirroring the input's position under input_root
    pub fn mirrored_output_path<P1, P2, P3>(
        input_file: P1,
        input_root: P2,
        output_root: P3,
    ) -> Result<PathBuf>
    where
        P1: AsRef<Path>,
        P2: AsRef<Path>,
        P3: AsRef<Path>,
    {
        let input_file = input_file.as_ref();
        let relative = input_file.strip_prefix(input_root.as_ref()).map_err(|_| {
            anyhow!(
                "File {:?} is not inside input folder {:?}",
                input_file,
                input_root.as_ref()
            )
        })?;
        Ok(output_root.as_ref().join(relative))
    }

    /// Write a string to a file atomically: the content goes to a temporary
    /// file in the same directory, which then replaces the destination
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::ensure_dir(&parent)?;

        let mut temp = NamedTempFile::new_in(&parent)
            .with_context(|| format!("Failed to create temporary file in {:?}", parent))?;
        temp.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write temporary file for {:?}", path))?;
        temp.flush()?;
        temp.persist(path)
            .map_err(|e| anyhow!("Failed to replace {:?}: {}", path, e.error))?;

        Ok(())
    }

    /// Append one line to a file, creating it if needed
    pub fn append_line<P: AsRef<Path>>(path: P, line: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent)?;
            }
        }

        // Open file in append mode, create if it doesn't exist
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path.as_ref()))?;

        writeln!(file, "{}", line)
            .with_context(|| format!("Failed to write to log file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
