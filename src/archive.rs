use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Result, SplitError};
use crate::types::SplitResult;

/// Bulk export of a finished batch.
///
/// A failing export leaves the results untouched so they can still be saved
/// one by one.
pub trait Archiver {
    fn write_all(
        &mut self,
        results: &[SplitResult],
        on_progress: &mut dyn FnMut(usize, usize),
    ) -> Result<()>;
}

/// Writes every result as `<dir>/<name>.wav`.
#[derive(Debug, Clone)]
pub struct DirectoryExport {
    dir: PathBuf,
    overwrite: bool,
}

impl DirectoryExport {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            overwrite: false,
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Destination path for one result.
    pub fn path_for(&self, result: &SplitResult) -> PathBuf {
        self.dir.join(result.file_name())
    }

    fn write_one(&self, result: &SplitResult) -> io::Result<PathBuf> {
        let file_name = result.file_name();
        if file_name.contains(['/', '\\']) || result.name.is_empty() || result.name == ".." {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "file name must not contain path separators",
            ));
        }
        let path = self.dir.join(file_name);
        let mut options = fs::OpenOptions::new();
        options.write(true);
        if self.overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        let mut file = options.open(&path)?;
        file.write_all(&result.encoded_bytes)?;
        file.flush()?;
        Ok(path)
    }
}

impl Archiver for DirectoryExport {
    fn write_all(
        &mut self,
        results: &[SplitResult],
        on_progress: &mut dyn FnMut(usize, usize),
    ) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|source| SplitError::Archive {
            name: self.dir.display().to_string(),
            source,
        })?;
        let total = results.len();
        for (idx, result) in results.iter().enumerate() {
            let path = self.write_one(result).map_err(|source| SplitError::Archive {
                name: result.file_name(),
                source,
            })?;
            info!(path = %path.display(), bytes = result.byte_size, "wrote segment");
            on_progress(idx + 1, total);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn result(name: &str) -> SplitResult {
        SplitResult::new(name.to_string(), vec![1, 2, 3], 1.0)
    }

    #[test]
    fn writes_each_result_and_reports_progress() {
        let temp = tempdir().unwrap();
        let mut export = DirectoryExport::new(temp.path().join("out"));
        let mut steps = Vec::new();
        export
            .write_all(&[result("a_part01"), result("a_part02")], &mut |done, total| {
                steps.push((done, total))
            })
            .unwrap();

        assert_eq!(steps, vec![(1, 2), (2, 2)]);
        let written = fs::read(temp.path().join("out").join("a_part02.wav")).unwrap();
        assert_eq!(written, vec![1, 2, 3]);
    }

    #[test]
    fn refuses_to_overwrite_by_default() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a_part01.wav"), b"keep").unwrap();
        let mut export = DirectoryExport::new(temp.path());

        let err = export.write_all(&[result("a_part01")], &mut |_, _| {}).unwrap_err();
        assert!(matches!(err, SplitError::Archive { .. }));
        assert_eq!(fs::read(temp.path().join("a_part01.wav")).unwrap(), b"keep");

        let mut export = DirectoryExport::new(temp.path()).overwrite(true);
        export.write_all(&[result("a_part01")], &mut |_, _| {}).unwrap();
        assert_eq!(fs::read(temp.path().join("a_part01.wav")).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn rejects_names_with_separators() {
        let temp = tempdir().unwrap();
        let mut export = DirectoryExport::new(temp.path());
        let err = export
            .write_all(&[result("../escape")], &mut |_, _| {})
            .unwrap_err();
        assert!(matches!(err, SplitError::Archive { .. }));
    }
}
