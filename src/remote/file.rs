use std::fs;
use std::path::PathBuf;

use super::{FetchError, SheetSource};

/// Reads a previously exported CSV from disk.
#[derive(Debug, Clone)]
pub struct FileSheetSource {
    path: PathBuf,
}

impl FileSheetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SheetSource for FileSheetSource {
    fn fetch(&self) -> Result<String, FetchError> {
        fs::read_to_string(&self.path).map_err(|source| FetchError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn describe(&self) -> String {
        format!("FILE://{}", self.path.display())
    }
}
