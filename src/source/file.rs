//! Offline snapshot source
//!
//! Each file matched by the glob pattern stands in for one page, in sorted
//! path order. A file holds either `{"Data": [...]}` or a bare array.

use glob::glob;
use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::error::FetchError;
use crate::source::RecordSource;
use crate::source::form_api::decode_page;

#[derive(Debug, Clone)]
pub(crate) struct FileSource {
    pattern: String,
}

impl FileSource {
    pub(crate) fn new(pattern: impl Into<String>) -> Self {
        FileSource {
            pattern: pattern.into(),
        }
    }

    fn paths(&self) -> Result<Vec<PathBuf>, FetchError> {
        let mut paths: Vec<PathBuf> = glob(&self.pattern)?
            .filter_map(|entry| match entry {
                Ok(path) if path.is_file() => Some(path),
                Ok(_) => None,
                Err(e) => {
                    tracing::debug!("skipping unreadable path: {e}");
                    None
                }
            })
            .collect();
        paths.sort();
        Ok(paths)
    }
}

impl RecordSource for FileSource {
    fn describe(&self) -> String {
        format!("files {}", self.pattern)
    }

    fn fetch_page(&self, page: u32) -> Result<Vec<Value>, FetchError> {
        let paths = self.paths()?;
        if page == 1 && paths.is_empty() {
            return Err(FetchError::Io {
                path: self.pattern.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no files match"),
            });
        }
        let Some(path) = paths.get(page.saturating_sub(1) as usize) else {
            return Ok(Vec::new());
        };

        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| FetchError::Io {
            path: display.clone(),
            source,
        })?;
        decode_page(&content).map_err(|e| FetchError::Decode {
            context: display,
            message: e.to_string(),
        })
    }
}
