use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Capture date used as the sort key. A missing date is the zero time and
/// orders before every real date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaptureTimestamp(Option<NaiveDateTime>);

impl CaptureTimestamp {
    pub const ZERO: Self = Self(None);

    pub fn new(value: NaiveDateTime) -> Self {
        Self(Some(value))
    }

    pub fn value(&self) -> Option<NaiveDateTime> {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_none()
    }
}

impl From<NaiveDateTime> for CaptureTimestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    pub path: PathBuf,
    pub timestamp: CaptureTimestamp,
}

impl ImageFile {
    pub fn new(path: PathBuf, timestamp: CaptureTimestamp) -> Self {
        let name = path
            .file_name()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            name,
            path,
            timestamp,
        }
    }

    /// Extension as found on disk, with its leading dot. Case is kept.
    pub fn extension_with_dot(&self) -> String {
        extension_with_dot(&self.path)
    }
}

pub(crate) fn extension_with_dot(path: &Path) -> String {
    path.extension()
        .map(|v| format!(".{}", v.to_string_lossy()))
        .unwrap_or_default()
}
