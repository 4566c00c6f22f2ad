//! External image sources consumed by imports.

use std::path::{Path, PathBuf};

use moneytracker_common::{Error, Result};

/// An opaque handle to image content living outside the manager's storage:
/// a gallery pick, a camera capture file, an upload body.
pub trait ImageSource {
    /// Read the full encoded content.
    fn read_bytes(&self) -> Result<Vec<u8>>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

impl ImageSource for Path {
    fn read_bytes(&self) -> Result<Vec<u8>> {
        std::fs::read(self).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::not_found(self.display().to_string()),
            _ => Error::Io(e),
        })
    }

    fn describe(&self) -> String {
        self.display().to_string()
    }
}

impl ImageSource for PathBuf {
    fn read_bytes(&self) -> Result<Vec<u8>> {
        self.as_path().read_bytes()
    }

    fn describe(&self) -> String {
        self.as_path().describe()
    }
}

/// Encoded image content already held in memory.
#[derive(Debug, Clone)]
pub struct BytesSource {
    label: String,
    bytes: Vec<u8>,
}

impl BytesSource {
    pub fn new(label: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            bytes,
        }
    }
}

impl ImageSource for BytesSource {
    fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }

    fn describe(&self) -> String {
        format!("{} ({} bytes)", self.label, self.bytes.len())
    }
}
