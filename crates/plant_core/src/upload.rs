use crate::error::Result;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_UPLOAD_ID: AtomicU64 = AtomicU64::new(1);

/// An image picked by the user. Cheap to clone; the bytes are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Distinct for every upload in this process, even for the same file.
    pub id: u64,
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl UploadedImage {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            id: NEXT_UPLOAD_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    /// In-memory URI for image loaders. Unique per upload, since loaders
    /// cache by URI. Keeps the file name last so the extension still hints
    /// the format.
    pub fn preview_uri(&self) -> String {
        format!("bytes://upload/{}/{}", self.id, self.name)
    }
}

/// File extensions offered by the image picker.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}
