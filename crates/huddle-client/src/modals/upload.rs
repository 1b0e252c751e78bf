//! Building blocks shared by the file and image upload modals.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use huddle_shared::constants::{
    DOCUMENT_EXTENSIONS, IMAGE_EXTENSIONS, MAX_DOCUMENT_SIZE, MAX_IMAGE_SIZE,
};
use huddle_shared::ValidationError;

// ---------------------------------------------------------------------------
// Files and rules
// ---------------------------------------------------------------------------

/// A file picked by the user but not uploaded yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedFile {
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    pub path: Option<PathBuf>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            path: None,
        }
    }

    /// Stat a file on disk.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            ));
        }
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        Ok(Self {
            name,
            size: metadata.len(),
            path: Some(path.to_path_buf()),
        })
    }

    /// Lowercased text after the last dot, if any. A bare `.txt` counts
    /// as a `txt` file.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.name.rsplit_once('.')?;
        if ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// Allow-list and size cap of one modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadRules {
    pub extensions: &'static [&'static str],
    pub max_size: u64,
}

impl UploadRules {
    pub const DOCUMENTS: UploadRules = UploadRules {
        extensions: DOCUMENT_EXTENSIONS,
        max_size: MAX_DOCUMENT_SIZE,
    };

    pub const IMAGES: UploadRules = UploadRules {
        extensions: IMAGE_EXTENSIONS,
        max_size: MAX_IMAGE_SIZE,
    };

    /// Format first, then size. A name without an extension is disallowed.
    pub fn check(&self, file: &SelectedFile) -> Result<(), ValidationError> {
        let allowed = file
            .extension()
            .is_some_and(|ext| self.extensions.contains(&ext.as_str()));
        if !allowed {
            return Err(ValidationError::DisallowedFormat {
                file: file.name.clone(),
            });
        }
        if file.size > self.max_size {
            return Err(ValidationError::FileTooLarge {
                file: file.name.clone(),
                limit: format_file_size(self.max_size),
            });
        }
        Ok(())
    }
}

/// Render a byte count the way the modals list it: `0 Bytes`, `1.5 KB`, `20 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text} {}", UNITS[unit])
}

// ---------------------------------------------------------------------------
// Previews
// ---------------------------------------------------------------------------

/// Tracks preview handles that have not been released yet.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashSet<Uuid>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, file: &SelectedFile) -> Preview {
        let id = Uuid::new_v4();
        if let Ok(mut live) = self.live.lock() {
            live.insert(id);
        }
        debug!(preview = %id, file = %file.name, "Preview created");
        Preview {
            id,
            live: Arc::clone(&self.live),
        }
    }

    /// Number of previews currently held.
    pub fn live(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or_default()
    }
}

/// Preview handle of one staged image. Released when dropped.
#[derive(Debug)]
pub struct Preview {
    id: Uuid,
    live: Arc<Mutex<HashSet<Uuid>>>,
}

impl Preview {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for Preview {
    fn drop(&mut self) {
        if let Ok(mut live) = self.live.lock() {
            live.remove(&self.id);
        }
        debug!(preview = %self.id, "Preview released");
    }
}

// ---------------------------------------------------------------------------
// Drop zone
// ---------------------------------------------------------------------------

/// Highlight state of the drag-and-drop target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropZone {
    active: bool,
}

impl DropZone {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `dragenter` and `dragover` both highlight.
    pub fn drag_enter(&mut self) {
        self.active = true;
    }

    pub fn drag_leave(&mut self) {
        self.active = false;
    }

    pub fn drop_files(&mut self) {
        self.active = false;
    }
}

// ---------------------------------------------------------------------------
// Hand-off
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Documents,
    Images,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingUpload {
    pub file: SelectedFile,
    /// Set only for images.
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadBatch {
    pub kind: UploadKind,
    pub items: Vec<PendingUpload>,
}

/// Receives the selection when the user confirms an upload.
pub trait UploadHandoff: Send + Sync {
    fn hand_off(&self, batch: UploadBatch);
}

/// Logs the batch and transfers nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandoff;

impl UploadHandoff for LoggingHandoff {
    fn hand_off(&self, batch: UploadBatch) {
        let total: u64 = batch.items.iter().map(|item| item.file.size).sum();
        info!(
            kind = ?batch.kind,
            count = batch.items.len(),
            size = %format_file_size(total),
            "Upload handed off"
        );
        for item in &batch.items {
            debug!(file = %item.file.name, caption = ?item.caption, "Upload item");
        }
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Result of adding a batch of files to a modal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddFilesReport {
    pub accepted: usize,
    /// One error per rejected file, in batch order.
    pub rejected: Vec<ValidationError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The selection was handed off and the modal should close.
    Uploaded { count: usize },
    /// Nothing selected; the modal stays open.
    NothingSelected,
}

#[derive(Debug)]
pub(crate) struct Staged {
    pub file: SelectedFile,
    pub caption: String,
    pub preview: Option<Preview>,
}

/// Staged files of one modal plus its drop zone.
#[derive(Debug)]
pub(crate) struct Selection {
    kind: UploadKind,
    rules: UploadRules,
    previews: Option<PreviewRegistry>,
    pub(crate) drop_zone: DropZone,
    pub(crate) entries: Vec<Staged>,
}

impl Selection {
    pub fn new(kind: UploadKind, rules: UploadRules, previews: Option<PreviewRegistry>) -> Self {
        Self {
            kind,
            rules,
            previews,
            drop_zone: DropZone::default(),
            entries: Vec::new(),
        }
    }

    pub fn add_files(&mut self, files: Vec<SelectedFile>) -> AddFilesReport {
        let mut report = AddFilesReport::default();
        for file in files {
            if let Err(e) = self.rules.check(&file) {
                debug!(file = %file.name, error = %e, "File rejected");
                report.rejected.push(e);
                continue;
            }
            let preview = self.previews.as_ref().map(|registry| registry.create(&file));
            self.entries.push(Staged {
                file,
                caption: String::new(),
                preview,
            });
            report.accepted += 1;
        }
        report
    }

    pub fn drop_files(&mut self, files: Vec<SelectedFile>) -> AddFilesReport {
        self.drop_zone.drop_files();
        self.add_files(files)
    }

    /// Returns the removed file; out of range is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<SelectedFile> {
        if index >= self.entries.len() {
            return None;
        }
        Some(self.entries.remove(index).file)
    }

    pub fn files(&self) -> Vec<&SelectedFile> {
        self.entries.iter().map(|entry| &entry.file).collect()
    }

    pub fn upload(&mut self, handoff: &dyn UploadHandoff) -> UploadOutcome {
        if self.entries.is_empty() {
            return UploadOutcome::NothingSelected;
        }

        let with_captions = self.kind == UploadKind::Images;
        let items: Vec<PendingUpload> = self
            .entries
            .drain(..)
            .map(|entry| PendingUpload {
                file: entry.file,
                caption: with_captions.then_some(entry.caption),
            })
            .collect();
        let count = items.len();

        handoff.hand_off(UploadBatch {
            kind: self.kind,
            items,
        });
        self.drop_zone = DropZone::default();
        UploadOutcome::Uploaded { count }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.drop_zone = DropZone::default();
    }
}
