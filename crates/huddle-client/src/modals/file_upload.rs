//! Document upload modal: pdf, txt, docx, mp3 and wav up to 20 MB.

use super::upload::{
    AddFilesReport, DropZone, SelectedFile, Selection, UploadHandoff, UploadKind, UploadOutcome,
    UploadRules,
};

#[derive(Debug)]
pub struct FileUploadModal {
    selection: Selection,
}

impl Default for FileUploadModal {
    fn default() -> Self {
        Self::new()
    }
}

impl FileUploadModal {
    pub fn new() -> Self {
        Self {
            selection: Selection::new(UploadKind::Documents, UploadRules::DOCUMENTS, None),
        }
    }

    /// Manual selection from the file picker.
    pub fn add_files(&mut self, files: Vec<SelectedFile>) -> AddFilesReport {
        self.selection.add_files(files)
    }

    pub fn drag_enter(&mut self) {
        self.selection.drop_zone.drag_enter();
    }

    pub fn drag_leave(&mut self) {
        self.selection.drop_zone.drag_leave();
    }

    pub fn drop_files(&mut self, files: Vec<SelectedFile>) -> AddFilesReport {
        self.selection.drop_files(files)
    }

    pub fn drop_zone(&self) -> DropZone {
        self.selection.drop_zone
    }

    pub fn remove(&mut self, index: usize) -> Option<SelectedFile> {
        self.selection.remove(index)
    }

    pub fn files(&self) -> Vec<&SelectedFile> {
        self.selection.files()
    }

    pub fn upload(&mut self, handoff: &dyn UploadHandoff) -> UploadOutcome {
        self.selection.upload(handoff)
    }

    pub fn clear(&mut self) {
        self.selection.clear();
    }
}
