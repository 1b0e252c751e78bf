//! Image upload modal: jpg, jpeg and png up to 10 MB, each with a caption
//! and a preview.

use rand::seq::SliceRandom;

use super::upload::{
    AddFilesReport, DropZone, PreviewRegistry, SelectedFile, Selection, UploadHandoff, UploadKind,
    UploadOutcome, UploadRules,
};

/// Offered by "generate caption" until a captioning backend exists.
pub const PLACEHOLDER_CAPTIONS: [&str; 4] = [
    "A beautiful landscape with mountains and trees",
    "An architectural view of a modern building",
    "A close-up shot with vibrant colors",
    "An outdoor scene captured during golden hour",
];

/// One staged image as the modal lists it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry<'a> {
    pub file: &'a SelectedFile,
    pub caption: &'a str,
    pub has_preview: bool,
}

#[derive(Debug)]
pub struct ImageUploadModal {
    selection: Selection,
    previews: PreviewRegistry,
}

impl ImageUploadModal {
    pub fn new(previews: PreviewRegistry) -> Self {
        Self {
            selection: Selection::new(
                UploadKind::Images,
                UploadRules::IMAGES,
                Some(previews.clone()),
            ),
            previews,
        }
    }

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

    pub fn images(&self) -> Vec<ImageEntry<'_>> {
        self.selection
            .entries
            .iter()
            .map(|entry| ImageEntry {
                file: &entry.file,
                caption: &entry.caption,
                has_preview: entry.preview.is_some(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.selection.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selection.entries.is_empty()
    }

    /// Removes the image and releases its preview.
    pub fn remove(&mut self, index: usize) -> Option<SelectedFile> {
        self.selection.remove(index)
    }

    /// Returns `false` if `index` is out of range.
    pub fn set_caption(&mut self, index: usize, caption: &str) -> bool {
        match self.selection.entries.get_mut(index) {
            Some(entry) => {
                entry.caption = caption.to_string();
                true
            }
            None => false,
        }
    }

    /// Fill the caption with one of [`PLACEHOLDER_CAPTIONS`] at random.
    pub fn generate_caption(&mut self, index: usize) -> Option<&str> {
        let caption = PLACEHOLDER_CAPTIONS.choose(&mut rand::thread_rng())?;
        let entry = self.selection.entries.get_mut(index)?;
        entry.caption = caption.to_string();
        Some(&entry.caption)
    }

    pub fn upload(&mut self, handoff: &dyn UploadHandoff) -> UploadOutcome {
        self.selection.upload(handoff)
    }

    /// Drop every staged image and its preview.
    pub fn clear(&mut self) {
        self.selection.clear();
    }

    /// Previews currently held by this modal.
    pub fn live_previews(&self) -> usize {
        self.previews.live()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use huddle_shared::ValidationError;

    use super::*;
    use crate::modals::upload::{LoggingHandoff, UploadBatch};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<UploadBatch>>);

    impl UploadHandoff for Recorder {
        fn hand_off(&self, batch: UploadBatch) {
            self.0.lock().unwrap().push(batch);
        }
    }

    fn modal() -> ImageUploadModal {
        ImageUploadModal::new(PreviewRegistry::new())
    }

    #[test]
    fn test_only_images_within_cap_are_accepted() {
        let mut modal = modal();
        let report = modal.add_files(vec![
            SelectedFile::new("cat.JPG", 100),
            SelectedFile::new("scan.pdf", 100),
            SelectedFile::new("huge.png", 11 * 1024 * 1024),
        ]);
        assert_eq!(report.accepted, 1);
        assert!(matches!(
            report.rejected[0],
            ValidationError::DisallowedFormat { .. }
        ));
        assert!(matches!(
            report.rejected[1],
            ValidationError::FileTooLarge { .. }
        ));
        assert_eq!(modal.live_previews(), 1);
    }

    #[test]
    fn test_remove_releases_preview() {
        let mut modal = modal();
        modal.add_files(vec![
            SelectedFile::new("a.png", 1),
            SelectedFile::new("b.jpeg", 1),
        ]);
        assert_eq!(modal.live_previews(), 2);

        modal.remove(0);
        assert_eq!(modal.live_previews(), 1);
        assert_eq!(modal.images()[0].file.name, "b.jpeg");
    }

    #[test]
    fn test_captions() {
        let mut modal = modal();
        modal.add_files(vec![SelectedFile::new("a.png", 1)]);

        assert!(modal.set_caption(0, "sunset"));
        assert_eq!(modal.images()[0].caption, "sunset");
        assert!(!modal.set_caption(3, "nope"));

        let generated = modal.generate_caption(0).unwrap().to_string();
        assert!(PLACEHOLDER_CAPTIONS.contains(&generated.as_str()));
        assert!(modal.generate_caption(1).is_none());
    }

    #[test]
    fn test_upload_carries_captions_and_releases_previews() {
        let recorder = Recorder::default();
        let mut modal = modal();
        modal.add_files(vec![
            SelectedFile::new("a.png", 1),
            SelectedFile::new("b.png", 1),
        ]);
        modal.set_caption(1, "second");

        assert_eq!(modal.upload(&recorder), UploadOutcome::Uploaded { count: 2 });
        assert!(modal.is_empty());
        assert_eq!(modal.live_previews(), 0);

        let batches = recorder.0.lock().unwrap();
        let captions: Vec<_> = batches[0]
            .items
            .iter()
            .map(|item| item.caption.as_deref())
            .collect();
        assert_eq!(captions, [Some(""), Some("second")]);
    }

    #[test]
    fn test_empty_upload_is_noop() {
        let mut modal = modal();
        assert_eq!(
            modal.upload(&LoggingHandoff),
            UploadOutcome::NothingSelected
        );
    }

    #[test]
    fn test_clear_releases_previews() {
        let mut modal = modal();
        modal.add_files(vec![SelectedFile::new("a.png", 1)]);
        modal.clear();
        assert_eq!(modal.live_previews(), 0);
    }
}
