//! Modal dialogs of the shell. At most one is open at a time; its state is
//! owned by [`ActiveModal`] and dropped when it closes.

pub mod create_chat;
pub mod file_upload;
pub mod image_upload;
pub mod profile;
pub mod upload;

use std::fmt;

pub use create_chat::CreateChatFlow;
pub use file_upload::FileUploadModal;
pub use image_upload::ImageUploadModal;
pub use profile::UserProfile;
pub use upload::{
    format_file_size, AddFilesReport, LoggingHandoff, PendingUpload, PreviewRegistry,
    SelectedFile, UploadBatch, UploadHandoff, UploadKind, UploadOutcome,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    FileUpload,
    ImageUpload,
    Profile,
    CreateChat,
}

impl fmt::Display for Modal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Modal::FileUpload => "Upload Files",
            Modal::ImageUpload => "Upload Images",
            Modal::Profile => "Profile",
            Modal::CreateChat => "Create New Chat",
        };
        f.write_str(name)
    }
}

pub enum ActiveModal {
    FileUpload(FileUploadModal),
    ImageUpload(ImageUploadModal),
    Profile(UserProfile),
    CreateChat(CreateChatFlow),
}

impl ActiveModal {
    pub fn kind(&self) -> Modal {
        match self {
            ActiveModal::FileUpload(_) => Modal::FileUpload,
            ActiveModal::ImageUpload(_) => Modal::ImageUpload,
            ActiveModal::Profile(_) => Modal::Profile,
            ActiveModal::CreateChat(_) => Modal::CreateChat,
        }
    }
}
