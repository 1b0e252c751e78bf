//! Slash-commands of the terminal front-end.
//!
//! Every input line is either a command (`/open 3`) or, if it does not start
//! with `/`, a message for the open chat.

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use huddle_shared::types::{ChatId, ChatKind};

use crate::modals::{Modal, SelectedFile};
use crate::notice::Notice;
use crate::shell::Shell;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login,
    Open(ChatId),
    Chats(String),
    NewChat(ChatKind),
    Name(String),
    Find(String),
    Pick(usize),
    Create,
    File(PathBuf),
    Image(PathBuf),
    Caption { index: usize, text: String },
    AutoCaption(usize),
    Remove(usize),
    Upload,
    Close,
    Profile,
    Logout,
    Quit,
    Send(String),
}

/// A line that could not be turned into a [`Command`]; the text is shown
/// to the user as is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ParseError(pub String);

impl Command {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Command::Send(line.to_string()));
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        let command = match name {
            "login" => Command::Login,
            "open" => Command::Open(ChatId::from(required(arg, "/open <chat id>")?)),
            "chats" => Command::Chats(arg.to_string()),
            "new" => {
                let kind = if arg.is_empty() { "group" } else { arg };
                let kind = kind
                    .parse::<ChatKind>()
                    .map_err(|e| ParseError(e.to_string()))?;
                Command::NewChat(kind)
            }
            "name" => Command::Name(arg.to_string()),
            "find" => Command::Find(arg.to_string()),
            "pick" => Command::Pick(index(arg, "/pick <n>")?),
            "create" => Command::Create,
            "file" => Command::File(PathBuf::from(required(arg, "/file <path>")?)),
            "image" => Command::Image(PathBuf::from(required(arg, "/image <path>")?)),
            "caption" => {
                let usage = "/caption <n> <text>";
                let (n, text) = arg.split_once(char::is_whitespace).unwrap_or((arg, ""));
                Command::Caption {
                    index: index(n, usage)?,
                    text: text.trim().to_string(),
                }
            }
            "autocaption" => Command::AutoCaption(index(arg, "/autocaption <n>")?),
            "remove" => Command::Remove(index(arg, "/remove <n>")?),
            "upload" => Command::Upload,
            "close" => Command::Close,
            "profile" => Command::Profile,
            "logout" => Command::Logout,
            "quit" | "exit" => Command::Quit,
            other => return Err(ParseError(format!("Unknown command: /{other}"))),
        };
        Ok(command)
    }
}

fn required<'a>(arg: &'a str, usage: &str) -> Result<&'a str, ParseError> {
    if arg.is_empty() {
        Err(ParseError(format!("Usage: {usage}")))
    } else {
        Ok(arg)
    }
}

fn index(arg: &str, usage: &str) -> Result<usize, ParseError> {
    arg.trim()
        .parse()
        .map_err(|_| ParseError(format!("Usage: {usage}")))
}

/// What the input loop should do after a command ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub async fn execute(shell: &mut Shell, command: Command) -> Flow {
    debug!(command = ?command, "Executing command");
    match command {
        Command::Login => shell.submit_auth(),
        Command::Open(id) => shell.open_chat(&id),
        Command::Chats(filter) => shell.set_sidebar_filter(&filter),
        Command::NewChat(kind) => {
            shell.open_modal(Modal::CreateChat);
            if let Some(flow) = shell.create_chat_mut() {
                flow.set_kind(kind);
            }
        }
        Command::Name(name) => match shell.create_chat_mut() {
            Some(flow) => flow.set_name(&name),
            None => no_modal(shell, "/new"),
        },
        Command::Find(query) => match shell.create_chat_mut() {
            Some(flow) => flow.set_query(&query),
            None => no_modal(shell, "/new"),
        },
        Command::Pick(index) => match shell.create_chat_mut() {
            Some(flow) => {
                if flow.pick(index).is_none() {
                    shell.push_notice(Notice::error(format!("No search result #{index}")));
                }
            }
            None => no_modal(shell, "/new"),
        },
        Command::Create => {
            if shell.create_chat_mut().is_none() {
                no_modal(shell, "/new");
            } else {
                shell.submit_create_chat();
            }
        }
        Command::File(path) => add_from_path(shell, Modal::FileUpload, path).await,
        Command::Image(path) => add_from_path(shell, Modal::ImageUpload, path).await,
        Command::Caption { index, text } => match shell.image_modal_mut() {
            Some(modal) => {
                if !modal.set_caption(index, &text) {
                    shell.push_notice(Notice::error(format!("No image #{index}")));
                }
            }
            None => no_modal(shell, "/image"),
        },
        Command::AutoCaption(index) => match shell.image_modal_mut() {
            Some(modal) => {
                if modal.generate_caption(index).is_none() {
                    shell.push_notice(Notice::error(format!("No image #{index}")));
                }
            }
            None => no_modal(shell, "/image"),
        },
        Command::Remove(index) => {
            let removed = if let Some(modal) = shell.image_modal_mut() {
                modal.remove(index)
            } else if let Some(modal) = shell.file_modal_mut() {
                modal.remove(index)
            } else {
                no_modal(shell, "/file or /image");
                return Flow::Continue;
            };
            if removed.is_none() {
                shell.push_notice(Notice::error(format!("No file #{index}")));
            }
        }
        Command::Upload => {
            if shell.upload().is_none() {
                no_modal(shell, "/file or /image");
            }
        }
        Command::Close => shell.close_modal(),
        Command::Profile => shell.open_modal(Modal::Profile),
        Command::Logout => shell.logout(),
        Command::Quit => return Flow::Quit,
        Command::Send(text) => {
            shell.send_message(&text);
        }
    }
    Flow::Continue
}

/// Open the upload modal of `kind` unless it already is, then stage `path`.
async fn add_from_path(shell: &mut Shell, kind: Modal, path: PathBuf) {
    if shell.modal() != Some(kind) {
        shell.open_modal(kind);
        if shell.modal() != Some(kind) {
            return;
        }
    }
    match SelectedFile::from_path(&path).await {
        Ok(file) => {
            shell.add_upload_files(vec![file]);
        }
        Err(e) => shell.push_notice(Notice::error(format!(
            "Cannot read {}: {e}",
            path.display()
        ))),
    }
}

fn no_modal(shell: &mut Shell, opener: &str) {
    shell.push_notice(Notice::error(format!("Nothing to do here, try {opener} first")));
}
