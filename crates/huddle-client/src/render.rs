//! Plain-text rendering of the shell for the terminal front-end.

use std::fmt::Write;

use huddle_net::{ConnectionState, SearchState};
use huddle_shared::constants::APP_NAME;

use crate::modals::{format_file_size, ActiveModal, Modal};
use crate::routes::Route;
use crate::shell::Shell;

pub fn render(shell: &Shell) -> String {
    let mut out = String::new();
    match shell.route() {
        Route::SignIn => render_auth(shell, &mut out),
        _ => render_home(shell, &mut out),
    }
    for notice in shell.notices() {
        let _ = writeln!(out, "{notice}");
    }
    out
}

fn render_auth(shell: &Shell, out: &mut String) {
    let form = shell.auth();
    let _ = writeln!(out, "== {APP_NAME}: {} ==", form.title());
    let _ = writeln!(out, "email:    {}", form.email);
    let _ = writeln!(out, "password: {}", form.masked_password());
    if form.shows_confirmation() {
        let _ = writeln!(out, "confirm:  {}", "*".repeat(form.confirm_password.chars().count()));
    }
    let _ = writeln!(out, "(/login to continue)");
}

fn render_home(shell: &Shell, out: &mut String) {
    let status = match shell.connection_state() {
        Some(ConnectionState::Connected) => "connected",
        Some(ConnectionState::Connecting) => "connecting",
        Some(ConnectionState::Disconnected) | None => "offline",
    };
    let _ = writeln!(
        out,
        "== {APP_NAME} [{status}] {} ({}) ==",
        shell.profile().name,
        shell.profile().initials()
    );

    if !shell.sidebar_filter().is_empty() {
        let _ = writeln!(out, "chats matching \"{}\":", shell.sidebar_filter());
    }
    let open = shell.route().chat_id();
    for chat in shell.visible_chats() {
        let marker = if Some(&chat.id) == open { '>' } else { ' ' };
        let unread = if chat.unread > 0 {
            format!(" ({})", chat.unread)
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            "{marker} [{}] {}{unread} - {} - {}",
            chat.id, chat.name, chat.last_message, chat.time
        );
    }
    let _ = writeln!(out, "{}", "-".repeat(40));

    match (shell.route(), shell.current_chat(), shell.log()) {
        (Route::Chat(_), Some(chat), Some(log)) => {
            let _ = writeln!(out, "# {}", chat.name);
            for message in log.messages() {
                if message.is_own {
                    let _ = writeln!(out, "{:>60}", format!("{} [{}]", message.text, message.time));
                } else {
                    let _ = writeln!(out, "{}: {} [{}]", message.sender, message.text, message.time);
                }
            }
        }
        (Route::Chat(id), _, _) => {
            let _ = writeln!(out, "Chat not found: {id}");
        }
        _ => {
            let _ = writeln!(out, "Select a chat to start messaging");
        }
    }

    if let Some(modal) = shell.active_modal() {
        render_modal(modal, out);
    }
}

fn render_modal(modal: &ActiveModal, out: &mut String) {
    let _ = writeln!(out, "{}", "=".repeat(40));
    let _ = writeln!(out, "[{}]", modal.kind());
    match modal {
        ActiveModal::FileUpload(modal) => {
            for (i, file) in modal.files().iter().enumerate() {
                let _ = writeln!(out, "  {i}. {} ({})", file.name, format_file_size(file.size));
            }
            let _ = writeln!(out, "  allowed: pdf, txt, docx, mp3, wav (max 20 MB)");
        }
        ActiveModal::ImageUpload(modal) => {
            for (i, image) in modal.images().iter().enumerate() {
                let _ = writeln!(
                    out,
                    "  {i}. {} ({}) caption: \"{}\"",
                    image.file.name,
                    format_file_size(image.file.size),
                    image.caption
                );
            }
            let _ = writeln!(out, "  allowed: jpg, jpeg, png (max 10 MB)");
        }
        ActiveModal::Profile(profile) => {
            let _ = writeln!(out, "  ({}) {}", profile.initials(), profile.name);
            let _ = writeln!(out, "  {}", profile.bio);
            let _ = writeln!(out, "  email:    {}", profile.email);
            let _ = writeln!(out, "  phone:    {}", profile.phone);
            let _ = writeln!(out, "  location: {}", profile.location);
            let _ = writeln!(out, "  joined:   {}", profile.joined);
        }
        ActiveModal::CreateChat(flow) => {
            let _ = writeln!(out, "  type: {}", flow.kind());
            let _ = writeln!(out, "  name: {}", flow.name());
            let _ = writeln!(out, "  search: {}", flow.query());
            match flow.search_state() {
                SearchState::Idle => {}
                SearchState::Pending { .. } => {
                    let _ = writeln!(out, "  searching...");
                }
                SearchState::Loaded { users, .. } if users.is_empty() => {
                    let _ = writeln!(out, "  no users found");
                }
                SearchState::Loaded { users, .. } => {
                    for (i, user) in users.iter().enumerate() {
                        let mark = if flow.is_selected(&user.id) { 'x' } else { ' ' };
                        let _ = writeln!(out, "  [{mark}] {i}. {} <{}>", user.name, user.username);
                    }
                }
                SearchState::Failed { message, .. } => {
                    let _ = writeln!(out, "  {message}");
                }
            }
            let members: Vec<&str> = flow.selected().iter().map(|u| u.name.as_str()).collect();
            let _ = writeln!(out, "  members: {}", members.join(", "));
        }
    }
    if modal.kind() != Modal::Profile {
        let _ = writeln!(out, "  (/close to cancel)");
    }
}
