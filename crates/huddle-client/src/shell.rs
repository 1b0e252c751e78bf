//! The view shell: current route, sidebar, open chat, modals and the
//! realtime session.
//!
//! All state is owned by [`Shell`] and mutated only through `&mut self`, so
//! the owner drives it from one task. The session reports back through
//! [`Shell::next_session_event`] and [`Shell::apply_notification`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use huddle_net::{
    ConnectionState, Connector, RealtimeSession, SendOutcome, SessionConfig,
    SessionNotification, UserSearch,
};
use huddle_shared::constants::{OWN_SENDER, SERVER_SENDER};
use huddle_shared::types::ChatId;
use huddle_shared::ValidationError;
use huddle_store::{seed, ChatSummary, MessageLog, Roster, SeedMessage, StoreError};

use crate::auth::AuthForm;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::modals::{
    ActiveModal, AddFilesReport, CreateChatFlow, FileUploadModal, ImageUploadModal, Modal,
    PreviewRegistry, SelectedFile, UploadHandoff, UploadOutcome, UserProfile,
};
use crate::notice::Notice;
use crate::routes::Route;

/// Collaborators the shell talks to.
#[derive(Clone)]
pub struct ShellDeps {
    pub connector: Arc<dyn Connector>,
    pub directory: Arc<dyn UserSearch>,
    pub uploads: Arc<dyn UploadHandoff>,
}

pub struct Shell {
    config: ClientConfig,
    deps: ShellDeps,
    route: Route,
    auth: AuthForm,
    roster: Roster,
    seed: Vec<SeedMessage>,
    session: Option<RealtimeSession>,
    /// Log of the open chat. `None` on `/home` and for unknown chat ids.
    log: Option<MessageLog>,
    sidebar_filter: String,
    modal: Option<ActiveModal>,
    previews: PreviewRegistry,
    profile: UserProfile,
    notices: Vec<Notice>,
}

impl Shell {
    pub fn new(
        config: ClientConfig,
        deps: ShellDeps,
        roster: Roster,
        seed: Vec<SeedMessage>,
    ) -> Self {
        let profile = UserProfile::with_name(config.display_name.clone());
        Self {
            config,
            deps,
            route: Route::SignIn,
            auth: AuthForm::new(),
            roster,
            seed,
            session: None,
            log: None,
            sidebar_filter: String::new(),
            modal: None,
            previews: PreviewRegistry::new(),
            profile,
            notices: Vec::new(),
        }
    }

    /// Start from the built-in roster and the configured message seed.
    pub fn from_config(config: ClientConfig, deps: ShellDeps) -> Result<Self, ClientError> {
        let seed = match &config.seed_messages_path {
            Some(path) => seed::load_messages(path)?,
            None => seed::default_messages(),
        };
        Ok(Self::new(config, deps, seed::default_roster(), seed))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Routing
    // ------------------------------------------------------------------

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Navigate to a path; unknown paths land on the sign-in screen.
    pub fn navigate(&mut self, path: &str) {
        self.go(Route::parse(path));
    }

    pub fn go(&mut self, route: Route) {
        if route == self.route {
            return;
        }

        let was_authenticated = self.route.is_authenticated();
        let authenticated = route.is_authenticated();
        info!(from = %self.route, to = %route, "Navigating");

        if authenticated && !was_authenticated {
            self.open_session();
        } else if !authenticated && was_authenticated {
            self.drop_session();
            self.modal = None;
            self.sidebar_filter.clear();
        }

        self.log = match route.chat_id() {
            Some(id) if self.roster.contains(id) => Some(MessageLog::with_seed(id.clone(), &self.seed)),
            Some(id) => {
                debug!(chat = %id, "Chat not found");
                None
            }
            None => None,
        };
        self.route = route;
    }

    pub fn open_chat(&mut self, id: &ChatId) {
        self.go(Route::Chat(id.clone()));
    }

    pub fn logout(&mut self) {
        self.go(Route::SignIn);
    }

    pub fn auth(&self) -> &AuthForm {
        &self.auth
    }

    pub fn auth_mut(&mut self) -> &mut AuthForm {
        &mut self.auth
    }

    pub fn submit_auth(&mut self) {
        let route = self.auth.submit();
        self.go(route);
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    fn open_session(&mut self) {
        let endpoint = match self.config.realtime_endpoint() {
            Ok(endpoint) => endpoint,
            Err(e) => {
                warn!(error = %e, "Cannot open realtime session");
                self.notices
                    .push(Notice::error(format!("Realtime connection unavailable: {e}")));
                return;
            }
        };
        let config = SessionConfig {
            endpoint,
            join_room: self.config.join_room.clone(),
        };
        self.session = Some(RealtimeSession::open(Arc::clone(&self.deps.connector), config));
    }

    fn drop_session(&mut self) {
        if self.session.take().is_some() {
            info!("Realtime session dropped");
        }
    }

    pub fn connection_state(&self) -> Option<ConnectionState> {
        self.session.as_ref().map(RealtimeSession::state)
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Wait for the next session notification. Never resolves while there
    /// is no session or after the session ended.
    pub async fn next_session_event(&mut self) -> SessionNotification {
        if let Some(session) = self.session.as_mut() {
            if let Some(notification) = session.next_notification().await {
                return notification;
            }
        }
        std::future::pending().await
    }

    /// Apply everything the session has queued. Returns how many
    /// notifications were applied.
    pub fn pump(&mut self) -> usize {
        let mut pending = Vec::new();
        if let Some(session) = self.session.as_mut() {
            while let Some(notification) = session.try_notification() {
                pending.push(notification);
            }
        }
        let count = pending.len();
        for notification in pending {
            self.apply_notification(notification);
        }
        count
    }

    pub fn apply_notification(&mut self, notification: SessionNotification) {
        match notification {
            SessionNotification::Connected => {
                info!(room = %self.config.join_room, "Connected to messaging backend");
            }
            SessionNotification::ServerMessage { text } => match self.log.as_mut() {
                Some(log) => {
                    log.append_inbound(SERVER_SENDER, &text);
                }
                None => debug!("No chat open, dropping server message"),
            },
            SessionNotification::Rejected { reason } => {
                debug!(reason = %reason, "Ignored inbound frame");
            }
            SessionNotification::Disconnected { reason } => {
                warn!(reason = %reason, "Disconnected from messaging backend");
            }
        }
    }

    /// Close the session gracefully before exiting.
    pub async fn shutdown(&mut self) {
        if let Some(session) = self.session.take() {
            session.close().await;
        }
    }

    // ------------------------------------------------------------------
    // Sidebar and chat
    // ------------------------------------------------------------------

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn sidebar_filter(&self) -> &str {
        &self.sidebar_filter
    }

    pub fn set_sidebar_filter(&mut self, query: &str) {
        self.sidebar_filter = query.to_string();
    }

    pub fn visible_chats(&self) -> Vec<&ChatSummary> {
        self.roster.filter_by_name(&self.sidebar_filter)
    }

    /// Summary of the chat named by the route, if it exists.
    pub fn current_chat(&self) -> Option<&ChatSummary> {
        self.route.chat_id().and_then(|id| self.roster.get(id))
    }

    pub fn log(&self) -> Option<&MessageLog> {
        self.log.as_ref()
    }

    /// Append `text` to the open chat and emit it.
    ///
    /// Returns `None` when nothing was appended. A message appended while
    /// disconnected stays in the log and reports [`SendOutcome::Dropped`].
    pub fn send_message(&mut self, text: &str) -> Option<SendOutcome> {
        if text.trim().is_empty() {
            self.notify(ValidationError::EmptyMessage);
            return None;
        }
        let Some(log) = self.log.as_mut() else {
            self.notices.push(Notice::error("Open a chat to send messages"));
            return None;
        };
        log.append_own(OWN_SENDER, text);

        let outcome = match self.session.as_ref() {
            Some(session) => match session.send_message(text) {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.notify(e);
                    SendOutcome::Dropped
                }
            },
            None => SendOutcome::Dropped,
        };
        if outcome == SendOutcome::Dropped {
            debug!("Message kept locally, backend not reachable");
        }
        Some(outcome)
    }

    // ------------------------------------------------------------------
    // Modals
    // ------------------------------------------------------------------

    pub fn modal(&self) -> Option<Modal> {
        self.modal.as_ref().map(ActiveModal::kind)
    }

    pub fn active_modal(&self) -> Option<&ActiveModal> {
        self.modal.as_ref()
    }

    /// Open `kind`, closing whatever modal was open.
    pub fn open_modal(&mut self, kind: Modal) {
        if !self.route.is_authenticated() {
            self.notices.push(Notice::error("Sign in first"));
            return;
        }
        self.close_modal();

        let modal = match kind {
            Modal::FileUpload => ActiveModal::FileUpload(FileUploadModal::new()),
            Modal::ImageUpload => ActiveModal::ImageUpload(ImageUploadModal::new(self.previews.clone())),
            Modal::Profile => ActiveModal::Profile(self.profile.clone()),
            Modal::CreateChat => ActiveModal::CreateChat(CreateChatFlow::new(
                Arc::clone(&self.deps.directory),
                self.config.search_debounce,
            )),
        };
        debug!(modal = %kind, "Modal opened");
        self.modal = Some(modal);
    }

    /// Close the open modal, discarding its selection and previews.
    pub fn close_modal(&mut self) {
        if let Some(modal) = self.modal.take() {
            debug!(modal = %modal.kind(), "Modal closed");
        }
    }

    pub fn file_modal_mut(&mut self) -> Option<&mut FileUploadModal> {
        match self.modal.as_mut() {
            Some(ActiveModal::FileUpload(modal)) => Some(modal),
            _ => None,
        }
    }

    pub fn image_modal_mut(&mut self) -> Option<&mut ImageUploadModal> {
        match self.modal.as_mut() {
            Some(ActiveModal::ImageUpload(modal)) => Some(modal),
            _ => None,
        }
    }

    pub fn create_chat_mut(&mut self) -> Option<&mut CreateChatFlow> {
        match self.modal.as_mut() {
            Some(ActiveModal::CreateChat(flow)) => Some(flow),
            _ => None,
        }
    }

    /// Image previews not yet released.
    pub fn live_previews(&self) -> usize {
        self.previews.live()
    }

    /// Add files to the open upload modal. Each rejection becomes a notice.
    pub fn add_upload_files(&mut self, files: Vec<SelectedFile>) -> Option<AddFilesReport> {
        let report = match self.modal.as_mut() {
            Some(ActiveModal::FileUpload(modal)) => modal.add_files(files),
            Some(ActiveModal::ImageUpload(modal)) => modal.add_files(files),
            _ => {
                self.notices.push(Notice::error("No upload dialog open"));
                return None;
            }
        };
        for error in &report.rejected {
            self.notices.push(Notice::error(error.to_string()));
        }
        Some(report)
    }

    /// Confirm the open upload modal. Closes it once the selection was
    /// handed off; an empty selection leaves it open.
    pub fn upload(&mut self) -> Option<UploadOutcome> {
        let handoff = Arc::clone(&self.deps.uploads);
        let outcome = match self.modal.as_mut() {
            Some(ActiveModal::FileUpload(modal)) => modal.upload(handoff.as_ref()),
            Some(ActiveModal::ImageUpload(modal)) => modal.upload(handoff.as_ref()),
            _ => return None,
        };
        if let UploadOutcome::Uploaded { count } = outcome {
            self.close_modal();
            self.notices.push(Notice::info(format!("Uploading {count} file(s)")));
        }
        Some(outcome)
    }

    /// Create the chat described by the open create-chat flow and go there.
    pub fn submit_create_chat(&mut self) -> Option<ChatId> {
        let request = match self.modal.as_ref() {
            Some(ActiveModal::CreateChat(flow)) => flow.request(),
            _ => return None,
        };

        let created = self
            .roster
            .create_chat(request)
            .map(|chat| (chat.id.clone(), chat.name.clone()));
        match created {
            Ok((id, name)) => {
                self.close_modal();
                self.notices.push(Notice::info(format!("Created chat {name}")));
                self.open_chat(&id);
                Some(id)
            }
            Err(e) => {
                self.notify(e);
                None
            }
        }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    // ------------------------------------------------------------------
    // Notices
    // ------------------------------------------------------------------

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn notify(&mut self, error: impl Into<StoreError>) {
        let error = error.into();
        debug!(error = %error, "Action rejected");
        self.notices.push(Notice::error(error.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::modals::LoggingHandoff;
    use huddle_net::{MemoryConnector, NetError};
    use huddle_shared::types::UserCandidate;

    struct NoUsers;

    #[async_trait]
    impl UserSearch for NoUsers {
        async fn search(&self, _query: &str) -> Result<Vec<UserCandidate>, NetError> {
            Ok(Vec::new())
        }
    }

    fn shell() -> (Shell, MemoryConnector) {
        let (connector, _peers) = MemoryConnector::new();
        let deps = ShellDeps {
            connector: Arc::new(connector.clone()),
            directory: Arc::new(NoUsers),
            uploads: Arc::new(LoggingHandoff),
        };
        let shell = Shell::new(
            ClientConfig::default(),
            deps,
            seed::default_roster(),
            seed::default_messages(),
        );
        (shell, connector)
    }

    #[tokio::test]
    async fn test_sign_in_screen_has_no_session() {
        let (shell, _connector) = shell();
        assert_eq!(shell.route(), &Route::SignIn);
        assert!(!shell.has_session());
        assert!(shell.log().is_none());
    }

    #[tokio::test]
    async fn test_chat_route_seeds_log() {
        let (mut shell, _connector) = shell();
        shell.navigate("/home/chat/3");
        assert_eq!(shell.current_chat().unwrap().name, "Dev Team");
        let log = shell.log().unwrap();
        assert_eq!(log.chat_id(), &ChatId::from("3"));
        assert_eq!(log.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_chat_renders_not_found() {
        let (mut shell, _connector) = shell();
        shell.navigate("/home/chat/nope");
        assert_eq!(shell.route(), &Route::Chat(ChatId::from("nope")));
        assert!(shell.current_chat().is_none());
        assert!(shell.log().is_none());
    }

    #[tokio::test]
    async fn test_inbound_without_open_chat_is_dropped() {
        let (mut shell, _connector) = shell();
        shell.navigate("/home");
        shell.apply_notification(SessionNotification::ServerMessage { text: "hi".into() });
        assert!(shell.log().is_none());

        shell.navigate("/home/chat/1");
        shell.apply_notification(SessionNotification::ServerMessage { text: "hi".into() });
        let last = shell.log().unwrap().last().unwrap();
        assert_eq!(last.sender, "Server");
        assert!(!last.is_own);
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected() {
        let (mut shell, _connector) = shell();
        shell.navigate("/home/chat/1");
        assert!(shell.send_message("   ").is_none());
        assert_eq!(shell.log().unwrap().len(), 3);
        assert_eq!(shell.notices()[0].text, "Message is empty");
    }

    #[tokio::test]
    async fn test_send_without_chat_is_rejected() {
        let (mut shell, _connector) = shell();
        shell.navigate("/home");
        assert!(shell.send_message("hi").is_none());
        assert!(shell.notices()[0].is_error());
    }

    #[tokio::test]
    async fn test_one_modal_at_a_time() {
        let (mut shell, _connector) = shell();
        shell.open_modal(Modal::Profile);
        assert_eq!(shell.modal(), None, "modals need the authenticated area");

        shell.navigate("/home");
        shell.open_modal(Modal::ImageUpload);
        shell.add_upload_files(vec![SelectedFile::new("a.png", 1)]);
        assert_eq!(shell.live_previews(), 1);

        shell.open_modal(Modal::Profile);
        assert_eq!(shell.modal(), Some(Modal::Profile));
        assert_eq!(shell.live_previews(), 0);

        shell.close_modal();
        assert_eq!(shell.modal(), None);
    }

    #[tokio::test]
    async fn test_logout_closes_modal() {
        let (mut shell, _connector) = shell();
        shell.navigate("/home");
        shell.open_modal(Modal::FileUpload);
        shell.logout();
        assert_eq!(shell.modal(), None);
        assert!(!shell.has_session());
    }

    #[tokio::test]
    async fn test_sidebar_filter() {
        let (mut shell, _connector) = shell();
        shell.set_sidebar_filter("team");
        let names: Vec<_> = shell.visible_chats().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Team Alpha", "Dev Team"]);
    }

    #[tokio::test]
    async fn test_invalid_seed_file_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(&path, "{ not json").unwrap();

        let (connector, _peers) = MemoryConnector::new();
        let config = ClientConfig {
            seed_messages_path: Some(path),
            search_debounce: Duration::from_millis(10),
            ..ClientConfig::default()
        };
        let deps = ShellDeps {
            connector: Arc::new(connector),
            directory: Arc::new(NoUsers),
            uploads: Arc::new(LoggingHandoff),
        };
        assert!(matches!(
            Shell::from_config(config, deps),
            Err(ClientError::Store(StoreError::SeedFormat(_)))
        ));
    }
}
