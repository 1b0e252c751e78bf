//! User directory client used by the create-chat flow.
//!
//! Keystrokes go through [`DirectoryClient::set_query`], which debounces them:
//! each call cancels the pending timer and starts a new quiet period, so one
//! request fires per pause in typing. Requests that already fired are never
//! cancelled, but a response for a superseded query is discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use huddle_shared::constants::USER_SEARCH_PATH;
use huddle_shared::types::UserCandidate;

use crate::error::NetError;
use crate::transport::append_path;

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// A searchable user directory.
#[async_trait]
pub trait UserSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<UserCandidate>, NetError>;
}

/// `GET {base}/users/search?query=<q>` against the HTTP backend.
#[derive(Debug, Clone)]
pub struct HttpUserDirectory {
    http: reqwest::Client,
    search_url: Url,
}

/// The endpoint answers either `{"users": [...]}` or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Wrapped { users: Vec<UserCandidate> },
    Bare(Vec<UserCandidate>),
}

impl HttpUserDirectory {
    pub fn new(base: &Url) -> Result<Self, NetError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("huddle/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            search_url: append_path(base, USER_SEARCH_PATH)?,
        })
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }
}

#[async_trait]
impl UserSearch for HttpUserDirectory {
    async fn search(&self, query: &str) -> Result<Vec<UserCandidate>, NetError> {
        debug!(url = %self.search_url, query, "Searching users");
        let response = self
            .http
            .get(self.search_url.clone())
            .query(&[("query", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetError::Status(status.as_u16()));
        }

        let users = match response.json::<SearchResponse>().await? {
            SearchResponse::Wrapped { users } => users,
            SearchResponse::Bare(users) => users,
        };
        Ok(users)
    }
}

// ---------------------------------------------------------------------------
// Debounced client
// ---------------------------------------------------------------------------

/// What the create-chat view shows under the search box.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchState {
    /// No query typed.
    #[default]
    Idle,
    /// Waiting for the quiet period to elapse or the response to arrive.
    Pending { query: String },
    Loaded {
        query: String,
        users: Vec<UserCandidate>,
    },
    /// The request failed. Recoverable: typing again issues a new request.
    Failed { query: String, message: String },
}

impl SearchState {
    pub fn users(&self) -> &[UserCandidate] {
        match self {
            SearchState::Loaded { users, .. } => users,
            _ => &[],
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SearchState::Pending { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SearchState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

pub struct DirectoryClient {
    backend: Arc<dyn UserSearch>,
    quiet_period: Duration,
    state_tx: Arc<watch::Sender<SearchState>>,
    state_rx: watch::Receiver<SearchState>,
    /// Bumped on every keystroke; responses tagged with an older value are stale.
    generation: Arc<AtomicU64>,
    timer: Option<JoinHandle<()>>,
    query: String,
}

impl DirectoryClient {
    pub fn new(backend: Arc<dyn UserSearch>, quiet_period: Duration) -> Self {
        let (state_tx, state_rx) = watch::channel(SearchState::Idle);
        Self {
            backend,
            quiet_period,
            state_tx: Arc::new(state_tx),
            state_rx,
            generation: Arc::new(AtomicU64::new(0)),
            timer: None,
            query: String::new(),
        }
    }

    /// The query as last typed.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn state(&self) -> SearchState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state_rx.clone()
    }

    /// Record a keystroke.
    ///
    /// A blank query clears results and errors without a request. Anything
    /// else restarts the quiet period; when it elapses, one request is made
    /// for the trimmed query. Must be called inside a tokio runtime.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.cancel_timer();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let trimmed = query.trim().to_string();
        if trimmed.is_empty() {
            self.state_tx.send_replace(SearchState::Idle);
            return;
        }

        self.state_tx.send_replace(SearchState::Pending {
            query: trimmed.clone(),
        });

        let backend = Arc::clone(&self.backend);
        let state_tx = Arc::clone(&self.state_tx);
        let latest = Arc::clone(&self.generation);
        let deadline = tokio::time::Instant::now() + self.quiet_period;

        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            debug!(query = %trimmed, "Debounce elapsed, searching");

            // Detached so a later keystroke cannot cancel an in-flight request.
            tokio::spawn(async move {
                let result = backend.search(&trimmed).await;

                if latest.load(Ordering::SeqCst) != generation {
                    debug!(query = %trimmed, "Discarding response for superseded query");
                    return;
                }

                let state = match result {
                    Ok(users) => {
                        info!(query = %trimmed, count = users.len(), "User search completed");
                        SearchState::Loaded {
                            query: trimmed,
                            users,
                        }
                    }
                    Err(e) => {
                        warn!(query = %trimmed, error = %e, "User search failed");
                        SearchState::Failed {
                            query: trimmed,
                            message: format!("Failed to search users: {e}"),
                        }
                    }
                };
                state_tx.send_replace(state);
            });
        }));
    }

    /// Forget the query, as if the search box was emptied.
    pub fn clear(&mut self) {
        self.set_query("");
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for DirectoryClient {
    fn drop(&mut self) {
        self.cancel_timer();
        // Invalidate any request still in flight.
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::time::Instant;

    use super::*;
    use huddle_shared::types::UserId;

    const QUIET: Duration = Duration::from_millis(800);

    fn alice() -> UserCandidate {
        UserCandidate {
            id: UserId::from("1"),
            name: "Alice Johnson".into(),
            username: "alice@example.com".into(),
        }
    }

    /// Records every request; answers after an optional per-query delay.
    #[derive(Default)]
    struct RecordingSearch {
        calls: Mutex<Vec<(String, Instant)>>,
        fail: bool,
        slow_query: Option<(String, Duration)>,
    }

    impl RecordingSearch {
        fn calls(&self) -> Vec<(String, Instant)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UserSearch for RecordingSearch {
        async fn search(&self, query: &str) -> Result<Vec<UserCandidate>, NetError> {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_string(), Instant::now()));
            if let Some((slow, delay)) = &self.slow_query {
                if slow == query {
                    tokio::time::sleep(*delay).await;
                }
            }
            if self.fail {
                return Err(NetError::Status(500));
            }
            Ok(vec![alice()])
        }
    }

    #[test]
    fn test_search_url_keeps_base_path() {
        let base = Url::parse("http://localhost:8000/api").unwrap();
        let directory = HttpUserDirectory::new(&base).unwrap();
        assert_eq!(
            directory.search_url().as_str(),
            "http://localhost:8000/api/users/search"
        );

        let root = Url::parse("http://localhost:8000/").unwrap();
        let directory = HttpUserDirectory::new(&root).unwrap();
        assert_eq!(
            directory.search_url().as_str(),
            "http://localhost:8000/users/search"
        );
    }

    async fn settled(rx: &mut watch::Receiver<SearchState>) -> SearchState {
        loop {
            rx.changed().await.unwrap();
            let state = rx.borrow_and_update().clone();
            if matches!(state, SearchState::Loaded { .. } | SearchState::Failed { .. }) {
                return state;
            }
        }
    }

    fn assert_fired_after_quiet_period(elapsed: Duration) {
        assert!(
            elapsed >= QUIET && elapsed < QUIET + Duration::from_millis(5),
            "request fired {elapsed:?} after the keystroke"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_request_after_quiet_period() {
        let backend = Arc::new(RecordingSearch::default());
        let mut client = DirectoryClient::new(backend.clone(), QUIET);
        let mut rx = client.subscribe();

        let typed_at = Instant::now();
        client.set_query("general");
        assert_eq!(
            client.state(),
            SearchState::Pending {
                query: "general".into()
            }
        );

        let state = settled(&mut rx).await;
        assert_eq!(state.users(), &[alice()]);

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "general");
        assert_fired_after_quiet_period(calls[0].1 - typed_at);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystroke_within_window_supersedes_pending_query() {
        let backend = Arc::new(RecordingSearch::default());
        let mut client = DirectoryClient::new(backend.clone(), QUIET);
        let mut rx = client.subscribe();

        client.set_query("general");
        tokio::time::advance(Duration::from_millis(500)).await;
        let last_keystroke = Instant::now();
        client.set_query("general2");

        let state = settled(&mut rx).await;
        assert!(matches!(state, SearchState::Loaded { ref query, .. } if query == "general2"));

        tokio::time::sleep(Duration::from_secs(5)).await;
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "general2");
        assert_fired_after_quiet_period(calls[0].1 - last_keystroke);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_typing_fires_once() {
        let backend = Arc::new(RecordingSearch::default());
        let mut client = DirectoryClient::new(backend.clone(), QUIET);

        for prefix in ["a", "al", "ali", "alic", "alice"] {
            client.set_query(prefix);
            tokio::time::advance(Duration::from_millis(300)).await;
        }
        tokio::time::sleep(Duration::from_secs(3)).await;

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "alice");
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_query_short_circuits_and_cancels() {
        let backend = Arc::new(RecordingSearch::default());
        let mut client = DirectoryClient::new(backend.clone(), QUIET);

        client.set_query("ali");
        tokio::time::advance(Duration::from_millis(200)).await;
        client.set_query("   ");
        assert_eq!(client.state(), SearchState::Idle);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(backend.calls().is_empty());
        assert_eq!(client.state(), SearchState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_query_clears_error() {
        let backend = Arc::new(RecordingSearch {
            fail: true,
            ..Default::default()
        });
        let mut client = DirectoryClient::new(backend, QUIET);
        let mut rx = client.subscribe();

        client.set_query("bob");
        let state = settled(&mut rx).await;
        assert!(state.error().is_some());

        client.clear();
        assert_eq!(client.state(), SearchState::Idle);
        assert!(client.state().error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_reports_error_without_results() {
        let backend = Arc::new(RecordingSearch {
            fail: true,
            ..Default::default()
        });
        let mut client = DirectoryClient::new(backend, QUIET);
        let mut rx = client.subscribe();

        client.set_query("carol");
        let state = settled(&mut rx).await;
        match &state {
            SearchState::Failed { query, message } => {
                assert_eq!(query, "carol");
                assert!(message.contains("500"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(state.users().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_does_not_overwrite_newer_results() {
        let backend = Arc::new(RecordingSearch {
            slow_query: Some(("a".into(), Duration::from_secs(2))),
            ..Default::default()
        });
        let mut client = DirectoryClient::new(backend.clone(), QUIET);
        let mut rx = client.subscribe();

        client.set_query("a");
        // Let the first request fire, then keep typing while it is in flight.
        tokio::time::sleep(Duration::from_millis(1000)).await;
        client.set_query("ab");

        let state = settled(&mut rx).await;
        assert!(matches!(state, SearchState::Loaded { ref query, .. } if query == "ab"));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(matches!(
            client.state(),
            SearchState::Loaded { ref query, .. } if query == "ab"
        ));
        let queries: Vec<String> = backend.calls().into_iter().map(|(q, _)| q).collect();
        assert_eq!(queries, vec!["a", "ab"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_is_trimmed_before_sending() {
        let backend = Arc::new(RecordingSearch::default());
        let mut client = DirectoryClient::new(backend.clone(), QUIET);
        let mut rx = client.subscribe();

        client.set_query("  dave ");
        settled(&mut rx).await;
        assert_eq!(backend.calls()[0].0, "dave");
        assert_eq!(client.query(), "  dave ");
    }
}
