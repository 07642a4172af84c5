// src/session.rs

use crate::aggregator::aggregate;
use crate::client::{fetch_all_languages, ProfileSource};
use crate::error::QueryError;
use crate::model::ProfileData;
use tracing::{info, warn};

/// Trims a submitted username, rejecting blank input before any network call
pub fn validate_username(raw: &str) -> Result<String, QueryError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(QueryError::Validation);
    }
    Ok(trimmed.to_string())
}

/// Identifies one issued query
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueryTicket(u64);

/// Issues monotonically increasing tickets; only the newest may commit.
#[derive(Debug, Default)]
pub struct QuerySequencer {
    latest: u64,
}

impl QuerySequencer {
    pub fn issue(&mut self) -> QueryTicket {
        self.latest += 1;
        QueryTicket(self.latest)
    }

    pub fn is_current(&self, ticket: QueryTicket) -> bool {
        ticket.0 == self.latest
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, title: title.into(), message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, title: "Error".into(), message: message.into() }
    }
}

/// The single "current query" slot plus what the shell displays around it
#[derive(Debug, Default)]
pub struct Session {
    sequencer: QuerySequencer,
    data: Option<ProfileData>,
    /// Persistent banner; cleared by the next successful query
    error: Option<String>,
    in_flight: bool,
    notices: Vec<Notice>,
}

impl Session {
    pub fn data(&self) -> Option<&ProfileData> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Mirrors the disabled state of the submit control
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Drains pending notifications
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Validates input and opens a new query. Blank input raises a notice and
    /// returns `None` without touching the slot.
    pub fn begin(&mut self, raw: &str) -> Option<(QueryTicket, String)> {
        let username = match validate_username(raw) {
            Ok(username) => username,
            Err(e) => {
                self.notices.push(Notice::error(e.to_string()));
                return None;
            }
        };
        self.in_flight = true;
        self.error = None;
        if username.eq_ignore_ascii_case("torvalds") {
            self.notices.push(Notice::info(
                "Easter Egg Found!",
                "You've found the Linux creator! Let's see his contributions...",
            ));
        }
        Some((self.sequencer.issue(), username))
    }

    /// Commits a finished query. Returns false, leaving the slot untouched,
    /// when a newer query has been issued since `ticket`.
    pub fn complete(&mut self, ticket: QueryTicket, result: Result<ProfileData, QueryError>) -> bool {
        if !self.sequencer.is_current(ticket) {
            info!(?ticket, "discarding stale query result");
            return false;
        }
        self.in_flight = false;
        match result {
            Ok(data) => {
                self.notices.push(Notice::info(
                    "Data Loaded Successfully",
                    format!("Found {} repositories for {}", data.repos.len(), data.user.display_name()),
                ));
                self.error = None;
                self.data = Some(data);
            }
            Err(e) => {
                warn!(error = %e, "query failed");
                let message = e.to_string();
                self.notices.push(Notice::error(message.clone()));
                self.error = Some(message);
                self.data = None;
            }
        }
        true
    }

    /// Runs a full query against `source` and commits it
    pub async fn search<S>(&mut self, source: &S, raw: &str) -> bool
    where
        S: ProfileSource + ?Sized,
    {
        let Some((ticket, username)) = self.begin(raw) else {
            return false;
        };
        let result = load_profile(source, &username).await;
        self.complete(ticket, result)
    }
}

/// User, then repositories, then every repository's languages concurrently.
/// A user or listing failure aborts before any language fetch starts.
pub async fn load_profile<S>(source: &S, username: &str) -> Result<ProfileData, QueryError>
where
    S: ProfileSource + ?Sized,
{
    info!(%username, "loading profile");
    let user = source.user(username).await.map_err(QueryError::UserFetch)?;
    let repos = source.repos(username).await.map_err(QueryError::RepoListFetch)?;
    let by_repo = fetch_all_languages(source, username, &repos).await;
    let languages = aggregate(&repos, &by_repo);
    info!(repos = repos.len(), languages = languages.len(), "profile loaded");
    Ok(ProfileData { user, repos, languages })
}
