// src/model.rs

use chrono::{DateTime, Utc};
use image::Rgb;
use serde::Deserialize;
use std::collections::HashMap;

/// Bytes of source per language name, as reported for one repository
pub type ByteMap = HashMap<String, u64>;

/// Maps a repository name to its byte map
pub type LanguagesByRepo = HashMap<String, ByteMap>;

/// Aggregated statistics keyed by language name
pub type LanguageStats = HashMap<String, LanguageStat>;

/// A public account on the hosting platform
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub public_repos: u32,
    #[serde(default)]
    pub followers: u32,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Name shown in summaries, falling back to the login
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.login)
    }
}

/// One repository as listed for a user. Immutable once fetched.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "stargazers_count")]
    pub star_count: u32,
    /// The platform's primary language for the repository
    pub language: Option<String>,
    #[serde(rename = "fork")]
    pub is_fork: bool,
    #[serde(default)]
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregated usage of one language across every queried repository
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageStat {
    pub name: String,
    pub color: Rgb<u8>,
    pub total_bytes: u64,
    /// Share of all bytes, in [0, 100]
    pub percentage: f64,
}

/// Everything one successful query produced
#[derive(Debug, Clone)]
pub struct ProfileData {
    pub user: User,
    /// Most recently updated first
    pub repos: Vec<Repository>,
    pub languages: LanguageStats,
}
