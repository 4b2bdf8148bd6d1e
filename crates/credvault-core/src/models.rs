//! Data models for credentials, activity, and vault configuration

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain;
use crate::strength;

/// Signed-in identity, supplied by whatever authenticates the session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Account login (usually an email)
    pub login: String,
}

impl User {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, login: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            login: login.into(),
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A stored credential
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Assigned at creation, never reused
    pub id: Uuid,

    /// Service name or URL
    pub platform: String,

    /// Account identifier on that platform
    pub login: String,

    /// Secret value, opaque to the vault
    pub password: String,

    /// Score of `password`, recomputed whenever the password changes or is loaded
    pub strength: u8,

    /// Creation or last update time
    pub timestamp: DateTime<Utc>,
}

impl CredentialRecord {
    /// Create a record with a fresh id and computed strength
    pub fn new(platform: String, login: String, password: String, now: DateTime<Utc>) -> Self {
        let strength = strength::score(&password).value;
        Self {
            id: Uuid::new_v4(),
            platform,
            login,
            password,
            strength,
            timestamp: now,
        }
    }

    /// Replace the password, rescoring and restamping the record
    pub fn set_password(&mut self, password: String, now: DateTime<Utc>) {
        self.strength = strength::score(&password).value;
        self.password = password;
        self.timestamp = now;
    }

    /// Recompute strength from the stored password
    pub fn rescore(&mut self) {
        self.strength = strength::score(&self.password).value;
    }

    /// Canonical display domain of `platform`
    pub fn domain(&self) -> String {
        domain::normalize(&self.platform)
    }

    pub fn matches(&self, platform: &str, login: &str) -> bool {
        self.platform == platform && self.login == login
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("id", &self.id)
            .field("platform", &self.platform)
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("strength", &self.strength)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

/// What an activity event records
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A credential was saved for the first time
    Created,
    /// A credential's password was replaced
    Updated,
    /// A credential was removed
    Deleted,
    /// A stored password was read back
    Revealed,
    /// The user signed in to a platform with a stored credential
    Login,
}

impl ActivityKind {
    /// Presentation tag for the activity list
    pub fn color(&self) -> &'static str {
        match self {
            ActivityKind::Created => "green",
            ActivityKind::Updated => "blue",
            ActivityKind::Deleted => "red",
            ActivityKind::Revealed => "gray",
            ActivityKind::Login => "purple",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Created => "created",
            ActivityKind::Updated => "updated",
            ActivityKind::Deleted => "deleted",
            ActivityKind::Revealed => "revealed",
            ActivityKind::Login => "login",
        }
    }
}

/// One entry of the activity history. Never mutated once logged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityEvent {
    /// Local wall time, `HH:MM`
    pub time: String,

    /// "Today", "Yesterday", or a formatted date
    pub date: String,

    /// Source platform or URL as supplied by the caller
    pub name: String,

    /// Login used
    pub email: String,

    /// Presentation tag
    pub color: String,

    pub kind: ActivityKind,

    pub occurred_at: DateTime<Utc>,
}

/// Language for relative day labels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ActivityLanguage {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "pl")]
    Polish,
}

impl ActivityLanguage {
    pub fn today(&self) -> &'static str {
        match self {
            ActivityLanguage::English => "Today",
            ActivityLanguage::Polish => "Dziś",
        }
    }

    pub fn yesterday(&self) -> &'static str {
        match self {
            ActivityLanguage::English => "Yesterday",
            ActivityLanguage::Polish => "Wczoraj",
        }
    }

    /// `chrono` format for dates older than yesterday
    pub fn date_format(&self) -> &'static str {
        match self {
            ActivityLanguage::English => "%Y-%m-%d",
            ActivityLanguage::Polish => "%d.%m.%Y",
        }
    }
}

/// Vault configuration (non-sensitive, stored in plaintext)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VaultConfig {
    /// Language for "Today"/"Yesterday" labels
    pub activity_language: ActivityLanguage,

    /// Default length of the recent passwords/activity views
    pub recent_limit: usize,

    /// Opt-in cap on events kept per vault, oldest dropped first (0 = unbounded)
    pub activity_capacity: usize,

    /// Fixed UTC offset for activity labels; absent uses the host zone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,

    /// Signed-in user; absent means a guest session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            activity_language: ActivityLanguage::English,
            recent_limit: 5,
            activity_capacity: 0,
            utc_offset_minutes: None,
            user: None,
        }
    }
}

impl VaultConfig {
    /// `utc_offset_minutes` as an offset; out-of-range values are ignored
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .and_then(|minutes| minutes.checked_mul(60))
            .and_then(FixedOffset::east_opt)
    }
}

/// Serializable state of one user's vault
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct VaultSnapshot {
    /// Schema version for migrations
    pub version: u32,

    /// Records in insertion order
    pub records: Vec<CredentialRecord>,

    /// Events oldest first
    pub activity: Vec<ActivityEvent>,
}

impl VaultSnapshot {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn empty() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            records: Vec::new(),
            activity: Vec::new(),
        }
    }
}
