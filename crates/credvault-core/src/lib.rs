//! Credvault Core - credential vault state for one user session
//!
//! This crate provides:
//! - A credential store with create, upsert and remove operations
//! - An append-only activity history with relative day labels
//! - Live password strength scoring
//! - Canonical display domains for platform names and URLs
//! - A per-session facade tying the above to the signed-in user
//! - JSON snapshot and TOML config storage

pub mod models;
pub mod clock;
pub mod domain;
pub mod strength;
pub mod activity;
pub mod store;
pub mod context;
pub mod storage;
pub mod error;

pub use models::*;
pub use clock::*;
pub use activity::ActivityLog;
pub use store::{CredentialStore, Upsert};
pub use context::{DomainGroup, VaultContext};
pub use strength::{StrengthLabel, StrengthScore};
pub use storage::*;
pub use error::*;
