//! Per-session vault facade
//!
//! One `VaultContext` is built per session and passed by reference to every
//! consumer. It owns the credential store and activity log of the signed-in
//! user and ties them together: every successful mutation logs exactly one
//! activity event, and a rejected mutation logs none.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::activity::ActivityLog;
use crate::clock::Clock;
use crate::domain;
use crate::error::{VaultError, VaultResult};
use crate::models::{ActivityEvent, ActivityKind, CredentialRecord, User, VaultConfig, VaultSnapshot};
use crate::store::CredentialStore;

/// Records sharing one canonical domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainGroup {
    pub domain: String,
    pub count: usize,
    /// Newest timestamp among the group's records
    pub latest: DateTime<Utc>,
}

/// Signed-in state, dropped wholesale on sign-out
struct Session {
    user: User,
    store: CredentialStore,
    log: ActivityLog,
}

/// Vault state for one user session
pub struct VaultContext {
    /// None for a guest session
    session: Option<Session>,
    config: VaultConfig,
    clock: Arc<dyn Clock>,
}

impl VaultContext {
    /// Start a session with an empty vault, or a guest session if `user` is None
    pub fn new(user: Option<User>, config: VaultConfig, clock: Arc<dyn Clock>) -> Self {
        let session = user.map(|user| Session {
            user,
            store: CredentialStore::new(),
            log: ActivityLog::new(config.activity_language, config.activity_capacity)
                .with_offset(config.utc_offset()),
        });

        Self {
            session,
            config,
            clock,
        }
    }

    pub fn guest(config: VaultConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(None, config, clock)
    }

    /// Start a session for `user` from a stored snapshot
    pub fn restore(
        user: User,
        snapshot: VaultSnapshot,
        config: VaultConfig,
        clock: Arc<dyn Clock>,
    ) -> VaultResult<Self> {
        if snapshot.version > VaultSnapshot::CURRENT_VERSION {
            return Err(VaultError::UnsupportedVersion(snapshot.version));
        }

        let store = CredentialStore::from_records(snapshot.records);
        let log = ActivityLog::from_events(
            snapshot.activity,
            config.activity_language,
            config.activity_capacity,
        )
        .with_offset(config.utc_offset());
        debug!(user = %user.id, records = store.len(), events = log.len(), "Vault restored");

        Ok(Self {
            session: Some(Session { user, store, log }),
            config,
            clock,
        })
    }

    /// Signed-in user, if any
    pub fn current_user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn is_guest(&self) -> bool {
        self.session.is_none()
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// End the session, discarding its records and activity
    pub fn sign_out(&mut self) {
        if let Some(session) = self.session.take() {
            info!(user = %session.user.id, "Signed out, vault discarded");
        }
    }

    /// Save a new credential
    pub fn add_password(
        &mut self,
        platform: &str,
        login: &str,
        password: &str,
    ) -> VaultResult<CredentialRecord> {
        let now = self.clock.now();
        let session = self.session_mut()?;

        let record = session.store.add_password(platform, login, password, now)?;
        session.log.record(ActivityKind::Created, platform, login, now);

        info!(id = %record.id, "Credential created");
        Ok(record)
    }

    /// Replace the password for `(platform, login)`, creating the credential
    /// if there is none yet
    pub fn update_password(
        &mut self,
        new_password: &str,
        platform: &str,
        login: &str,
    ) -> VaultResult<CredentialRecord> {
        let now = self.clock.now();
        let session = self.session_mut()?;

        let outcome = session
            .store
            .update_password(new_password, platform, login, now)?;
        session
            .log
            .record(outcome.activity_kind(), platform, login, now);

        info!(id = %outcome.record().id, kind = outcome.activity_kind().as_str(), "Credential saved");
        Ok(outcome.into_record())
    }

    /// Delete a credential by id
    pub fn remove_password(&mut self, id: &Uuid) -> VaultResult<CredentialRecord> {
        let now = self.clock.now();
        let session = self.session_mut()?;

        let record = session.store.remove(id)?;
        session
            .log
            .record(ActivityKind::Deleted, &record.platform, &record.login, now);

        info!(id = %record.id, "Credential removed");
        Ok(record)
    }

    /// Read back a stored password, logging the read
    pub fn reveal_password(&mut self, id: &Uuid) -> VaultResult<String> {
        let now = self.clock.now();
        let session = self.session_mut()?;

        let record = session
            .store
            .get(id)
            .ok_or(VaultError::RecordNotFound(*id))?;
        let password = record.password.clone();
        let (platform, login) = (record.platform.clone(), record.login.clone());
        session
            .log
            .record(ActivityKind::Revealed, &platform, &login, now);

        debug!(id = %id, "Password revealed");
        Ok(password)
    }

    /// Log a sign-in to `platform` made with a stored credential
    pub fn record_login(&mut self, platform: &str, login: &str) -> VaultResult<ActivityEvent> {
        let now = self.clock.now();
        let session = self.session_mut()?;
        Ok(session.log.record(ActivityKind::Login, platform, login, now))
    }

    /// Most recently created or updated credentials
    pub fn recent_passwords(&self, limit: usize) -> Vec<CredentialRecord> {
        match &self.session {
            Some(session) => session.store.list().into_iter().take(limit).collect(),
            None => Vec::new(),
        }
    }

    /// Newest activity first
    pub fn recent_activity(&self, limit: usize) -> Vec<ActivityEvent> {
        match &self.session {
            Some(session) => session.log.recent(Some(limit), self.clock.now()),
            None => Vec::new(),
        }
    }

    /// Credentials grouped by canonical domain, most recently touched group first
    pub fn recent_domains(&self, limit: usize) -> Vec<DomainGroup> {
        let Some(session) = &self.session else {
            return Vec::new();
        };

        let mut groups: Vec<DomainGroup> = Vec::new();
        for record in session.store.list() {
            let domain = domain::normalize(&record.platform);
            match groups.iter_mut().find(|g| g.domain == domain) {
                Some(group) => group.count += 1,
                None => groups.push(DomainGroup {
                    domain,
                    count: 1,
                    latest: record.timestamp,
                }),
            }
        }

        groups.truncate(limit);
        groups
    }

    /// Number of stored credentials (0 for a guest)
    pub fn password_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.store.len())
    }

    /// Serializable copy of the vault, None for a guest
    pub fn snapshot(&self) -> Option<VaultSnapshot> {
        self.session.as_ref().map(|session| VaultSnapshot {
            version: VaultSnapshot::CURRENT_VERSION,
            records: session.store.records().to_vec(),
            activity: session.log.events().to_vec(),
        })
    }

    fn session_mut(&mut self) -> VaultResult<&mut Session> {
        match self.session.as_mut() {
            Some(session) => Ok(session),
            None => {
                warn!("Vault mutation rejected: no user signed in");
                Err(VaultError::Unauthenticated)
            }
        }
    }
}
