//! In-memory credential store
//!
//! Records are kept in insertion order and carry unique ids. Recency views
//! are computed on read from record timestamps.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::warn;
use uuid::Uuid;

use crate::error::{VaultError, VaultResult};
use crate::models::{ActivityKind, CredentialRecord};

/// Outcome of an update-or-create
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    /// No record matched; a new one was created
    Created(CredentialRecord),
    /// The most recent matching record was updated
    Updated(CredentialRecord),
}

impl Upsert {
    pub fn record(&self) -> &CredentialRecord {
        match self {
            Upsert::Created(record) | Upsert::Updated(record) => record,
        }
    }

    pub fn into_record(self) -> CredentialRecord {
        match self {
            Upsert::Created(record) | Upsert::Updated(record) => record,
        }
    }

    /// Activity kind this outcome is logged as
    pub fn activity_kind(&self) -> ActivityKind {
        match self {
            Upsert::Created(_) => ActivityKind::Created,
            Upsert::Updated(_) => ActivityKind::Updated,
        }
    }
}

/// Credential records of one vault
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    records: Vec<CredentialRecord>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from stored records.
    ///
    /// Strength is recomputed from each password. A record whose id was
    /// already seen is dropped.
    pub fn from_records(records: Vec<CredentialRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(records.len());

        for mut record in records {
            if !seen.insert(record.id) {
                warn!(id = %record.id, "Dropping stored credential with duplicate id");
                continue;
            }
            record.rescore();
            kept.push(record);
        }

        Self { records: kept }
    }

    /// Create a new record. Fails if `password` is empty.
    pub fn add_password(
        &mut self,
        platform: &str,
        login: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> VaultResult<CredentialRecord> {
        validate_password(password)?;

        let mut record = CredentialRecord::new(
            platform.to_string(),
            login.to_string(),
            password.to_string(),
            now,
        );
        while self.contains(&record.id) {
            record.id = Uuid::new_v4();
        }

        self.records.push(record.clone());
        Ok(record)
    }

    /// Replace the password of the most recent record matching
    /// `(platform, login)`, or create one if none matches.
    ///
    /// Fails if `new_password` is empty, in which case nothing changes.
    pub fn update_password(
        &mut self,
        new_password: &str,
        platform: &str,
        login: &str,
        now: DateTime<Utc>,
    ) -> VaultResult<Upsert> {
        validate_password(new_password)?;

        match self.most_recent_match(platform, login) {
            Some(idx) => {
                let record = &mut self.records[idx];
                record.set_password(new_password.to_string(), now);
                Ok(Upsert::Updated(record.clone()))
            }
            None => self
                .add_password(platform, login, new_password, now)
                .map(Upsert::Created),
        }
    }

    /// Remove a record by id. Remaining records keep their order.
    pub fn remove(&mut self, id: &Uuid) -> VaultResult<CredentialRecord> {
        let idx = self
            .records
            .iter()
            .position(|r| &r.id == id)
            .ok_or(VaultError::RecordNotFound(*id))?;
        Ok(self.records.remove(idx))
    }

    pub fn get(&self, id: &Uuid) -> Option<&CredentialRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.get(id).is_some()
    }

    /// Records, most recently created or updated first
    pub fn list(&self) -> Vec<CredentialRecord> {
        let mut ordered: Vec<(usize, &CredentialRecord)> = self.records.iter().enumerate().collect();
        ordered.sort_by(|(ia, a), (ib, b)| b.timestamp.cmp(&a.timestamp).then(ib.cmp(ia)));
        ordered.into_iter().map(|(_, r)| r.clone()).collect()
    }

    /// Records in insertion order
    pub fn records(&self) -> &[CredentialRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index of the newest record for `(platform, login)`; later insertion wins ties
    fn most_recent_match(&self, platform: &str, login: &str) -> Option<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.matches(platform, login))
            .max_by_key(|(idx, r)| (r.timestamp, *idx))
            .map(|(idx, _)| idx)
    }
}

fn validate_password(password: &str) -> VaultResult<()> {
    if password.is_empty() {
        return Err(VaultError::Validation(
            "password must not be empty".to_string(),
        ));
    }
    Ok(())
}
