//! Append-only activity history for a vault
//!
//! Tracks credential creations, updates, removals, reads and logins. Events
//! carry the platform and login used, never the password. Day labels are
//! re-derived against the reader's "now" so a stored "Today" does not go
//! stale overnight. Labels use the host's local zone unless the log is
//! given a fixed UTC offset.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};

use crate::models::{ActivityEvent, ActivityKind, ActivityLanguage};

/// Activity history, oldest event first
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    events: Vec<ActivityEvent>,
    language: ActivityLanguage,
    /// 0 means unbounded
    capacity: usize,
    /// None means the host's local zone
    offset: Option<FixedOffset>,
}

impl ActivityLog {
    pub fn new(language: ActivityLanguage, capacity: usize) -> Self {
        Self {
            events: Vec::new(),
            language,
            capacity,
            offset: None,
        }
    }

    /// Derive labels in a fixed UTC offset instead of the host zone
    pub fn with_offset(mut self, offset: Option<FixedOffset>) -> Self {
        self.offset = offset;
        self
    }

    /// Rebuild a log from stored events (oldest first)
    pub fn from_events(events: Vec<ActivityEvent>, language: ActivityLanguage, capacity: usize) -> Self {
        let mut log = Self {
            events,
            language,
            capacity,
            offset: None,
        };
        log.enforce_capacity();
        log
    }

    /// Append an event stamped at `at`
    pub fn record(
        &mut self,
        kind: ActivityKind,
        platform: &str,
        login: &str,
        at: DateTime<Utc>,
    ) -> ActivityEvent {
        let event = ActivityEvent {
            time: time_label(at, self.offset),
            date: day_label(at, at, self.language, self.offset),
            name: platform.to_string(),
            email: login.to_string(),
            color: kind.color().to_string(),
            kind,
            occurred_at: at,
        };

        self.events.push(event.clone());
        self.enforce_capacity();
        event
    }

    /// Newest events first, labels relative to `now`, truncated to `limit` if given
    pub fn recent(&self, limit: Option<usize>, now: DateTime<Utc>) -> Vec<ActivityEvent> {
        let limit = limit.unwrap_or(self.events.len());
        self.events
            .iter()
            .rev()
            .take(limit)
            .map(|event| ActivityEvent {
                time: time_label(event.occurred_at, self.offset),
                date: day_label(event.occurred_at, now, self.language, self.offset),
                ..event.clone()
            })
            .collect()
    }

    /// Stored events, oldest first
    pub fn events(&self) -> &[ActivityEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn enforce_capacity(&mut self) {
        if self.capacity > 0 && self.events.len() > self.capacity {
            let excess = self.events.len() - self.capacity;
            self.events.drain(..excess);
        }
    }
}

/// `HH:MM` in `offset`, or local time
pub fn time_label(at: DateTime<Utc>, offset: Option<FixedOffset>) -> String {
    match offset {
        Some(offset) => at.with_timezone(&offset).format("%H:%M").to_string(),
        None => at.with_timezone(&Local).format("%H:%M").to_string(),
    }
}

/// "Today" / "Yesterday" by calendar day in `offset` (or local time),
/// otherwise a formatted date
pub fn day_label(
    at: DateTime<Utc>,
    now: DateTime<Utc>,
    language: ActivityLanguage,
    offset: Option<FixedOffset>,
) -> String {
    let at_day = calendar_day(at, offset);
    let today = calendar_day(now, offset);

    if at_day == today {
        language.today().to_string()
    } else if today.pred_opt() == Some(at_day) {
        language.yesterday().to_string()
    } else {
        at_day.format(language.date_format()).to_string()
    }
}

fn calendar_day(at: DateTime<Utc>, offset: Option<FixedOffset>) -> NaiveDate {
    match offset {
        Some(offset) => at.with_timezone(&offset).date_naive(),
        None => at.with_timezone(&Local).date_naive(),
    }
}
