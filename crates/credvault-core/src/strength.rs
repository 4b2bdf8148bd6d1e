//! Live password strength feedback
//!
//! Scores are for UI feedback only and never gate a save. The score is a
//! sum of length points (capped) and a bonus per character class present,
//! so it never drops as the user keeps typing.

use serde::{Deserialize, Serialize};

/// Points per character, counted up to `LENGTH_CAP` characters
const POINTS_PER_CHAR: u32 = 4;

const LENGTH_CAP: u32 = 16;

/// Points for each of lowercase, uppercase, digit, symbol
const CLASS_BONUS: u32 = 9;

pub const MAX_SCORE: u8 = 100;

/// Qualitative band for a strength score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StrengthLabel {
    Weak,
    Fair,
    Good,
    Strong,
}

impl StrengthLabel {
    /// Band for a numeric score
    pub fn for_value(value: u8) -> Self {
        match value {
            0..=39 => StrengthLabel::Weak,
            40..=59 => StrengthLabel::Fair,
            60..=79 => StrengthLabel::Good,
            _ => StrengthLabel::Strong,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrengthLabel::Weak => "Weak",
            StrengthLabel::Fair => "Fair",
            StrengthLabel::Good => "Good",
            StrengthLabel::Strong => "Strong",
        }
    }

    /// Presentation tag for the strength meter
    pub fn color(&self) -> &'static str {
        match self {
            StrengthLabel::Weak => "red",
            StrengthLabel::Fair => "orange",
            StrengthLabel::Good => "yellow",
            StrengthLabel::Strong => "green",
        }
    }
}

impl std::fmt::Display for StrengthLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring a password
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthScore {
    /// 0..=100
    pub value: u8,
    pub label: StrengthLabel,
}

impl StrengthScore {
    /// Presentation tag for the strength meter
    pub fn color(&self) -> &'static str {
        self.label.color()
    }
}

/// Character classes present in a password
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharClasses {
    pub lowercase: bool,
    pub uppercase: bool,
    pub digit: bool,
    pub symbol: bool,
}

impl CharClasses {
    pub fn of(password: &str) -> Self {
        let mut classes = Self::default();
        for c in password.chars() {
            if c.is_lowercase() {
                classes.lowercase = true;
            } else if c.is_uppercase() {
                classes.uppercase = true;
            } else if c.is_ascii_digit() {
                classes.digit = true;
            } else if !c.is_alphanumeric() {
                classes.symbol = true;
            }
        }
        classes
    }

    pub fn count(&self) -> u32 {
        [self.lowercase, self.uppercase, self.digit, self.symbol]
            .iter()
            .filter(|present| **present)
            .count() as u32
    }
}

/// Score a password. Total and deterministic; `""` scores 0.
pub fn score(password: &str) -> StrengthScore {
    let length = password.chars().count().min(LENGTH_CAP as usize) as u32;
    let classes = CharClasses::of(password);

    let raw = length * POINTS_PER_CHAR + classes.count() * CLASS_BONUS;
    let value = raw.min(MAX_SCORE as u32) as u8;

    StrengthScore {
        value,
        label: StrengthLabel::for_value(value),
    }
}
