//! Field rules for checking drafts before they leave the client.
//!
//! A failed rule is reported through the same error slot as a failed
//! request, so an invalid draft never costs a round trip.

use crate::{error::Result, Error};
use once_cell::sync::Lazy;
use regex::Regex;

/// One `@`, a non-empty local part and a dotted domain with no empty labels.
static RE_EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").unwrap());

/// The shape a field value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text
    Text,
    /// `local@domain.tld`
    Email,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Text => write!(f, "text"),
            FieldKind::Email => write!(f, "email address"),
        }
    }
}

/// Rule for one string field of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// Field name as it appears on the wire
    pub name: &'static str,
    /// Expected shape
    pub kind: FieldKind,
    /// Whether the field must be present and non-blank
    pub required: bool,
    /// Minimum length in characters after trimming
    pub min_len: usize,
}

impl FieldRule {
    /// Create a rule for a required field.
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            min_len: 0,
        }
    }

    /// Create a rule for an optional field.
    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            min_len: 0,
        }
    }

    /// Require at least `min_len` characters.
    pub const fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }

    /// Validate a field value against this rule.
    pub fn validate(&self, value: Option<&str>) -> Result<()> {
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        match value {
            None if self.required => Err(Error::MissingRequiredField(self.name.to_string())),
            None => Ok(()),
            Some(v) => self.validate_value(v),
        }
    }

    fn validate_value(&self, value: &str) -> Result<()> {
        if value.chars().count() < self.min_len {
            return Err(Error::FieldTooShort {
                field: self.name.to_string(),
                min: self.min_len,
            });
        }

        let valid = match self.kind {
            FieldKind::Text => true,
            FieldKind::Email => is_email(value),
        };

        if valid {
            Ok(())
        } else {
            Err(Error::InvalidFormat {
                field: self.name.to_string(),
                expected: self.kind.to_string(),
            })
        }
    }
}

fn is_email(value: &str) -> bool {
    RE_EMAIL.is_match(value)
}
