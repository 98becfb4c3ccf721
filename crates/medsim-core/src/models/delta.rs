//! Declarative vital-sign deltas.
//!
//! A case file expresses each change either as a signed token (`"+8"`,
//! `"-2"`) or as a bare JSON number. Both forms are parsed once, when the
//! case is loaded, and both are applied as plain increments.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid delta {token:?}: expected \"+n\", \"-n\" or a number")]
pub struct DeltaParseError {
    pub token: String,
}

/// One field's increment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDelta", into = "RawDelta")]
pub enum Delta {
    /// Parsed from a `"+n"` / `"-n"` token.
    Signed(f64),
    /// A bare number, added as-is regardless of sign.
    Absolute(f64),
}

impl Delta {
    pub fn parse(token: &str) -> Result<Self, DeltaParseError> {
        let err = || DeltaParseError {
            token: token.to_string(),
        };

        let trimmed = token.trim();
        let (sign, magnitude) = match trimmed.split_at_checked(1) {
            Some(("+", rest)) => (1.0, rest),
            Some(("-", rest)) => (-1.0, rest),
            _ => return Err(err()),
        };

        let value: f64 = magnitude.trim().parse().map_err(|_| err())?;
        if !value.is_finite() || value < 0.0 || magnitude.trim().starts_with(['+', '-']) {
            return Err(err());
        }

        Ok(Delta::Signed(sign * value))
    }

    /// The signed amount to add to the current value.
    pub fn amount(&self) -> f64 {
        match *self {
            Delta::Signed(v) | Delta::Absolute(v) => v,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawDelta {
    Number(f64),
    Token(String),
}

impl TryFrom<RawDelta> for Delta {
    type Error = DeltaParseError;

    fn try_from(raw: RawDelta) -> Result<Self, Self::Error> {
        match raw {
            RawDelta::Number(v) if v.is_finite() => Ok(Delta::Absolute(v)),
            RawDelta::Number(v) => Err(DeltaParseError {
                token: v.to_string(),
            }),
            RawDelta::Token(token) => Delta::parse(&token),
        }
    }
}

impl From<Delta> for RawDelta {
    fn from(delta: Delta) -> Self {
        match delta {
            Delta::Signed(v) => RawDelta::Token(format!("{v:+}")),
            Delta::Absolute(v) => RawDelta::Number(v),
        }
    }
}

/// A mapping from vital field name to increment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeltaSpec(BTreeMap<String, Delta>);

impl DeltaSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, delta: Delta) -> Self {
        self.0.insert(field.into(), delta);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Delta)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Delta)> for DeltaSpec {
    fn from_iter<I: IntoIterator<Item = (String, Delta)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
