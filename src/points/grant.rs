use std::fmt;

use serde::Serialize;
use validator::{Validate, ValidationErrors};

use crate::dao::models::clamped_add;

use super::validation::validate_grant_name;

/// Named, reusable score delta such as "Victory" or "Destroyed core".
///
/// Grants are immutable once built. The `silent` flag tells the caller that
/// the player must not be notified when this grant is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PointGrant {
    name: String,
    description: String,
    delta: i64,
    silent: bool,
}

impl PointGrant {
    /// Build a grant, rejecting blank or malformed names.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        delta: i64,
        silent: bool,
    ) -> Result<Self, ValidationErrors> {
        let grant = Self {
            name: name.into(),
            description: description.into(),
            delta,
            silent,
        };
        grant.validate()?;
        Ok(grant)
    }

    /// Grant without description that notifies the player.
    pub fn of(name: impl Into<String>, delta: i64) -> Result<Self, ValidationErrors> {
        Self::new(name, String::new(), delta, false)
    }

    /// Grant without description that never notifies the player.
    pub fn silent(name: impl Into<String>, delta: i64) -> Result<Self, ValidationErrors> {
        Self::new(name, String::new(), delta, true)
    }

    /// Built-in grants with literal names that are known to be valid.
    pub(crate) fn preset(name: &str, description: &str, delta: i64, silent: bool) -> Self {
        let grant = Self {
            name: name.to_owned(),
            description: description.to_owned(),
            delta,
            silent,
        };
        debug_assert!(grant.validate().is_ok(), "invalid preset grant `{name}`");
        grant
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free text description, possibly empty.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Signed amount of points carried by the grant.
    pub fn delta(&self) -> i64 {
        self.delta
    }

    /// Whether the caller must skip player notification.
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    /// Score after applying this grant to `score`, never below zero.
    pub fn apply(&self, score: i64) -> i64 {
        clamped_add(score, self.delta)
    }
}

impl Validate for PointGrant {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_grant_name(&self.name) {
            errors.add("name", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl fmt::Display for PointGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:+})", self.name, self.delta)
    }
}
