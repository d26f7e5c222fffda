//! Recognized deployment modes.
//!
//! Each row of [`MODES`] names the selector input that activates the mode
//! and the fields the mode requires. Adding a mode means adding a row.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One field of a configuration record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    /// Application secret key.
    AppKey,
    /// Deployment-environment tag.
    AppEnv,
    /// Public base URL of the application.
    AppUrl,
    /// Database master password.
    DbPassword,
    /// TLS certificate ARN for the HTTPS listener.
    AcmCertificateArn,
}

impl Field {
    /// Every field, in record order.
    pub const ALL: [Self; 5] = [
        Self::AppKey,
        Self::AppEnv,
        Self::AppUrl,
        Self::DbPassword,
        Self::AcmCertificateArn,
    ];

    /// Name of the environment input this field is read from.
    #[must_use]
    pub const fn input_name(self) -> &'static str {
        match self {
            Self::AppKey => "APP_KEY",
            Self::AppEnv => "APP_ENV",
            Self::AppUrl => "APP_URL",
            Self::DbPassword => "DB_PASSWORD",
            Self::AcmCertificateArn => "ACM_CERTIFICATE_ARN",
        }
    }

    /// Whether the value must be kept out of logs and plain output.
    #[must_use]
    pub const fn is_secret(self) -> bool {
        matches!(self, Self::AppKey | Self::DbPassword)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.input_name())
    }
}

/// A recognized deployment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Development environment without a database.
    Dev,
    /// Production environment with a password-backed database.
    Production,
}

impl Mode {
    /// Canonical selector value of this mode.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One row of the mode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSpec {
    /// Mode this row resolves to.
    pub mode: Mode,
    /// Input that selects the mode.
    pub selector_key: &'static str,
    /// Value of [`selector_key`](Self::selector_key) that selects the mode.
    pub selector_value: &'static str,
    /// Fields that must be present and non-empty.
    pub required: &'static [Field],
}

impl ModeSpec {
    /// Returns whether `field` is required by this mode.
    #[must_use]
    pub fn requires(&self, field: Field) -> bool {
        self.required.contains(&field)
    }
}

/// Modes recognized by default, tried in order.
pub const MODES: &[ModeSpec] = &[
    ModeSpec {
        mode: Mode::Dev,
        selector_key: "NODE_ENV",
        selector_value: "dev",
        required: &[
            Field::AppKey,
            Field::AppEnv,
            Field::AppUrl,
            Field::AcmCertificateArn,
        ],
    },
    ModeSpec {
        mode: Mode::Production,
        selector_key: "DEPLOY_ENV",
        selector_value: "production",
        required: &[
            Field::AppKey,
            Field::AppEnv,
            Field::DbPassword,
            Field::AcmCertificateArn,
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mode_requires_key_and_env() {
        for spec in MODES {
            assert!(spec.requires(Field::AppKey), "{}", spec.mode);
            assert!(spec.requires(Field::AppEnv), "{}", spec.mode);
        }
    }

    #[test]
    fn input_names_are_distinct() {
        let mut names: Vec<&str> = Field::ALL.iter().map(|f| f.input_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Field::ALL.len());
    }

    #[test]
    fn selector_keys_are_not_record_inputs() {
        for spec in MODES {
            assert!(
                Field::ALL.iter().all(|f| f.input_name() != spec.selector_key),
                "{} selector collides with a field",
                spec.mode
            );
        }
    }
}
