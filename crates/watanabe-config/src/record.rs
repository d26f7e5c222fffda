//! The resolved configuration record.

use std::collections::BTreeMap;
use std::fmt;

use watanabe_common::error::{InfraError, Result};

use crate::mode::{Field, Mode};

const REDACTED: &str = "********";

/// Immutable configuration a stack is built from.
///
/// Constructed only by the resolver, so every field the matched mode
/// requires is present and non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct ConfigurationRecord {
    mode: Mode,
    app_key: String,
    app_env: String,
    app_url: Option<String>,
    database_password: Option<String>,
    certificate_arn: Option<String>,
}

impl ConfigurationRecord {
    pub(crate) fn from_values(mode: Mode, mut values: BTreeMap<Field, String>) -> Result<Self> {
        let mut take_required = |field: Field| {
            values.remove(&field).ok_or(InfraError::MissingInput {
                mode: mode.name(),
                input: field.input_name(),
            })
        };
        let app_key = take_required(Field::AppKey)?;
        let app_env = take_required(Field::AppEnv)?;
        Ok(Self {
            mode,
            app_key,
            app_env,
            app_url: values.remove(&Field::AppUrl),
            database_password: values.remove(&Field::DbPassword),
            certificate_arn: values.remove(&Field::AcmCertificateArn),
        })
    }

    /// Mode the record was resolved for.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Application secret key.
    #[must_use]
    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    /// Deployment-environment tag.
    #[must_use]
    pub fn app_env(&self) -> &str {
        &self.app_env
    }

    /// Public base URL, when the mode carries one.
    #[must_use]
    pub fn app_url(&self) -> Option<&str> {
        self.app_url.as_deref()
    }

    /// Database master password, when the mode carries one.
    #[must_use]
    pub fn database_password(&self) -> Option<&str> {
        self.database_password.as_deref()
    }

    /// TLS certificate ARN, when the mode carries one.
    #[must_use]
    pub fn certificate_arn(&self) -> Option<&str> {
        self.certificate_arn.as_deref()
    }

    /// Returns the value of `field`, if present.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::AppKey => Some(self.app_key()),
            Field::AppEnv => Some(self.app_env()),
            Field::AppUrl => self.app_url(),
            Field::DbPassword => self.database_password(),
            Field::AcmCertificateArn => self.certificate_arn(),
        }
    }

    /// Present fields with their values, in record order.
    pub fn fields(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::ALL
            .into_iter()
            .filter_map(|field| self.get(field).map(|value| (field, value)))
    }

    /// Present fields with secret values masked, for display.
    pub fn redacted(&self) -> impl Iterator<Item = (Field, &str)> {
        self.fields().map(|(field, value)| {
            if field.is_secret() {
                (field, REDACTED)
            } else {
                (field, value)
            }
        })
    }
}

impl fmt::Debug for ConfigurationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("ConfigurationRecord");
        let _ = out.field("mode", &self.mode);
        for (field, value) in self.redacted() {
            let _ = out.field(field.input_name(), &value);
        }
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(Field, &str)]) -> BTreeMap<Field, String> {
        pairs.iter().map(|(f, v)| (*f, (*v).to_string())).collect()
    }

    #[test]
    fn record_exposes_present_fields() {
        let record = ConfigurationRecord::from_values(
            Mode::Production,
            values(&[
                (Field::AppKey, "K1"),
                (Field::AppEnv, "production"),
                (Field::DbPassword, "P1"),
            ]),
        )
        .expect("record");
        assert_eq!(record.app_key(), "K1");
        assert_eq!(record.database_password(), Some("P1"));
        assert_eq!(record.app_url(), None);
        assert_eq!(record.fields().count(), 3);
    }

    #[test]
    fn record_without_app_key_is_rejected() {
        let err = ConfigurationRecord::from_values(
            Mode::Dev,
            values(&[(Field::AppEnv, "dev")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("APP_KEY"), "got: {err}");
    }

    #[test]
    fn debug_output_hides_secrets() {
        let record = ConfigurationRecord::from_values(
            Mode::Production,
            values(&[
                (Field::AppKey, "super-secret-key"),
                (Field::AppEnv, "production"),
                (Field::DbPassword, "hunter2"),
            ]),
        )
        .expect("record");
        let debug = format!("{record:?}");
        assert!(!debug.contains("super-secret-key"), "got: {debug}");
        assert!(!debug.contains("hunter2"), "got: {debug}");
        assert!(debug.contains("production"));
    }
}
