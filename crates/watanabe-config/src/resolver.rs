//! Mode selection and all-or-nothing resolution.

use std::collections::BTreeMap;

use watanabe_common::error::{InfraError, Result};

use crate::mode::{ModeSpec, MODES};
use crate::record::ConfigurationRecord;
use crate::source::ConfigSource;

/// Resolves configuration records against a table of modes.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    modes: &'a [ModeSpec],
}

impl<'a> Resolver<'a> {
    /// Creates a resolver over a custom mode table.
    #[must_use]
    pub const fn new(modes: &'a [ModeSpec]) -> Self {
        Self { modes }
    }

    /// Returns the mode table.
    #[must_use]
    pub const fn modes(&self) -> &'a [ModeSpec] {
        self.modes
    }

    /// Selects a mode from the selector inputs in `source` and resolves it.
    ///
    /// Rows are tried in table order; the first row whose selector input
    /// equals its selector value wins.
    ///
    /// # Errors
    ///
    /// Returns [`InfraError::UnknownMode`] if no row is selected, or
    /// [`InfraError::MissingInput`] if a required input is absent or empty.
    pub fn resolve<S: ConfigSource + ?Sized>(&self, source: &S) -> Result<ConfigurationRecord> {
        let selected = self
            .modes
            .iter()
            .find(|spec| source.get(spec.selector_key).as_deref() == Some(spec.selector_value));

        match selected {
            Some(spec) => self.resolve_spec(spec, source),
            None => Err(InfraError::UnknownMode {
                selector: self.describe_selectors(source),
            }),
        }
    }

    /// Resolves the mode whose selector value equals `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`InfraError::UnknownMode`] if `selector` names no mode, or
    /// [`InfraError::MissingInput`] if a required input is absent or empty.
    pub fn resolve_mode<S: ConfigSource + ?Sized>(
        &self,
        source: &S,
        selector: &str,
    ) -> Result<ConfigurationRecord> {
        let spec = self
            .modes
            .iter()
            .find(|spec| spec.selector_value == selector)
            .ok_or_else(|| InfraError::UnknownMode {
                selector: format!("\"{selector}\""),
            })?;
        self.resolve_spec(spec, source)
    }

    #[allow(clippy::unused_self)]
    fn resolve_spec<S: ConfigSource + ?Sized>(
        &self,
        spec: &ModeSpec,
        source: &S,
    ) -> Result<ConfigurationRecord> {
        tracing::info!(mode = %spec.mode, "resolving configuration");
        let mut values = BTreeMap::new();
        for &field in spec.required {
            match source.get(field.input_name()) {
                Some(value) if !value.is_empty() => {
                    let _ = values.insert(field, value);
                }
                _ => {
                    tracing::debug!(mode = %spec.mode, input = field.input_name(), "required input missing");
                    return Err(InfraError::MissingInput {
                        mode: spec.mode.name(),
                        input: field.input_name(),
                    });
                }
            }
        }
        ConfigurationRecord::from_values(spec.mode, values)
    }

    fn describe_selectors<S: ConfigSource + ?Sized>(&self, source: &S) -> String {
        let mut keys: Vec<&str> = self.modes.iter().map(|spec| spec.selector_key).collect();
        keys.dedup();
        keys.iter()
            .map(|key| match source.get(key) {
                Some(value) => format!("{key}=\"{value}\""),
                None => format!("{key}=<unset>"),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for Resolver<'static> {
    fn default() -> Self {
        Self::new(MODES)
    }
}

/// Resolves `source` against the default mode table.
///
/// # Errors
///
/// Returns a configuration error as described in [`Resolver::resolve`].
pub fn resolve<S: ConfigSource + ?Sized>(source: &S) -> Result<ConfigurationRecord> {
    Resolver::default().resolve(source)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::mode::{Field, Mode};
    use crate::source::MapSource;

    fn production_inputs() -> MapSource {
        MapSource::new()
            .with("DEPLOY_ENV", "production")
            .with("APP_KEY", "K1")
            .with("APP_ENV", "production")
            .with("DB_PASSWORD", "P1")
            .with("ACM_CERTIFICATE_ARN", "arn:aws:acm:...:cert/abc")
    }

    fn dev_inputs() -> MapSource {
        MapSource::new()
            .with("NODE_ENV", "dev")
            .with("APP_KEY", "dev-key")
            .with("APP_ENV", "dev")
            .with("APP_URL", "https://dev.example.com")
            .with("ACM_CERTIFICATE_ARN", "arn:aws:acm:ap-northeast-1:123:certificate/dev")
    }

    #[test]
    fn production_scenario_resolves_verbatim() {
        let record = resolve(&production_inputs()).expect("resolve");
        assert_eq!(record.mode(), Mode::Production);
        assert_eq!(record.app_key(), "K1");
        assert_eq!(record.app_env(), "production");
        assert_eq!(record.database_password(), Some("P1"));
        assert_eq!(record.certificate_arn(), Some("arn:aws:acm:...:cert/abc"));
        assert_eq!(record.app_url(), None);
    }

    #[test]
    fn dev_mode_resolves_from_node_env() {
        let record = resolve(&dev_inputs()).expect("resolve");
        assert_eq!(record.mode(), Mode::Dev);
        assert_eq!(record.app_url(), Some("https://dev.example.com"));
        assert_eq!(record.database_password(), None);
    }

    #[test]
    fn dev_mode_without_app_key_fails() {
        let err = resolve(&dev_inputs().without("APP_KEY")).unwrap_err();
        assert!(err.is_configuration());
        assert!(matches!(
            err,
            InfraError::MissingInput {
                mode: "dev",
                input: "APP_KEY"
            }
        ));
    }

    #[test]
    fn empty_input_counts_as_missing() {
        let err = resolve(&production_inputs().with("DB_PASSWORD", "")).unwrap_err();
        assert!(matches!(
            err,
            InfraError::MissingInput {
                input: "DB_PASSWORD",
                ..
            }
        ));
    }

    #[test]
    fn every_required_input_is_enforced() {
        for spec in MODES {
            let complete: MapSource = std::iter::once((spec.selector_key, spec.selector_value))
                .chain(spec.required.iter().map(|f| (f.input_name(), "value")))
                .collect();
            assert!(resolve(&complete).is_ok(), "{} should resolve", spec.mode);

            for field in spec.required {
                let partial = complete.clone().without(field.input_name());
                let err = resolve(&partial).unwrap_err();
                assert!(
                    matches!(err, InfraError::MissingInput { input, .. } if input == field.input_name()),
                    "{}: got {err}",
                    spec.mode
                );
            }
        }
    }

    #[test]
    fn unknown_selector_fails_even_with_all_inputs() {
        let source = production_inputs().with("DEPLOY_ENV", "staging");
        let err = resolve(&source).unwrap_err();
        assert!(matches!(err, InfraError::UnknownMode { .. }));
        let msg = err.to_string();
        assert!(msg.contains("DEPLOY_ENV=\"staging\""), "got: {msg}");
        assert!(msg.contains("NODE_ENV=<unset>"), "got: {msg}");
    }

    #[test]
    fn no_selector_fails() {
        let source = production_inputs().without("DEPLOY_ENV");
        assert!(matches!(
            resolve(&source).unwrap_err(),
            InfraError::UnknownMode { .. }
        ));
    }

    #[test]
    fn explicit_selector_overrides_inputs() {
        let source = production_inputs().without("DEPLOY_ENV");
        let record = Resolver::default()
            .resolve_mode(&source, "production")
            .expect("resolve");
        assert_eq!(record.mode(), Mode::Production);

        let err = Resolver::default()
            .resolve_mode(&source, "qa")
            .unwrap_err();
        assert!(matches!(err, InfraError::UnknownMode { .. }));
    }

    #[test]
    fn custom_mode_table_is_honored() {
        const ONLY_STAGING: &[ModeSpec] = &[ModeSpec {
            mode: Mode::Dev,
            selector_key: "STAGE",
            selector_value: "staging",
            required: &[Field::AppKey, Field::AppEnv],
        }];
        let source = MapSource::new()
            .with("STAGE", "staging")
            .with("APP_KEY", "k")
            .with("APP_ENV", "staging");
        let record = Resolver::new(ONLY_STAGING).resolve(&source).expect("resolve");
        assert_eq!(record.app_env(), "staging");
        assert!(resolve(&source).is_err());
    }

    proptest! {
        #[test]
        fn resolved_values_equal_inputs(
            key in "\\PC{1,24}",
            env in "\\PC{1,24}",
            password in "\\PC{1,24}",
            cert in "\\PC{1,48}",
        ) {
            let source = MapSource::new()
                .with("DEPLOY_ENV", "production")
                .with("APP_KEY", key.clone())
                .with("APP_ENV", env.clone())
                .with("DB_PASSWORD", password.clone())
                .with("ACM_CERTIFICATE_ARN", cert.clone());
            let record = resolve(&source).expect("resolve");
            prop_assert_eq!(record.app_key(), key.as_str());
            prop_assert_eq!(record.app_env(), env.as_str());
            prop_assert_eq!(record.database_password(), Some(password.as_str()));
            prop_assert_eq!(record.certificate_arn(), Some(cert.as_str()));
        }
    }
}
