//! Environment variables of the application container.
//!
//! Values come from the configuration record. When a database is declared,
//! its endpoint is wired in as `DB_HOST` and `DB_PORT` attribute references.
//! The record's `DB_PASSWORD` reaches the container only when the database
//! was declared with that password. Generated credentials are exposed as a
//! `DB_SECRET_ARN` reference instead.

use watanabe_common::types::Attribute;
use watanabe_config::{ConfigurationRecord, Field};
use watanabe_graph::{Property, ResourceHandle};

use crate::database::Database;

/// Builds the application container's environment.
///
/// Present record fields are passed through under their input names,
/// except the certificate ARN and a database password no declared
/// database uses.
#[must_use]
pub fn application_environment(
    record: &ConfigurationRecord,
    database: Option<&Database>,
) -> Vec<(String, Property)> {
    let password_in_use = database.is_some_and(|db| db.secret.is_none());
    let mut env: Vec<(String, Property)> = record
        .fields()
        .filter(|(field, _)| match field {
            Field::AcmCertificateArn => false,
            Field::DbPassword => password_in_use,
            _ => true,
        })
        .map(|(field, value)| (field.input_name().to_string(), Property::from(value)))
        .collect();
    if let Some(db) = database {
        env.extend(connection_env("db", &db.instance));
        if let Some(secret) = &db.secret {
            env.push(("DB_SECRET_ARN".to_string(), Property::Ref(secret.reference())));
        }
    }
    env
}

/// Generates `<NAME>_HOST` and `<NAME>_PORT` for a database connection.
#[must_use]
pub fn connection_env(name: &str, target: &ResourceHandle) -> [(String, Property); 2] {
    let upper = name.to_uppercase();
    [
        (
            format!("{upper}_HOST"),
            Property::Ref(target.attr(Attribute::EndpointAddress)),
        ),
        (
            format!("{upper}_PORT"),
            Property::Ref(target.attr(Attribute::EndpointPort)),
        ),
    ]
}
