//! The optional managed database and its credential strategy.

use watanabe_common::constants::{
    DATABASE_ENGINE_VERSION, DATABASE_NAME, DATABASE_USERNAME,
};
use watanabe_common::error::{InfraError, Result};
use watanabe_config::{ConfigurationRecord, Field};
use watanabe_graph::resources::storage::{
    DatabaseCredentials, DatabaseSpec, DatabaseSubnetGroupSpec, SecretSpec,
};
use watanabe_graph::{RemovalPolicy, ResourceGraph, ResourceHandle};

use crate::network::Network;
use crate::options::{DatabaseMode, StackOptions};

/// Credentials a database will be declared with.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialPlan {
    /// Password taken from the configuration record.
    Password(String),
    /// Password generated by the provisioning collaborator.
    Generated,
}

impl std::fmt::Debug for CredentialPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Password(_) => write!(f, "Password(********)"),
            Self::Generated => write!(f, "Generated"),
        }
    }
}

/// Handles of a declared database.
#[derive(Debug, Clone)]
pub struct Database {
    /// The database instance.
    pub instance: ResourceHandle,
    /// Secret holding generated credentials, if the password is not taken
    /// from the record.
    pub secret: Option<ResourceHandle>,
}

/// Decides whether a database is declared and with which credentials.
///
/// # Errors
///
/// Returns [`InfraError::MissingInput`] if `mode` is
/// [`DatabaseMode::Password`] and the record carries no password.
pub fn plan_database(
    record: &ConfigurationRecord,
    mode: DatabaseMode,
) -> Result<Option<CredentialPlan>> {
    let password = record.database_password().map(ToString::to_string);
    match mode {
        DatabaseMode::Auto => Ok(password.map(CredentialPlan::Password)),
        DatabaseMode::Password => password
            .map(|p| Some(CredentialPlan::Password(p)))
            .ok_or(InfraError::MissingInput {
                mode: record.mode().name(),
                input: Field::DbPassword.input_name(),
            }),
        DatabaseMode::Generated => Ok(Some(CredentialPlan::Generated)),
        DatabaseMode::Disabled => Ok(None),
    }
}

/// Declares the database inside the isolated subnets.
///
/// The subnet group comes first, then the secret when credentials are
/// generated, then the instance.
///
/// # Errors
///
/// Returns an error if a declaration fails.
pub fn declare_database(
    graph: &mut ResourceGraph,
    options: &StackOptions,
    network: &Network,
    boundary: &ResourceHandle,
    plan: CredentialPlan,
) -> Result<Database> {
    let subnet_group = graph.declare(
        options.id("DbSubnetGroup"),
        DatabaseSubnetGroupSpec {
            description: format!("Isolated subnets of {}", options.id("Db")),
            subnets: network.isolated_refs(),
        },
    )?;
    let mut secret_handle = None;
    let credentials = match plan {
        CredentialPlan::Password(password) => DatabaseCredentials::Password {
            username: DATABASE_USERNAME.to_string(),
            password,
        },
        CredentialPlan::Generated => {
            let secret = graph.declare(
                options.id("DbSecret"),
                SecretSpec {
                    description: format!("Master credentials of {}", options.id("Db")),
                    username: DATABASE_USERNAME.to_string(),
                    password_length: 30,
                },
            )?;
            let reference = secret.reference();
            secret_handle = Some(secret);
            DatabaseCredentials::GeneratedSecret {
                username: DATABASE_USERNAME.to_string(),
                secret: reference,
            }
        }
    };

    let instance = graph.declare(
        options.id("Db"),
        DatabaseSpec {
            database_name: DATABASE_NAME.to_string(),
            engine_version: DATABASE_ENGINE_VERSION.to_string(),
            instance_class: "db.t3.micro".to_string(),
            allocated_storage_gib: 100,
            subnet_group: subnet_group.reference(),
            boundaries: vec![boundary.reference()],
            credentials,
            multi_az: false,
            publicly_accessible: false,
            deletion_protection: false,
            removal: Some(RemovalPolicy::Delete),
        },
    )?;
    Ok(Database {
        instance,
        secret: secret_handle,
    })
}
