//! Registry, database, secret, and parameter specs.

use watanabe_common::types::{Attribute, ResourceKind};

use crate::declaration::{Declare, RemovalPolicy};
use crate::graph::ResourceHandle;
use crate::property::{Properties, Property, Reference};
use crate::resources::reference_list;

/// A container image registry.
#[derive(Debug, Clone)]
pub struct RegistrySpec {
    /// Repository name.
    pub name: String,
    /// Removal policy override.
    pub removal: Option<RemovalPolicy>,
}

impl Declare for RegistrySpec {
    const KIND: ResourceKind = ResourceKind::Registry;

    fn removal_policy(&self) -> Option<RemovalPolicy> {
        self.removal
    }

    fn into_properties(self) -> Properties {
        Properties::new().set("RepositoryName", self.name)
    }
}

/// Image source bound to a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    repository: Reference,
    tag: String,
}

impl ImageSource {
    /// Pulls the `latest` tag from `registry`.
    #[must_use]
    pub fn from_registry(registry: &ResourceHandle) -> Self {
        Self::tagged(registry, "latest")
    }

    /// Pulls `tag` from `registry`.
    #[must_use]
    pub fn tagged(registry: &ResourceHandle, tag: impl Into<String>) -> Self {
        Self {
            repository: registry.attr(Attribute::RepositoryUri),
            tag: tag.into(),
        }
    }

    /// Registry reference of the source.
    #[must_use]
    pub const fn repository(&self) -> &Reference {
        &self.repository
    }

    pub(crate) fn into_property(self) -> Property {
        Property::join(
            "",
            [
                Property::Ref(self.repository),
                Property::from(format!(":{}", self.tag)),
            ],
        )
    }
}

/// How the database master credentials are provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseCredentials {
    /// Caller-supplied plaintext password.
    Password {
        /// Master username.
        username: String,
        /// Master password.
        password: String,
    },
    /// Password generated and stored by the provisioning collaborator.
    GeneratedSecret {
        /// Master username.
        username: String,
        /// Secret holding the generated password.
        secret: Reference,
    },
}

/// A managed PostgreSQL instance.
#[derive(Debug, Clone)]
pub struct DatabaseSpec {
    /// Name of the initial database.
    pub database_name: String,
    /// Engine major version.
    pub engine_version: String,
    /// Instance class.
    pub instance_class: String,
    /// Allocated storage in GiB.
    pub allocated_storage_gib: u32,
    /// Subnet group the instance is placed in.
    pub subnet_group: Reference,
    /// Security boundaries attached to the instance.
    pub boundaries: Vec<Reference>,
    /// Master credentials.
    pub credentials: DatabaseCredentials,
    /// Whether a standby is kept in a second zone.
    pub multi_az: bool,
    /// Whether the instance gets a public address.
    pub publicly_accessible: bool,
    /// Whether deletion protection is on.
    pub deletion_protection: bool,
    /// Removal policy override.
    pub removal: Option<RemovalPolicy>,
}

impl Declare for DatabaseSpec {
    const KIND: ResourceKind = ResourceKind::DatabaseInstance;

    fn removal_policy(&self) -> Option<RemovalPolicy> {
        self.removal
    }

    fn into_properties(self) -> Properties {
        let props = Properties::new()
            .set("Engine", "postgres")
            .set("EngineVersion", self.engine_version)
            .set("DBName", self.database_name)
            .set("DBInstanceClass", self.instance_class)
            .set("AllocatedStorage", self.allocated_storage_gib.to_string())
            .set("DBSubnetGroupName", self.subnet_group)
            .set("VPCSecurityGroups", reference_list(self.boundaries))
            .set("MultiAZ", self.multi_az)
            .set("PubliclyAccessible", self.publicly_accessible)
            .set("DeletionProtection", self.deletion_protection);
        match self.credentials {
            DatabaseCredentials::Password { username, password } => props
                .set("MasterUsername", username)
                .set("MasterUserPassword", password),
            DatabaseCredentials::GeneratedSecret { username, secret } => props
                .set("MasterUsername", username)
                .set(
                    "MasterUserPassword",
                    Property::join(
                        "",
                        [
                            Property::from("{{resolve:secretsmanager:"),
                            Property::Ref(secret),
                            Property::from(":SecretString:password}}"),
                        ],
                    ),
                ),
        }
    }
}

/// Subnets a database instance may be placed in.
#[derive(Debug, Clone)]
pub struct DatabaseSubnetGroupSpec {
    /// Description of the group.
    pub description: String,
    /// Member subnets.
    pub subnets: Vec<Reference>,
}

impl Declare for DatabaseSubnetGroupSpec {
    const KIND: ResourceKind = ResourceKind::DatabaseSubnetGroup;

    fn into_properties(self) -> Properties {
        Properties::new()
            .set("DBSubnetGroupDescription", self.description)
            .set("SubnetIds", reference_list(self.subnets))
    }
}

/// Characters kept out of generated database passwords.
pub const SECRET_EXCLUDED_CHARACTERS: &str = " %+~`#$&*()|[]{}:;<>?!'/@\"\\";

/// A provider-generated secret holding database credentials.
#[derive(Debug, Clone)]
pub struct SecretSpec {
    /// Description of the secret.
    pub description: String,
    /// Username stored next to the generated password.
    pub username: String,
    /// Length of the generated password.
    pub password_length: u32,
}

impl Declare for SecretSpec {
    const KIND: ResourceKind = ResourceKind::Secret;

    fn into_properties(self) -> Properties {
        Properties::new().set("Description", self.description).set(
            "GenerateSecretString",
            Properties::new()
                .set(
                    "SecretStringTemplate",
                    format!("{{\"username\":\"{}\"}}", self.username),
                )
                .set("GenerateStringKey", "password")
                .set("PasswordLength", self.password_length)
                .set("ExcludeCharacters", SECRET_EXCLUDED_CHARACTERS),
        )
    }
}

/// A plain string parameter store entry.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    /// Parameter path.
    pub name: String,
    /// Parameter value.
    pub value: String,
}

impl Declare for ParameterSpec {
    const KIND: ResourceKind = ResourceKind::Parameter;

    fn into_properties(self) -> Properties {
        Properties::new()
            .set("Name", self.name)
            .set("Type", "String")
            .set("Value", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_template_embeds_username() {
        let props = SecretSpec {
            description: "db".into(),
            username: "postgres".into(),
            password_length: 30,
        }
        .into_properties();
        let rendered = props.render();
        assert_eq!(
            rendered["GenerateSecretString"]["SecretStringTemplate"],
            "{\"username\":\"postgres\"}"
        );
    }

    #[test]
    fn parameter_is_a_plain_string() {
        let props = ParameterSpec {
            name: "/watanabe/app/key".into(),
            value: "WatanabeParameterValue".into(),
        }
        .into_properties();
        assert_eq!(props.get("Type").and_then(Property::as_str), Some("String"));
        assert_eq!(
            props.get("Value").and_then(Property::as_str),
            Some("WatanabeParameterValue")
        );
    }
}
