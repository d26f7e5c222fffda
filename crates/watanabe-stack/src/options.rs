//! Stack-wide options and their defaults.

use std::fmt;

use serde::{Deserialize, Serialize};
use watanabe_common::constants;
use watanabe_common::error::{InfraError, Result};
use watanabe_common::types::Ipv4Cidr;

/// Which database credential strategy a stack uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseMode {
    /// Password credentials when the record has a password, no database otherwise.
    #[default]
    Auto,
    /// Password credentials; the record must carry a password.
    Password,
    /// Credentials generated and stored by the provisioning collaborator.
    Generated,
    /// No database.
    Disabled,
}

impl fmt::Display for DatabaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Password => write!(f, "password"),
            Self::Generated => write!(f, "generated"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

/// Options shared by every stack of one environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StackOptions {
    /// Prefix of logical ids and resource names.
    pub prefix: String,
    /// Deployment region.
    pub region: String,
    /// Availability zones to spread subnets over.
    pub availability_zones: Vec<String>,
    /// Address range of the network.
    pub network_cidr: Ipv4Cidr,
    /// Prefix length of every subnet.
    pub subnet_mask: u8,
    /// Database credential strategy.
    pub database: DatabaseMode,
    /// Replicas the service keeps running.
    pub desired_count: u32,
}

impl Default for StackOptions {
    fn default() -> Self {
        Self {
            prefix: constants::DEFAULT_PREFIX.to_string(),
            region: constants::DEFAULT_REGION.to_string(),
            availability_zones: constants::DEFAULT_AVAILABILITY_ZONES
                .iter()
                .map(ToString::to_string)
                .collect(),
            network_cidr: Ipv4Cidr::DEFAULT_NETWORK,
            subnet_mask: constants::SUBNET_MASK,
            database: DatabaseMode::Auto,
            desired_count: constants::DESIRED_COUNT,
        }
    }
}

impl StackOptions {
    /// Builds a logical id or resource name from the prefix.
    #[must_use]
    pub fn id(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.prefix)
    }

    /// Checks the options before anything is declared.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no availability zone is given or
    /// the subnet mask cannot be carved out of the network range.
    pub fn validate(&self) -> Result<()> {
        if self.availability_zones.is_empty() {
            return Err(InfraError::Config {
                message: "at least one availability zone is required".into(),
            });
        }
        if self.prefix.is_empty() {
            return Err(InfraError::Config {
                message: "resource name prefix must not be empty".into(),
            });
        }
        let subnets = u32::try_from(self.availability_zones.len() * 2).map_err(|_| {
            InfraError::Config {
                message: "too many availability zones".into(),
            }
        })?;
        let _ = self.network_cidr.subnet(self.subnet_mask, subnets - 1)?;
        Ok(())
    }
}
