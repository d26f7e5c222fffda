//! Fixed literal values shared by the stacks and the CLI.

/// Prefix applied to every construct name.
pub const DEFAULT_PREFIX: &str = "Watanabe";

/// Default deployment region.
pub const DEFAULT_REGION: &str = "ap-northeast-1";

/// Default availability zones, one public and one isolated subnet each.
pub const DEFAULT_AVAILABILITY_ZONES: [&str; 2] = ["ap-northeast-1a", "ap-northeast-1c"];

/// Address range of the network.
pub const DEFAULT_NETWORK_CIDR: &str = "10.0.0.0/16";

/// Prefix length of every subnet.
pub const SUBNET_MASK: u8 = 24;

/// TLS port exposed by the load balancer.
pub const HTTPS_PORT: u16 = 443;

/// Port the web container listens on.
pub const APPLICATION_PORT: u16 = 80;

/// PostgreSQL port.
pub const DATABASE_PORT: u16 = 5432;

/// Master username of the managed database.
pub const DATABASE_USERNAME: &str = "postgres";

/// Name of the initial database.
pub const DATABASE_NAME: &str = "watanabe";

/// PostgreSQL major version of the managed database.
pub const DATABASE_ENGINE_VERSION: &str = "17";

/// Health check path requested by the target group.
pub const HEALTH_CHECK_PATH: &str = "/";

/// HTTP codes the health check accepts.
pub const HEALTHY_HTTP_CODES: &str = "200";

/// Seconds between health checks.
pub const HEALTH_CHECK_INTERVAL_SECS: u32 = 30;

/// Seconds before a health check times out.
pub const HEALTH_CHECK_TIMEOUT_SECS: u32 = 5;

/// CPU units reserved by the task definition.
pub const TASK_CPU: u32 = 512;

/// Memory reserved by the task definition, in MiB.
pub const TASK_MEMORY_MIB: u32 = 1024;

/// Replicas the compute service keeps running.
pub const DESIRED_COUNT: u32 = 1;

/// Registry holding the application runtime image.
pub const APP_REPOSITORY: &str = "watanabe-app";

/// Registry holding the web proxy image.
pub const WEB_REPOSITORY: &str = "watanabe-web";

/// Shared log sink for both containers.
pub const LOG_GROUP_NAME: &str = "watanabe-log-group";

/// Log retention of the shared sink, in days.
pub const LOG_RETENTION_DAYS: u32 = 1;

/// Parameter store path of the application key placeholder.
pub const APP_KEY_PARAMETER_NAME: &str = "/watanabe/app/key";

/// Literal value stored under [`APP_KEY_PARAMETER_NAME`].
pub const APP_KEY_PARAMETER_VALUE: &str = "WatanabeParameterValue";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "watanabe";
