use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{info, warn};

use crate::optimizer::{ArrangementConfig, TrialOrdering};

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub optimizer: OptimizerConfig,
    pub catalog: CatalogConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            optimizer: OptimizerConfig::from_env(),
            catalog: CatalogConfig::from_env(),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;
    const HOST_VAR: &'static str = "PLACE_IT_NOW_API_HOST";
    const PORT_VAR: &'static str = "PLACE_IT_NOW_API_PORT";

    fn from_env() -> Self {
        let host_value =
            env_string(Self::HOST_VAR).unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, display_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                warn!(
                    "Could not parse {} ('{}'): {}. Using {}.",
                    Self::HOST_VAR,
                    host_value,
                    err,
                    Self::DEFAULT_HOST
                );
                (
                    IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    Self::DEFAULT_HOST.to_string(),
                )
            }
        };

        let port = match env_string(Self::PORT_VAR) {
            Some(raw) => match raw.parse::<u16>() {
                Ok(value) if value != 0 => value,
                Ok(_) => {
                    warn!(
                        "{} must not be 0. Using {}.",
                        Self::PORT_VAR,
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
                Err(err) => {
                    warn!(
                        "Could not parse {} ('{}'): {}. Using {}.",
                        Self::PORT_VAR,
                        raw,
                        err,
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
            },
            None => Self::DEFAULT_PORT,
        };

        Self {
            bind_ip,
            display_host,
            port,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }
}

/// Configuration for the arrangement search.
#[derive(Clone, Debug)]
pub struct OptimizerConfig {
    arrangement: ArrangementConfig,
}

impl OptimizerConfig {
    const GRID_STEP_VAR: &'static str = "PLACE_IT_NOW_GRID_STEP";
    const MAX_ITERATIONS_VAR: &'static str = "PLACE_IT_NOW_MAX_ITERATIONS";
    const SHUFFLE_VAR: &'static str = "PLACE_IT_NOW_SHUFFLE_TRIALS";
    const SEED_VAR: &'static str = "PLACE_IT_NOW_SHUFFLE_SEED";

    fn from_env() -> Self {
        let grid_step = load_with_warning(
            Self::GRID_STEP_VAR,
            ArrangementConfig::DEFAULT_GRID_STEP,
            |value: f64| value > 0.0 && value.is_finite(),
            "must be greater than 0",
        );
        if grid_step != ArrangementConfig::DEFAULT_GRID_STEP {
            info!(
                "Custom grid step {} m ({}); finer grids search more cells.",
                grid_step,
                Self::GRID_STEP_VAR
            );
        }

        let max_iterations = load_with_warning(
            Self::MAX_ITERATIONS_VAR,
            ArrangementConfig::DEFAULT_MAX_ITERATIONS,
            |value: usize| value >= 1,
            "must be at least 1",
        );

        let shuffle = env_string(Self::SHUFFLE_VAR)
            .and_then(|raw| parse_bool(&raw, Self::SHUFFLE_VAR))
            .unwrap_or(false);
        let trial_ordering = if shuffle {
            let seed = load_with_warning(Self::SEED_VAR, 0u64, |_| true, "");
            TrialOrdering::Shuffled { seed }
        } else {
            TrialOrdering::Deterministic
        };

        let arrangement = ArrangementConfig::builder()
            .grid_step(grid_step)
            .max_iterations(max_iterations)
            .trial_ordering(trial_ordering)
            .build();

        Self { arrangement }
    }

    /// Returns the configured ArrangementConfig.
    pub fn arrangement_config(&self) -> ArrangementConfig {
        self.arrangement
    }
}

impl From<ArrangementConfig> for OptimizerConfig {
    fn from(arrangement: ArrangementConfig) -> Self {
        Self { arrangement }
    }
}

/// Where the furniture catalog comes from.
#[derive(Clone, Debug, Default)]
pub struct CatalogConfig {
    path: Option<PathBuf>,
}

impl CatalogConfig {
    const PATH_VAR: &'static str = "PLACE_IT_NOW_CATALOG_PATH";

    fn from_env() -> Self {
        Self {
            path: env_string(Self::PATH_VAR).map(PathBuf::from),
        }
    }

    /// Path of a JSON catalog, if configured.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!("Access to {} failed: {}. Using default value.", name, err);
            None
        }
    }
}

fn parse_bool(raw: &str, var_name: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        other => {
            warn!(
                "Could not interpret {} ('{}') as boolean value. Using default value.",
                var_name, other
            );
            None
        }
    }
}

fn parse_with_default<T>(
    var_name: &str,
    raw: Option<String>,
    default: T,
    validator: impl Fn(T) -> bool,
    invalid_hint: &str,
) -> T
where
    T: FromStr + Copy + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    let Some(raw) = raw else {
        return default;
    };

    match raw.parse::<T>() {
        Ok(value) if validator(value) => value,
        Ok(_) => {
            warn!(
                "{} contains invalid value '{}': {}. Using {}.",
                var_name, raw, invalid_hint, default
            );
            default
        }
        Err(err) => {
            warn!(
                "Could not parse {} ('{}'): {}. Using {}.",
                var_name, raw, err, default
            );
            default
        }
    }
}

fn load_with_warning<T>(
    var_name: &str,
    default: T,
    validator: impl Fn(T) -> bool,
    invalid_hint: &str,
) -> T
where
    T: FromStr + Copy + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    parse_with_default(var_name, env_string(var_name), default, validator, invalid_hint)
}
