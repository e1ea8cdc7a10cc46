use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;

use crate::catalog::BoxCatalog;
use crate::optimizer::PackingConfig;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub optimizer: OptimizerConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_lookup(env_string),
            optimizer: OptimizerConfig::from_lookup(env_string),
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
    const HOST_VAR: &'static str = "PARCEL_PACKER_API_HOST";
    const PORT_VAR: &'static str = "PARCEL_PACKER_API_PORT";

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host_value = lookup(Self::HOST_VAR).unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, effective_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                eprintln!(
                    "⚠️ Could not parse {} ('{}'): {}. Using {}.",
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

        let port = match lookup(Self::PORT_VAR) {
            Some(raw) => match raw.parse::<u16>() {
                Ok(value) if value != 0 => value,
                Ok(_) => {
                    eprintln!(
                        "⚠️ {} must not be 0. Using {}.",
                        Self::PORT_VAR,
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
                Err(err) => {
                    eprintln!(
                        "⚠️ Could not parse {} ('{}'): {}. Using {}.",
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
            display_host: effective_host,
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

    /// Checks whether the hostname matches the default value.
    pub fn uses_default_host(&self) -> bool {
        self.display_host == Self::DEFAULT_HOST
    }
}

/// Configuration for box selection: scoring parameters plus the box catalog.
#[derive(Clone, Debug)]
pub struct OptimizerConfig {
    packing: PackingConfig,
    catalog: Arc<BoxCatalog>,
}

impl OptimizerConfig {
    const PREFERRED_LENGTH_VAR: &'static str = "PARCEL_PACKER_PREFERRED_LENGTH_MM";
    const EXTREME_LENGTH_VAR: &'static str = "PARCEL_PACKER_EXTREME_LENGTH_MM";
    const LENGTH_EXPONENT_VAR: &'static str = "PARCEL_PACKER_LENGTH_PENALTY_EXPONENT";
    const EXTREME_EXPONENT_VAR: &'static str = "PARCEL_PACKER_EXTREME_PENALTY_EXPONENT";
    const FORCE_SINGLE_VAR: &'static str = "PARCEL_PACKER_FORCE_SINGLE_UNIFORM";
    const CATALOG_PATH_VAR: &'static str = "PARCEL_PACKER_CATALOG_PATH";
    const MAX_UNITS_VAR: &'static str = "PARCEL_PACKER_MAX_UNITS";

    /// Wraps already built values.
    pub fn new(packing: PackingConfig, catalog: BoxCatalog) -> Self {
        Self {
            packing,
            catalog: Arc::new(catalog),
        }
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut preferred_length = load_f64_with_warning(
            &lookup,
            Self::PREFERRED_LENGTH_VAR,
            PackingConfig::DEFAULT_PREFERRED_LENGTH_MM,
            |value| value > 0.0,
            "must be greater than 0",
            "Warning: Adjusted preferred box length changes which boxes are penalised",
        );

        let mut extreme_length = load_f64_with_warning(
            &lookup,
            Self::EXTREME_LENGTH_VAR,
            PackingConfig::DEFAULT_EXTREME_LENGTH_MM,
            |value| value > 0.0,
            "must be greater than 0",
            "Warning: Adjusted extreme box length may allow very long boxes",
        );

        if extreme_length <= preferred_length {
            eprintln!(
                "⚠️ {} ({}) must exceed {} ({}). Using defaults {} and {}.",
                Self::EXTREME_LENGTH_VAR,
                extreme_length,
                Self::PREFERRED_LENGTH_VAR,
                preferred_length,
                PackingConfig::DEFAULT_EXTREME_LENGTH_MM,
                PackingConfig::DEFAULT_PREFERRED_LENGTH_MM
            );
            preferred_length = PackingConfig::DEFAULT_PREFERRED_LENGTH_MM;
            extreme_length = PackingConfig::DEFAULT_EXTREME_LENGTH_MM;
        }

        let length_exponent = load_f64_with_warning(
            &lookup,
            Self::LENGTH_EXPONENT_VAR,
            PackingConfig::DEFAULT_LENGTH_PENALTY_EXPONENT,
            |value| value > 0.0,
            "must be greater than 0",
            "Warning: Adjusted length penalty changes box preference",
        );

        let extreme_exponent = load_f64_with_warning(
            &lookup,
            Self::EXTREME_EXPONENT_VAR,
            PackingConfig::DEFAULT_EXTREME_PENALTY_EXPONENT,
            |value| value > 0.0,
            "must be greater than 0",
            "Warning: Adjusted extreme penalty may select unnecessarily long boxes",
        );

        let force_single = lookup(Self::FORCE_SINGLE_VAR)
            .and_then(|raw| parse_bool(&raw, Self::FORCE_SINGLE_VAR))
            .unwrap_or(PackingConfig::DEFAULT_FORCE_SINGLE_FOR_UNIFORM_STOCK);

        let max_units = load_f64_with_warning(
            &lookup,
            Self::MAX_UNITS_VAR,
            f64::from(PackingConfig::DEFAULT_MAX_UNITS),
            |value| value >= 1.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX),
            "must be a whole number between 1 and 4294967295",
            "Warning: Adjusted unit limit changes how large an order may be",
        ) as u32;

        let packing = PackingConfig::builder()
            .preferred_length_mm(preferred_length)
            .extreme_length_mm(extreme_length)
            .length_penalty_exponent(length_exponent)
            .extreme_penalty_exponent(extreme_exponent)
            .force_single_for_uniform_stock(force_single)
            .max_units(max_units)
            .build();

        let catalog = load_catalog(lookup(Self::CATALOG_PATH_VAR).as_deref());

        Self::new(packing, catalog)
    }

    /// Returns the configured PackingConfig.
    pub fn packing_config(&self) -> PackingConfig {
        self.packing
    }

    /// Shared, read-only box catalog.
    pub fn catalog(&self) -> Arc<BoxCatalog> {
        Arc::clone(&self.catalog)
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::new(PackingConfig::default(), BoxCatalog::standard())
    }
}

/// Loads the catalog file if one is configured, else the standard catalog.
fn load_catalog(path: Option<&str>) -> BoxCatalog {
    let Some(path) = path else {
        return BoxCatalog::standard();
    };

    match BoxCatalog::load(Path::new(path)) {
        Ok(catalog) if catalog.is_empty() => {
            eprintln!(
                "⚠️ Box catalog '{}' contains no boxes. Using the standard catalog.",
                path
            );
            BoxCatalog::standard()
        }
        Ok(catalog) => {
            println!("📦 Loaded {} boxes from '{}'", catalog.len(), path);
            catalog
        }
        Err(err) => {
            eprintln!(
                "⚠️ Box catalog '{}' unusable: {}. Using the standard catalog.",
                path, err
            );
            BoxCatalog::standard()
        }
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
            eprintln!(
                "⚠️ Access to {} failed: {}. Using default value.",
                name, err
            );
            None
        }
    }
}

fn parse_bool(raw: &str, var_name: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        other => {
            eprintln!(
                "⚠️ Could not interpret {} ('{}') as boolean value. Using default value.",
                var_name, other
            );
            None
        }
    }
}

fn load_f64_with_warning(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    warning: &str,
) -> f64 {
    match lookup(var_name) {
        Some(raw) => match raw.parse::<f64>() {
            Ok(value) if value.is_finite() && validator(value) => {
                let tolerance = (default.abs().max(1.0)) * 1e-9;
                if (value - default).abs() > tolerance {
                    println!("⚠️ {} ({} = {}).", warning, var_name, value);
                }
                value
            }
            Ok(_) => {
                eprintln!(
                    "⚠️ {} contains invalid value '{}': {}. Using {}.",
                    var_name, raw, invalid_hint, default
                );
                default
            }
            Err(err) => {
                eprintln!(
                    "⚠️ Could not parse {} ('{}') as number: {}. Using {}.",
                    var_name, raw, err, default
                );
                default
            }
        },
        None => default,
    }
}
