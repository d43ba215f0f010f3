//! Environment-based runtime settings.
//!
//! All values are read once at startup; a missing or malformed variable
//! fails startup loudly instead of falling back to a default. Tests build
//! settings through [`Settings::from_lookup`] to avoid mutating process
//! environment variables.

use thiserror::Error;

/// Bind host for the MLLP listener.
pub const MLLP_HOST_VAR: &str = "HL7_BRIDGE_MLLP_HOST";
/// Bind port for the MLLP listener.
pub const MLLP_PORT_VAR: &str = "HL7_BRIDGE_MLLP_PORT";
/// NATS server URL.
pub const NATS_URL_VAR: &str = "HL7_BRIDGE_NATS_URL";
/// Timezone tag attached to the configured tenant.
pub const TIMEZONE_VAR: &str = "HL7_BRIDGE_TIMEZONE";
/// Tenant identifier; determines the bus subject.
pub const TENANT_VAR: &str = "HL7_BRIDGE_TENANT";

/// Errors raised while loading settings.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable was absent or empty.
    #[error("missing required environment variable {var}")]
    Missing {
        /// Name of the absent variable.
        var: &'static str,
    },

    /// A variable was present but could not be interpreted.
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        /// Name of the offending variable.
        var: &'static str,
        /// The rejected value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Runtime settings consumed at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Host the MLLP listener binds to.
    pub mllp_host: String,
    /// Port the MLLP listener binds to.
    pub mllp_port: u16,
    /// Address of the NATS server.
    pub bus_url: String,
    /// Timezone tag for the configured tenant.
    pub timezone: String,
    /// Tenant identifier.
    pub tenant: String,
}

impl Settings {
    /// Load settings from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any required variable is absent, empty,
    /// or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same contract as [`from_env`][Self::from_env].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |var: &'static str| {
            lookup(var)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing { var })
        };

        let port_text = require(MLLP_PORT_VAR)?;
        let mllp_port = port_text
            .parse::<u16>()
            .map_err(|e| ConfigError::Invalid {
                var: MLLP_PORT_VAR,
                value: port_text.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            mllp_host: require(MLLP_HOST_VAR)?,
            mllp_port,
            bus_url: require(NATS_URL_VAR)?,
            timezone: require(TIMEZONE_VAR)?,
            tenant: require(TENANT_VAR)?,
        })
    }

    /// Listener bind target as a `host:port` string.
    #[must_use]
    pub fn bind_addr(&self) -> String { format!("{}:{}", self.mllp_host, self.mllp_port) }

    /// Bus subject inbound messages are forwarded on, derived from the
    /// configured tenant.
    #[must_use]
    pub fn subject(&self) -> String { format!("hl7.{}.inbound", self.tenant) }
}
