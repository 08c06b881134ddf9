//! Warehouse credential-string parsing
//!
//! Connections are configured through a process environment variable whose
//! value is a space-separated `key=value` string:
//!
//! ```text
//! host=... database=... user=... password=... port=...
//! ```

use std::str::FromStr;

use crate::error::{FlowError, Result};

/// Keys a warehouse credential string must carry
const REQUIRED_KEYS: [&str; 5] = ["host", "database", "user", "password", "port"];

/// Parsed warehouse connection credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedshiftCreds {
    pub host: String,
    pub database: String,
    pub user: String,
    pub password: String,
    pub port: u16,
}

impl FromStr for RedshiftCreds {
    type Err = FlowError;

    /// Parse a space-separated credential string. Exactly the five required
    /// keys must be present; `port` must parse as an integer.
    fn from_str(creds_str: &str) -> Result<Self> {
        let mut host = None;
        let mut database = None;
        let mut user = None;
        let mut password = None;
        let mut port = None;

        for param in creds_str.split(' ').filter(|p| !p.is_empty()) {
            let (key, value) = param.split_once('=').ok_or_else(|| {
                FlowError::Config(format!(
                    "Malformed credential entry '{param}': expected key=value"
                ))
            })?;
            match key {
                "host" => host = Some(value.to_string()),
                "database" => database = Some(value.to_string()),
                "user" => user = Some(value.to_string()),
                "password" => password = Some(value.to_string()),
                "port" => {
                    port = Some(value.parse::<u16>().map_err(|_| {
                        FlowError::Config(format!("Credential port '{value}' is not an integer"))
                    })?)
                }
                other => {
                    return Err(FlowError::Config(format!(
                        "Unexpected credential key '{other}'"
                    )))
                }
            }
        }

        let missing: Vec<&str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| match *key {
                "host" => host.is_none(),
                "database" => database.is_none(),
                "user" => user.is_none(),
                "password" => password.is_none(),
                "port" => port.is_none(),
                _ => false,
            })
            .collect();
        if !missing.is_empty() {
            return Err(FlowError::Config(format!(
                "Credential string is missing: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            host: host.unwrap_or_default(),
            database: database.unwrap_or_default(),
            user: user.unwrap_or_default(),
            password: password.unwrap_or_default(),
            port: port.unwrap_or_default(),
        })
    }
}

/// Validate that the caller passed the *name* of an environment variable
/// rather than a literal credential string, then read and parse it.
pub fn creds_from_env(env_var: &str) -> Result<RedshiftCreds> {
    if REQUIRED_KEYS.iter().all(|key| env_var.contains(key)) {
        return Err(FlowError::Config(
            "This field should contain the name of an env variable, not the credentials string"
                .to_string(),
        ));
    }
    let creds_str = std::env::var(env_var).map_err(|_| {
        FlowError::Config(format!(
            "Warehouse credentials env variable '{env_var}' not found"
        ))
    })?;
    creds_str.parse()
}
