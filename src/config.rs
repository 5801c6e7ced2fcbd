use std::fmt;

use ::config::{Config, Environment, Map};
use serde::Deserialize;

use crate::error::Result;

pub const DEFAULT_PROTOCOL: &str = "http";
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_PASSWORD: &str = "bitcoin";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8332;

// BITCOIN_USERNAME, BITCOIN_PASSWORD, BITCOIN_IP, BITCOIN_PORT
const ENV_PREFIX: &str = "BITCOIN";

/// Connection parameters of the node's JSON-RPC endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct RpcConfig {
    pub protocol: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
struct EnvSettings {
    username: String,
    password: String,
    ip: String,
    port: u16,
}

impl Default for RpcConfig {
    fn default() -> Self {
        RpcConfig {
            protocol: DEFAULT_PROTOCOL.to_string(),
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl RpcConfig {
    /// Resolve from `BITCOIN_*` variables, empty ones fall back to the defaults
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Resolve from the given variables instead of the process environment
    pub fn from_vars(vars: Map<String, String>) -> Result<Self> {
        Self::load(Some(vars))
    }

    fn load(vars: Option<Map<String, String>>) -> Result<Self> {
        let settings: EnvSettings = Config::builder()
            .set_default("username", DEFAULT_USER)?
            .set_default("password", DEFAULT_PASSWORD)?
            .set_default("ip", DEFAULT_HOST)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .ignore_empty(true)
                    .source(vars),
            )
            .build()?
            .try_deserialize()?;

        Ok(RpcConfig {
            protocol: DEFAULT_PROTOCOL.to_string(),
            user: settings.username,
            password: settings.password,
            host: settings.ip,
            port: settings.port,
        })
    }

    /// Endpoint URL, e.g. `http://127.0.0.1:8332/`
    pub fn url(&self) -> String {
        format!("{}://{}:{}/", self.protocol, self.host, self.port)
    }
}

impl fmt::Debug for RpcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcConfig")
            .field("protocol", &self.protocol)
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}
