//! Configuration management for fabric-cli
//!
//! These are the client's own settings, separate from the connection
//! profile. They live in an optional `fabric-cli.toml`; every key has a
//! default, so the file is only needed to change one.

use crate::error::{CliError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "fabric-cli.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chaincode: ChaincodeConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub registrar: RegistrarConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub compat: CompatConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChaincodeConfig {
    #[serde(default = "default_chaincode_name")]
    pub name: String,
    /// Import path of the chaincode below `<gopath>/src`
    #[serde(default = "default_chaincode_name")]
    pub path: String,
    #[serde(default = "default_chaincode_version")]
    pub version: String,
    #[serde(default = "default_chaincode_gopath")]
    pub gopath: PathBuf,
    /// Signature policy expression. Unset means accept-all.
    #[serde(default)]
    pub endorsement_policy: Option<String>,
}

impl Default for ChaincodeConfig {
    fn default() -> Self {
        Self {
            name: default_chaincode_name(),
            path: default_chaincode_name(),
            version: default_chaincode_version(),
            gopath: default_chaincode_gopath(),
            endorsement_policy: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    #[serde(default = "default_channel_tx")]
    pub config_tx: PathBuf,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            config_tx: default_channel_tx(),
        }
    }
}

/// Bootstrap identity used to register new users.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrarConfig {
    #[serde(default = "default_enroll_id")]
    pub enroll_id: String,
    #[serde(default = "default_enroll_secret")]
    pub enroll_secret: String,
    #[serde(default = "default_identity_type")]
    pub identity_type: String,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            enroll_id: default_enroll_id(),
            enroll_secret: default_enroll_secret(),
            identity_type: default_identity_type(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_peer_binary")]
    pub peer: String,
    #[serde(default = "default_ca_client_binary")]
    pub ca_client: String,
    /// Where fetched channel blocks are written
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    /// Overrides `client.credentialStore.path` from the profile
    #[serde(default)]
    pub credential_store: Option<PathBuf>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            peer: default_peer_binary(),
            ca_client: default_ca_client_binary(),
            work_dir: default_work_dir(),
            credential_store: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompatConfig {
    /// Report success when joining the channel, the bootstrap enrollment of
    /// `register`, or `enroll`/`reenroll` fails. Older releases behaved this
    /// way; the remaining steps are skipped either way.
    #[serde(default)]
    pub swallow_step_errors: bool,
}

fn default_chaincode_name() -> String {
    "example".to_string()
}

fn default_chaincode_version() -> String {
    "v1".to_string()
}

fn default_chaincode_gopath() -> PathBuf {
    PathBuf::from("./chaincode/go")
}

fn default_channel_tx() -> PathBuf {
    PathBuf::from("./channel/mychannel.tx")
}

fn default_enroll_id() -> String {
    "admin".to_string()
}

fn default_enroll_secret() -> String {
    "adminpw".to_string()
}

fn default_identity_type() -> String {
    "client".to_string()
}

fn default_peer_binary() -> String {
    "peer".to_string()
}

fn default_ca_client_binary() -> String {
    "fabric-ca-client".to_string()
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".fabric-cli")
}

/// Load settings from `path`. A missing file yields the defaults; an
/// unreadable or invalid one is an error.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config: Config = match fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).map_err(|e| {
            CliError::config(format!("invalid settings in {}: {}", path.display(), e))
        })?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(e) => {
            return Err(CliError::config(format!(
                "failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    // Validate critical values
    if config.chaincode.name.is_empty() {
        return Err(CliError::config("chaincode.name must not be empty"));
    }

    if config.chaincode.version.is_empty() {
        return Err(CliError::config("chaincode.version must not be empty"));
    }

    if config.registrar.enroll_id.is_empty() {
        return Err(CliError::config("registrar.enroll_id must not be empty"));
    }

    Ok(config)
}
