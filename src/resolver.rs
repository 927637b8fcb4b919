//! Default selection of channel, peer, orderer and organization
//!
//! When the operator omits a selector flag, the value is taken from the
//! connection profile, but only if the relevant section holds exactly one
//! entry. An empty or ambiguous section is a configuration error rather than
//! a silent default.

use crate::error::{CliError, Result};
use crate::profile::ConnectionProfile;
use serde_yaml::Value;

/// Profile sections that can be auto-selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Channel,
    Peer,
    Orderer,
}

impl Entity {
    pub fn section(self) -> &'static str {
        match self {
            Entity::Channel => "channels",
            Entity::Peer => "peers",
            Entity::Orderer => "orderers",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            Entity::Channel => "channel",
            Entity::Peer => "peer",
            Entity::Orderer => "orderer",
        }
    }

    pub fn plural(self) -> &'static str {
        self.section()
    }

    fn not_defined(self, profile: &str) -> CliError {
        CliError::config(format!(
            "{} is not defined in {}. Please use --{} option",
            self.singular(),
            profile,
            self.singular()
        ))
    }

    fn not_properly_defined(self, profile: &str) -> CliError {
        CliError::config(format!(
            "{} is not properly defined in {}. Please use --{} option",
            self.singular(),
            profile,
            self.singular()
        ))
    }

    fn ambiguous(self, profile: &str) -> CliError {
        CliError::config(format!(
            "multiple {} are defined in {}. Please use --{} option",
            self.plural(),
            profile,
            self.singular()
        ))
    }
}

/// Pick a value for `entity`: the explicit override when non-empty,
/// otherwise the single key of `candidates`.
///
/// `candidates` is the raw profile section (`None` when the key is absent).
/// `profile` names the profile in error messages.
pub fn resolve(
    explicit: &str,
    candidates: Option<&Value>,
    entity: Entity,
    profile: &str,
) -> Result<String> {
    if !explicit.is_empty() {
        return Ok(explicit.to_string());
    }

    let mapping = match candidates {
        None | Some(Value::Null) => return Err(entity.not_defined(profile)),
        Some(Value::Mapping(mapping)) => mapping,
        Some(_) => return Err(entity.not_properly_defined(profile)),
    };

    let mut keys = mapping.iter().map(|(key, _)| key);
    match (keys.next(), keys.next()) {
        (None, _) => Err(entity.not_defined(profile)),
        (Some(_), Some(_)) => Err(entity.ambiguous(profile)),
        (Some(key), None) => key
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| entity.not_properly_defined(profile)),
    }
}

/// Resolve `entity` against its section in `profile`.
pub fn resolve_in(profile: &ConnectionProfile, explicit: &str, entity: Entity) -> Result<String> {
    resolve(
        explicit,
        profile.lookup(entity.section()),
        entity,
        profile.source(),
    )
}

/// Pick the organization: the explicit override when non-empty, otherwise
/// `client.organization`.
pub fn resolve_organization(profile: &ConnectionProfile, explicit: &str) -> Result<String> {
    if !explicit.is_empty() {
        return Ok(explicit.to_string());
    }

    let not_defined = || {
        CliError::config(format!(
            "client.organization is not defined in {}. Please use --org option",
            profile.source()
        ))
    };

    match profile.lookup("client.organization") {
        None | Some(Value::Null) => Err(not_defined()),
        Some(Value::String(org)) if org.is_empty() => Err(not_defined()),
        Some(Value::String(org)) => Ok(org.clone()),
        Some(_) => Err(CliError::config(format!(
            "client.organization is not properly defined in {}. Please use --org option",
            profile.source()
        ))),
    }
}
