//! Per-invocation session: one SDK handle plus the resolved selection

use crate::error::{CliError, Result};
use crate::profile::ConnectionProfile;
use crate::resolver::{resolve_in, resolve_organization, Entity};
use crate::sdk::Sdk;
use tracing::debug;

pub const DEFAULT_USERNAME: &str = "Admin";

/// Operator-supplied selectors. Empty strings mean "pick from the profile".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub channel: String,
    pub org: String,
    pub peer: String,
    pub orderer: String,
    pub username: String,
}

pub struct Session {
    sdk: Box<dyn Sdk>,
    profile: ConnectionProfile,
    organization: String,
    channel: String,
    peer: String,
    orderer: Option<String>,
    username: String,
}

impl Session {
    /// Resolve channel, organization and peer. The orderer is left for
    /// [`Session::set_orderer`] since only some commands need it.
    pub fn new(sdk: Box<dyn Sdk>, profile: ConnectionProfile, overrides: &Overrides) -> Result<Self> {
        let channel = resolve_in(&profile, &overrides.channel, Entity::Channel)?;
        let organization = resolve_organization(&profile, &overrides.org)?;
        let peer = resolve_in(&profile, &overrides.peer, Entity::Peer)?;
        let username = if overrides.username.is_empty() {
            DEFAULT_USERNAME.to_string()
        } else {
            overrides.username.clone()
        };

        debug!(
            %channel, %organization, %peer, %username,
            "Resolved selection from {}", profile.source()
        );

        Ok(Self {
            sdk,
            profile,
            organization,
            channel,
            peer,
            orderer: None,
            username,
        })
    }

    pub fn set_orderer(&mut self, explicit: &str) -> Result<()> {
        let orderer = resolve_in(&self.profile, explicit, Entity::Orderer)?;
        debug!(%orderer, "Resolved orderer");
        self.orderer = Some(orderer);
        Ok(())
    }

    pub fn sdk(&self) -> &dyn Sdk {
        self.sdk.as_ref()
    }

    pub fn profile(&self) -> &ConnectionProfile {
        &self.profile
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The resolved orderer, or an error when none was resolved.
    pub fn orderer(&self) -> Result<&str> {
        self.orderer.as_deref().ok_or_else(|| {
            CliError::config(format!(
                "orderer is not resolved. Please use --orderer option or define one in {}",
                self.profile.source()
            ))
        })
    }

    pub fn orderer_hint(&self) -> Option<&str> {
        self.orderer.as_deref()
    }
}
