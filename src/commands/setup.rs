//! `setup`: create and join a channel, install and instantiate the chaincode

use super::{begin, done, tolerated};
use crate::config::Config;
use crate::error::Result;
use crate::sdk::{EndorsementPolicy, InstallRequest, InstantiateRequest, SaveChannelRequest};
use crate::session::Session;
use std::io::Write;
use tracing::info;

pub fn setup(session: &Session, config: &Config, out: &mut dyn Write) -> Result<()> {
    let orderer = session.orderer()?;
    let sdk = session.sdk();

    let membership = sdk.membership(Some(session.organization()))?;
    let user = membership.signing_identity(session.username())?;
    let resources = sdk.resource_manager(session.username(), session.organization())?;

    begin(out, "Creating a channel")?;
    let request = SaveChannelRequest {
        channel_id: session.channel().to_string(),
        channel_config_path: config.channel.config_tx.clone(),
        signing_identities: vec![user],
    };
    resources.save_channel(&request, orderer)?;
    done(out)?;

    begin(out, "Joining the channel")?;
    if let Err(err) = resources.join_channel(session.channel(), session.peer(), orderer) {
        return tolerated(&config.compat, "channel join", err);
    }
    done(out)?;

    let chaincode = &config.chaincode;

    begin(out, "Installing a chaincode")?;
    let package = sdk.package_chaincode(&chaincode.path, &chaincode.gopath)?;
    let install = InstallRequest {
        name: chaincode.name.clone(),
        path: chaincode.path.clone(),
        version: chaincode.version.clone(),
        package,
    };
    resources.install_chaincode(&install, session.peer())?;
    done(out)?;

    begin(out, "Instantiating a chaincode")?;
    let policy = match &chaincode.endorsement_policy {
        Some(expr) => EndorsementPolicy::Expression(expr.clone()),
        None => EndorsementPolicy::AcceptAll,
    };
    let instantiate = InstantiateRequest {
        name: chaincode.name.clone(),
        path: chaincode.path.clone(),
        version: chaincode.version.clone(),
        args: Vec::new(),
        policy,
    };
    resources.instantiate_chaincode(session.channel(), &instantiate, orderer)?;
    done(out)?;

    info!(
        "Channel {} is ready with chaincode {}:{}",
        session.channel(),
        chaincode.name,
        chaincode.version
    );
    Ok(())
}
