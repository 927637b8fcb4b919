//! `register`: create a new client identity at the CA

use super::{begin, done, tolerated};
use crate::config::Config;
use crate::error::Result;
use crate::sdk::IdentityRequest;
use crate::session::Session;
use std::io::Write;

pub fn register(session: &Session, config: &Config, name: &str, out: &mut dyn Write) -> Result<()> {
    begin(out, "Creating a new user at CA server")?;

    let membership = session.sdk().membership(None)?;
    let registrar = &config.registrar;
    if let Err(err) = membership.enroll(&registrar.enroll_id, &registrar.enroll_secret) {
        return tolerated(&config.compat, "registrar enrollment", err);
    }

    let request = IdentityRequest {
        id: name.to_string(),
        affiliation: session.organization().to_string(),
        identity_type: registrar.identity_type.clone(),
        secret: None,
    };
    let identity = membership.create_identity(&request)?;
    done(out)?;

    writeln!(out, "\nName: {}\nSecret: {}", identity.id, identity.secret)?;
    Ok(())
}
