//! `enroll` / `reenroll`: obtain a certificate for an existing identity

use super::{begin, done, tolerated};
use crate::config::Config;
use crate::error::Result;
use crate::session::Session;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollMode {
    Enroll,
    Reenroll,
}

impl EnrollMode {
    fn progress(self) -> &'static str {
        match self {
            EnrollMode::Enroll => {
                "Generating a pair of public/private keys, and sending Certificate Signing Request with the public key to a CA server"
            }
            EnrollMode::Reenroll => {
                "Generating a pair of public/private keys, and requesting a CA server to revoke the old certificate, and create a new certificate with the public key"
            }
        }
    }
}

/// Both modes make the same membership call; the CA decides whether the
/// identity gets a first certificate or a replacement.
pub fn enroll(
    session: &Session,
    config: &Config,
    mode: EnrollMode,
    name: &str,
    secret: &str,
    out: &mut dyn Write,
) -> Result<()> {
    begin(out, mode.progress())?;

    let membership = session.sdk().membership(None)?;
    if let Err(err) = membership.enroll(name, secret) {
        return tolerated(&config.compat, "enrollment", err);
    }
    done(out)?;
    Ok(())
}
