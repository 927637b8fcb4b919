//! `execute` / `query`: submit a chaincode transaction proposal

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::sdk::{ChannelRequest, ProposalResponse};
use crate::session::Session;
use std::io::Write;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeMode {
    /// Read-only evaluation on the peer
    Query,
    /// Endorse, order and commit
    Execute,
}

pub fn invoke(
    session: &Session,
    config: &Config,
    mode: InvokeMode,
    function: &str,
    args: &[String],
    out: &mut dyn Write,
) -> Result<()> {
    writeln!(
        out,
        "Sending a signed transaction proposal with the certificate of {}...",
        session.username()
    )?;

    let client = session.sdk().channel_client(
        session.channel(),
        session.username(),
        session.organization(),
        session.orderer_hint(),
    )?;
    let request = ChannelRequest::new(&config.chaincode.name, function, args);

    let response = match mode {
        InvokeMode::Query => client.query(&request, session.peer())?,
        InvokeMode::Execute => client.execute(&request, session.peer())?,
    };
    if let Some(tx_id) = &response.transaction_id {
        debug!(%tx_id, "Transaction committed");
    }

    let first = response
        .responses
        .first()
        .ok_or_else(|| CliError::sdk("no endorsement responses received"))?;
    report(first, out)
}

fn report(response: &ProposalResponse, out: &mut dyn Write) -> Result<()> {
    if response.is_ok() {
        writeln!(
            out,
            "Success\nReturned payload: {}",
            String::from_utf8_lossy(&response.payload)
        )?;
    } else {
        writeln!(out, "{}", response)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_ok_prints_payload() {
        let mut out = Vec::new();
        report(&ProposalResponse::ok("peer0", b"100".to_vec()), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Success\nReturned payload: 100\n"
        );
    }

    #[test]
    fn test_report_failure_prints_raw_response() {
        let response = ProposalResponse {
            endorser: "peer0".to_string(),
            status: 500,
            message: "Nil amount for A".to_string(),
            payload: Vec::new(),
        };
        let mut out = Vec::new();
        report(&response, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "status:500 message:\"Nil amount for A\"\n"
        );
    }
}
