//! Command-line front end: argument parsing and dispatch

use crate::commands::{self, EnrollMode, InvokeMode};
use crate::config::{load_config, Config, DEFAULT_CONFIG_FILE};
use crate::error::Result;
use crate::profile::{ConnectionProfile, DEFAULT_PROFILE};
use crate::sdk::Sdk;
use crate::session::{Overrides, Session, DEFAULT_USERNAME};
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::io::Write;
use tracing::debug;

#[derive(Debug, Parser)]
#[command(
    name = "fabric-cli",
    version,
    about = "Drive a Hyperledger Fabric network: channel setup, chaincode lifecycle, identities and transactions"
)]
pub struct Cli {
    /// Connection profile
    #[arg(long, global = true, default_value = DEFAULT_PROFILE)]
    pub profile: String,

    /// Peer name
    #[arg(long, global = true, default_value = "")]
    pub peer: String,

    /// Orderer name
    #[arg(long, global = true, default_value = "")]
    pub orderer: String,

    /// Channel name
    #[arg(long, global = true, default_value = "")]
    pub channel: String,

    /// Organization name
    #[arg(long, global = true, default_value = "")]
    pub org: String,

    /// Username
    #[arg(long, global = true, default_value = DEFAULT_USERNAME)]
    pub username: String,

    /// Client settings file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create/join a channel, and install/instantiate a chaincode
    Setup,
    /// Register a new user
    Register { name: String },
    /// Enroll a user
    Enroll { name: String, secret: String },
    /// Reenroll a user
    Reenroll { name: String, secret: String },
    /// Invoke a chaincode transaction
    Execute {
        func: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Execute a chaincode query
    Query {
        func: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

const LEGACY_FLAGS: [&str; 7] = [
    "profile", "peer", "orderer", "channel", "org", "username", "config",
];

const SUBCOMMANDS: [&str; 6] = ["setup", "register", "enroll", "reenroll", "execute", "query"];

/// Accept the single-dash spellings (`-profile x`, `-org=Org1`) used by
/// older scripts. Only arguments before the subcommand are rewritten, so
/// chaincode arguments pass through untouched.
pub fn normalize_legacy_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = Vec::new();
    let mut iter = args.into_iter().map(Into::into);
    if let Some(program) = iter.next() {
        out.push(program);
    }

    let mut expect_value = false;
    let mut in_command = false;
    for arg in iter {
        if in_command || expect_value {
            expect_value = false;
            out.push(arg);
            continue;
        }

        let Some(text) = arg.to_str() else {
            out.push(arg);
            continue;
        };
        if SUBCOMMANDS.contains(&text) {
            in_command = true;
            out.push(arg);
            continue;
        }

        let legacy = text
            .strip_prefix('-')
            .filter(|rest| !rest.starts_with('-'))
            .map(|rest| rest.split_once('=').map_or(rest, |(name, _)| name))
            .filter(|name| LEGACY_FLAGS.contains(name));
        match legacy {
            Some(name) => {
                expect_value = !text.contains('=');
                debug!("Rewriting legacy flag -{}", name);
                out.push(OsString::from(format!("-{}", text)));
            }
            None => {
                expect_value = text.starts_with("--")
                    && !text.contains('=')
                    && LEGACY_FLAGS.contains(&&text[2..]);
                out.push(arg);
            }
        }
    }
    out
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            channel: self.channel.clone(),
            org: self.org.clone(),
            peer: self.peer.clone(),
            orderer: self.orderer.clone(),
            username: self.username.clone(),
        }
    }
}

/// Load settings and profile, build the session and run the command.
///
/// `connect` builds the SDK from the loaded profile; the binary passes
/// [`FabricTools::connect`](crate::sdk::FabricTools::connect).
pub fn run<F>(cli: &Cli, connect: F, out: &mut dyn Write) -> Result<()>
where
    F: FnOnce(&ConnectionProfile, &Config) -> Result<Box<dyn Sdk>>,
{
    let config = load_config(&cli.config)?;
    let profile = ConnectionProfile::load(&cli.profile)?;
    let sdk = connect(&profile, &config)?;
    let session = Session::new(sdk, profile, &cli.overrides())?;
    execute(session, &config, &cli.command, &cli.orderer, out)
}

/// Dispatch one command on an already-built session.
pub fn execute(
    mut session: Session,
    config: &Config,
    command: &Command,
    orderer: &str,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Setup => {
            session.set_orderer(orderer)?;
            commands::setup(&session, config, out)
        }
        Command::Register { name } => commands::register(&session, config, name, out),
        Command::Enroll { name, secret } => {
            commands::enroll(&session, config, EnrollMode::Enroll, name, secret, out)
        }
        Command::Reenroll { name, secret } => {
            commands::enroll(&session, config, EnrollMode::Reenroll, name, secret, out)
        }
        Command::Execute { func, args } => {
            prefer_orderer(&mut session, orderer);
            commands::invoke(&session, config, InvokeMode::Execute, func, args, out)
        }
        Command::Query { func, args } => {
            prefer_orderer(&mut session, orderer);
            commands::invoke(&session, config, InvokeMode::Query, func, args, out)
        }
    }
}

/// Transactions can find an orderer through the channel, so an unresolved
/// orderer is not fatal here.
fn prefer_orderer(session: &mut Session, orderer: &str) {
    if let Err(err) = session.set_orderer(orderer) {
        debug!("No orderer selected, leaving discovery to the SDK: {}", err);
    }
}
