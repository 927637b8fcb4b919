//! Capability interfaces of the network SDK
//!
//! Command handlers never talk to peers, orderers or certificate
//! authorities directly. They borrow short-lived clients from an [`Sdk`] and
//! hand them plain request values. [`FabricTools`] is the shipped backend;
//! tests substitute recording fakes.

pub mod fabric_tools;
pub mod runner;

pub use fabric_tools::FabricTools;
pub use runner::{CommandRunner, Invocation, SystemRunner, ToolOutput};

use crate::error::Result;
use std::fmt;
use std::path::PathBuf;

/// Status code a peer returns for a successful endorsement.
pub const STATUS_OK: i32 = 200;

/// Entry point to the SDK: hands out clients bound to an identity.
pub trait Sdk {
    /// Membership-service client. `org` falls back to the profile's client
    /// organization.
    fn membership(&self, org: Option<&str>) -> Result<Box<dyn MembershipService + '_>>;

    /// Resource-management client acting as `user` of `org`.
    fn resource_manager(&self, user: &str, org: &str) -> Result<Box<dyn ResourceManager + '_>>;

    /// Transaction client on `channel` acting as `user` of `org`. `orderer`
    /// is a hint for submissions; the backend may discover one when `None`.
    fn channel_client(
        &self,
        channel: &str,
        user: &str,
        org: &str,
        orderer: Option<&str>,
    ) -> Result<Box<dyn TransactionSubmitter + '_>>;

    /// Package chaincode found at `<root>/src/<path>`.
    fn package_chaincode(&self, path: &str, root: &std::path::Path) -> Result<ChaincodePackage>;
}

pub trait MembershipService {
    fn signing_identity(&self, username: &str) -> Result<SigningIdentity>;

    /// Obtain a certificate for `id` with `secret`. Whether this issues a
    /// fresh certificate or replaces an existing one is up to the service.
    fn enroll(&self, id: &str, secret: &str) -> Result<()>;

    fn create_identity(&self, request: &IdentityRequest) -> Result<IdentityResponse>;
}

pub trait ChannelAdmin {
    fn save_channel(&self, request: &SaveChannelRequest, orderer: &str) -> Result<()>;

    fn join_channel(&self, channel: &str, peer: &str, orderer: &str) -> Result<()>;
}

pub trait ResourceManager: ChannelAdmin {
    fn install_chaincode(&self, request: &InstallRequest, peer: &str) -> Result<()>;

    fn instantiate_chaincode(
        &self,
        channel: &str,
        request: &InstantiateRequest,
        orderer: &str,
    ) -> Result<()>;
}

pub trait TransactionSubmitter {
    /// Evaluate without ordering.
    fn query(&self, request: &ChannelRequest, peer: &str) -> Result<ChannelResponse>;

    /// Endorse, order and commit.
    fn execute(&self, request: &ChannelRequest, peer: &str) -> Result<ChannelResponse>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningIdentity {
    pub id: String,
    pub msp_id: String,
    pub msp_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveChannelRequest {
    pub channel_id: String,
    pub channel_config_path: PathBuf,
    pub signing_identities: Vec<SigningIdentity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChaincodeLanguage {
    Golang,
}

impl ChaincodeLanguage {
    pub fn as_str(self) -> &'static str {
        match self {
            ChaincodeLanguage::Golang => "golang",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChaincodePackage {
    pub language: ChaincodeLanguage,
    pub path: String,
    pub root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub name: String,
    pub path: String,
    pub version: String,
    pub package: ChaincodePackage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndorsementPolicy {
    /// Any response endorses, no signatures required
    AcceptAll,
    /// Signature policy in the peer's expression syntax
    Expression(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantiateRequest {
    pub name: String,
    pub path: String,
    pub version: String,
    pub args: Vec<Vec<u8>>,
    pub policy: EndorsementPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRequest {
    pub id: String,
    pub affiliation: String,
    pub identity_type: String,
    pub secret: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityResponse {
    pub id: String,
    pub secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRequest {
    pub chaincode_id: String,
    pub function: String,
    pub args: Vec<Vec<u8>>,
}

impl ChannelRequest {
    pub fn new(chaincode_id: &str, function: &str, args: &[String]) -> Self {
        Self {
            chaincode_id: chaincode_id.to_string(),
            function: function.to_string(),
            args: args.iter().map(|arg| arg.as_bytes().to_vec()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalResponse {
    pub endorser: String,
    pub status: i32,
    pub message: String,
    pub payload: Vec<u8>,
}

impl ProposalResponse {
    pub fn ok(endorser: &str, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            endorser: endorser.to_string(),
            status: STATUS_OK,
            message: String::new(),
            payload: payload.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Protobuf text form, e.g. `status:500 message:"chaincode error"`. Empty
/// fields are omitted.
impl fmt::Display for ProposalResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "status:{}", self.status)?;
        if !self.message.is_empty() {
            write!(f, " message:\"{}\"", escape_text(self.message.as_bytes()))?;
        }
        if !self.payload.is_empty() {
            write!(f, " payload:\"{}\"", escape_text(&self.payload))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChannelResponse {
    pub transaction_id: Option<String>,
    pub responses: Vec<ProposalResponse>,
}

fn escape_text(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\{:03o}", b)),
        }
    }
    out
}
