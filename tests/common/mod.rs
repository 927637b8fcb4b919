//! Shared fixtures: a recording fake SDK and profile helpers
#![allow(dead_code)]

use fabric_cli::error::{CliError, Result};
use fabric_cli::profile::ConnectionProfile;
use fabric_cli::sdk::{
    ChaincodeLanguage, ChaincodePackage, ChannelAdmin, ChannelRequest, ChannelResponse,
    IdentityRequest, IdentityResponse, InstallRequest, InstantiateRequest, MembershipService,
    ProposalResponse, ResourceManager, SaveChannelRequest, Sdk, SigningIdentity,
    TransactionSubmitter,
};
use fabric_cli::session::{Overrides, Session};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub const PROFILE_SOURCE: &str = "test-profile.yaml";

/// One channel, one peer, one orderer, client organization Org1.
pub const PROFILE: &str = r#"
client:
  organization: Org1
channels:
  mychannel: {}
peers:
  peer0:
    url: grpc://localhost:7051
orderers:
  orderer0:
    url: grpc://localhost:7050
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Membership(Option<String>),
    SigningIdentity(String),
    ResourceManager {
        user: String,
        org: String,
    },
    SaveChannel {
        request: SaveChannelRequest,
        orderer: String,
    },
    JoinChannel {
        channel: String,
        peer: String,
        orderer: String,
    },
    Package {
        path: String,
        root: PathBuf,
    },
    Install {
        request: InstallRequest,
        peer: String,
    },
    Instantiate {
        channel: String,
        request: InstantiateRequest,
        orderer: String,
    },
    Enroll {
        id: String,
        secret: String,
    },
    CreateIdentity(IdentityRequest),
    ChannelClient {
        channel: String,
        user: String,
        org: String,
        orderer: Option<String>,
    },
    Query {
        request: ChannelRequest,
        peer: String,
    },
    Execute {
        request: ChannelRequest,
        peer: String,
    },
}

/// Records every call; steps named in `failing` return an SDK error after
/// being recorded.
#[derive(Clone, Default)]
pub struct FakeSdk {
    log: Rc<RefCell<Vec<Call>>>,
    failing: Rc<RefCell<Vec<&'static str>>>,
    response: Rc<RefCell<Option<ChannelResponse>>>,
}

impl FakeSdk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(self, step: &'static str) -> Self {
        self.failing.borrow_mut().push(step);
        self
    }

    pub fn responding(self, response: ChannelResponse) -> Self {
        *self.response.borrow_mut() = Some(response);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    pub fn called(&self, pred: impl Fn(&Call) -> bool) -> bool {
        self.log.borrow().iter().any(pred)
    }

    fn record(&self, step: &'static str, call: Call) -> Result<()> {
        self.log.borrow_mut().push(call);
        if self.failing.borrow().contains(&step) {
            return Err(CliError::sdk(format!("{} failed", step)));
        }
        Ok(())
    }

    fn channel_response(&self) -> ChannelResponse {
        self.response.borrow().clone().unwrap_or_else(|| ChannelResponse {
            transaction_id: Some("tx-1".to_string()),
            responses: vec![ProposalResponse::ok("peer0", b"ok".to_vec())],
        })
    }
}

impl Sdk for FakeSdk {
    fn membership(&self, org: Option<&str>) -> Result<Box<dyn MembershipService + '_>> {
        self.record("membership", Call::Membership(org.map(str::to_string)))?;
        Ok(Box::new(self.clone()))
    }

    fn resource_manager(&self, user: &str, org: &str) -> Result<Box<dyn ResourceManager + '_>> {
        self.record(
            "resource_manager",
            Call::ResourceManager {
                user: user.to_string(),
                org: org.to_string(),
            },
        )?;
        Ok(Box::new(self.clone()))
    }

    fn channel_client(
        &self,
        channel: &str,
        user: &str,
        org: &str,
        orderer: Option<&str>,
    ) -> Result<Box<dyn TransactionSubmitter + '_>> {
        self.record(
            "channel_client",
            Call::ChannelClient {
                channel: channel.to_string(),
                user: user.to_string(),
                org: org.to_string(),
                orderer: orderer.map(str::to_string),
            },
        )?;
        Ok(Box::new(self.clone()))
    }

    fn package_chaincode(&self, path: &str, root: &Path) -> Result<ChaincodePackage> {
        self.record(
            "package",
            Call::Package {
                path: path.to_string(),
                root: root.to_path_buf(),
            },
        )?;
        Ok(ChaincodePackage {
            language: ChaincodeLanguage::Golang,
            path: path.to_string(),
            root: root.to_path_buf(),
        })
    }
}

impl MembershipService for FakeSdk {
    fn signing_identity(&self, username: &str) -> Result<SigningIdentity> {
        self.record("signing_identity", Call::SigningIdentity(username.to_string()))?;
        Ok(SigningIdentity {
            id: username.to_string(),
            msp_id: "Org1MSP".to_string(),
            msp_dir: PathBuf::from(format!("/msp/{}", username)),
        })
    }

    fn enroll(&self, id: &str, secret: &str) -> Result<()> {
        self.record(
            "enroll",
            Call::Enroll {
                id: id.to_string(),
                secret: secret.to_string(),
            },
        )
    }

    fn create_identity(&self, request: &IdentityRequest) -> Result<IdentityResponse> {
        self.record("create_identity", Call::CreateIdentity(request.clone()))?;
        Ok(IdentityResponse {
            id: request.id.clone(),
            secret: format!("s3cret-{}", request.id),
        })
    }
}

impl ChannelAdmin for FakeSdk {
    fn save_channel(&self, request: &SaveChannelRequest, orderer: &str) -> Result<()> {
        self.record(
            "save_channel",
            Call::SaveChannel {
                request: request.clone(),
                orderer: orderer.to_string(),
            },
        )
    }

    fn join_channel(&self, channel: &str, peer: &str, orderer: &str) -> Result<()> {
        self.record(
            "join_channel",
            Call::JoinChannel {
                channel: channel.to_string(),
                peer: peer.to_string(),
                orderer: orderer.to_string(),
            },
        )
    }
}

impl ResourceManager for FakeSdk {
    fn install_chaincode(&self, request: &InstallRequest, peer: &str) -> Result<()> {
        self.record(
            "install",
            Call::Install {
                request: request.clone(),
                peer: peer.to_string(),
            },
        )
    }

    fn instantiate_chaincode(
        &self,
        channel: &str,
        request: &InstantiateRequest,
        orderer: &str,
    ) -> Result<()> {
        self.record(
            "instantiate",
            Call::Instantiate {
                channel: channel.to_string(),
                request: request.clone(),
                orderer: orderer.to_string(),
            },
        )
    }
}

impl TransactionSubmitter for FakeSdk {
    fn query(&self, request: &ChannelRequest, peer: &str) -> Result<ChannelResponse> {
        self.record(
            "query",
            Call::Query {
                request: request.clone(),
                peer: peer.to_string(),
            },
        )?;
        Ok(self.channel_response())
    }

    fn execute(&self, request: &ChannelRequest, peer: &str) -> Result<ChannelResponse> {
        self.record(
            "execute",
            Call::Execute {
                request: request.clone(),
                peer: peer.to_string(),
            },
        )?;
        Ok(self.channel_response())
    }
}

pub fn profile(yaml: &str) -> ConnectionProfile {
    ConnectionProfile::from_yaml_str(PROFILE_SOURCE, yaml).expect("test profile parses")
}

pub fn session(sdk: &FakeSdk, yaml: &str, overrides: &Overrides) -> Result<Session> {
    Session::new(Box::new(sdk.clone()), profile(yaml), overrides)
}

pub fn text(out: Vec<u8>) -> String {
    String::from_utf8(out).expect("utf-8 output")
}
