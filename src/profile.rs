//! Connection profile loading and lookup
//!
//! A connection profile describes the network topology the client talks to:
//! the client's organization, channels, peers, orderers, organizations and
//! certificate authorities. The profile is treated as a read-only lookup
//! table. Key matching is case-insensitive, so `tlsCACerts` and `tlscacerts`
//! refer to the same entry.

use crate::error::{CliError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_PROFILE: &str = "connection-profile.yaml";

#[derive(Debug, Clone)]
pub struct ConnectionProfile {
    source: String,
    root: Value,
}

/// A peer or orderer as the tools need to address it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEndpoint {
    pub name: String,
    /// `host:port`, without scheme
    pub address: String,
    pub tls: bool,
    pub tls_ca_cert: Option<PathBuf>,
    pub hostname_override: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationInfo {
    pub name: String,
    pub msp_id: String,
    pub crypto_path: Option<String>,
    pub peers: Vec<String>,
    pub certificate_authorities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateAuthority {
    pub name: String,
    pub url: String,
    pub ca_name: Option<String>,
    pub tls_ca_cert: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoProvider {
    Software,
    Pkcs11,
}

/// `client.BCCSP.security` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoSuiteConfig {
    pub provider: CryptoProvider,
    pub hash_algorithm: String,
    pub security_level: u32,
    pub library: Option<String>,
    pub pin: Option<String>,
    pub label: Option<String>,
}

impl Default for CryptoSuiteConfig {
    fn default() -> Self {
        Self {
            provider: CryptoProvider::Software,
            hash_algorithm: "SHA2".to_string(),
            security_level: 256,
            library: None,
            pin: None,
            label: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TlsCertsSection {
    #[serde(default)]
    path: Option<String>,
}

// Section structs are read through `read_section()`, which lowercases every
// mapping key first, so field names here are all lowercase.

#[derive(Debug, Deserialize)]
struct NodeSection {
    url: String,
    #[serde(default, rename = "tlscacerts")]
    tls_ca_certs: Option<TlsCertsSection>,
    #[serde(default, rename = "grpcoptions")]
    grpc_options: Option<Mapping>,
}

#[derive(Debug, Deserialize)]
struct OrganizationSection {
    #[serde(rename = "mspid")]
    msp_id: String,
    #[serde(default, rename = "cryptopath")]
    crypto_path: Option<String>,
    #[serde(default)]
    peers: Vec<String>,
    #[serde(default, rename = "certificateauthorities")]
    certificate_authorities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CertificateAuthoritySection {
    url: String,
    #[serde(default, rename = "caname")]
    ca_name: Option<String>,
    #[serde(default, rename = "tlscacerts")]
    tls_ca_certs: Option<TlsCertsSection>,
}

impl ConnectionProfile {
    /// Read and parse a YAML profile from disk.
    pub fn load(path: &str) -> Result<Self> {
        let yaml = fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("failed to read connection profile {}: {}", path, e))
        })?;
        Self::from_yaml_str(path, &yaml)
    }

    /// Parse a profile from a YAML string. `source` names the profile in
    /// error messages.
    pub fn from_yaml_str(source: &str, yaml: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(yaml).map_err(|e| {
            CliError::config(format!("failed to parse connection profile {}: {}", source, e))
        })?;
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    /// The path (or name) the profile was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Look up a dotted key such as `client.organization`.
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        key.split('.')
            .try_fold(&self.root, |value, part| child(value, part))
    }

    /// Look up a named entry inside a top-level section. Entry names may
    /// contain dots (`peer0.org1.example.com`), so they are not split.
    pub fn entry(&self, section: &str, name: &str) -> Option<&Value> {
        self.lookup(section).and_then(|value| child(value, name))
    }

    /// The client's default organization, if the profile names one.
    pub fn client_organization(&self) -> Option<&str> {
        self.lookup("client.organization").and_then(Value::as_str)
    }

    pub fn peer(&self, name: &str) -> Result<NodeEndpoint> {
        self.node("peers", "peer", name)
    }

    pub fn orderer(&self, name: &str) -> Result<NodeEndpoint> {
        self.node("orderers", "orderer", name)
    }

    /// Orderers listed under `channels.<channel>.orderers`.
    pub fn channel_orderers(&self, channel: &str) -> Vec<String> {
        self.entry("channels", channel)
            .and_then(|value| child(value, "orderers"))
            .and_then(Value::as_sequence)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn organization(&self, name: &str) -> Result<OrganizationInfo> {
        let value = self.entry("organizations", name).ok_or_else(|| {
            CliError::config(format!(
                "organization {} is not defined in {}",
                name, self.source
            ))
        })?;
        let section: OrganizationSection = read_section(value).map_err(|e| {
            CliError::config(format!(
                "organization {} is not properly defined in {}: {}",
                name, self.source, e
            ))
        })?;
        Ok(OrganizationInfo {
            name: name.to_string(),
            msp_id: section.msp_id,
            crypto_path: section.crypto_path.map(|p| expand_env(&p)),
            peers: section.peers,
            certificate_authorities: section.certificate_authorities,
        })
    }

    /// The first certificate authority serving `org`.
    pub fn certificate_authority_for(&self, org: &str) -> Result<CertificateAuthority> {
        let info = self.organization(org)?;
        let name = info.certificate_authorities.first().ok_or_else(|| {
            CliError::config(format!(
                "no certificate authority is defined for organization {} in {}",
                org, self.source
            ))
        })?;
        let value = self.entry("certificateAuthorities", name).ok_or_else(|| {
            CliError::config(format!(
                "certificate authority {} is not defined in {}",
                name, self.source
            ))
        })?;
        let section: CertificateAuthoritySection = read_section(value).map_err(|e| {
            CliError::config(format!(
                "certificate authority {} is not properly defined in {}: {}",
                name, self.source, e
            ))
        })?;
        Ok(CertificateAuthority {
            name: name.clone(),
            url: section.url,
            ca_name: section.ca_name,
            tls_ca_cert: section
                .tls_ca_certs
                .and_then(|certs| certs.path)
                .map(|p| PathBuf::from(expand_env(&p))),
        })
    }

    pub fn credential_store_path(&self) -> Option<PathBuf> {
        self.lookup("client.credentialStore.path")
            .and_then(Value::as_str)
            .map(|p| PathBuf::from(expand_env(p)))
    }

    pub fn crypto_config_path(&self) -> Option<PathBuf> {
        self.lookup("client.cryptoconfig.path")
            .and_then(Value::as_str)
            .map(|p| PathBuf::from(expand_env(p)))
    }

    pub fn crypto_suite(&self) -> Result<CryptoSuiteConfig> {
        let mut suite = CryptoSuiteConfig::default();
        let Some(security) = self.lookup("client.BCCSP.security") else {
            return Ok(suite);
        };

        let provider = child(security, "default")
            .and_then(|d| child(d, "provider"))
            .and_then(Value::as_str)
            .unwrap_or("SW");
        if provider.eq_ignore_ascii_case("PKCS11") {
            suite.provider = CryptoProvider::Pkcs11;
        }
        if let Some(hash) = child(security, "hashAlgorithm").and_then(Value::as_str) {
            suite.hash_algorithm = hash.to_string();
        }
        if let Some(level) = child(security, "level").and_then(Value::as_u64) {
            suite.security_level = u32::try_from(level).map_err(|_| {
                CliError::config(format!(
                    "client.BCCSP.security.level {} is out of range in {}",
                    level, self.source
                ))
            })?;
        }
        suite.library = scalar_string(child(security, "library")).map(|p| expand_env(&p));
        suite.pin = scalar_string(child(security, "pin"));
        suite.label = scalar_string(child(security, "label"));
        Ok(suite)
    }

    fn node(&self, section: &str, kind: &str, name: &str) -> Result<NodeEndpoint> {
        let value = self.entry(section, name).ok_or_else(|| {
            CliError::config(format!("{} {} is not defined in {}", kind, name, self.source))
        })?;
        let node: NodeSection = read_section(value).map_err(|e| {
            CliError::config(format!(
                "{} {} is not properly defined in {}: {}",
                kind, name, self.source, e
            ))
        })?;

        let url = parse_url(&node.url, "grpc")?;
        let address = host_port(&url).ok_or_else(|| {
            CliError::config(format!(
                "{} {} has no host in its url {} in {}",
                kind, name, node.url, self.source
            ))
        })?;
        let tls_ca_cert = node
            .tls_ca_certs
            .and_then(|certs| certs.path)
            .map(|p| PathBuf::from(expand_env(&p)));
        let hostname_override = node
            .grpc_options
            .as_ref()
            .and_then(|opts| opts.get("ssl-target-name-override"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(NodeEndpoint {
            name: name.to_string(),
            address,
            tls: url.scheme() == "grpcs" || tls_ca_cert.is_some(),
            tls_ca_cert,
            hostname_override,
        })
    }
}

fn child<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let mapping = value.as_mapping()?;
    mapping.get(key).or_else(|| {
        mapping
            .iter()
            .find(|(k, _)| k.as_str().is_some_and(|k| k.eq_ignore_ascii_case(key)))
            .map(|(_, v)| v)
    })
}

fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn read_section<T: DeserializeOwned>(value: &Value) -> serde_yaml::Result<T> {
    serde_yaml::from_value(lowercase_keys(value))
}

fn lowercase_keys(value: &Value) -> Value {
    match value {
        Value::Mapping(mapping) => Value::Mapping(
            mapping
                .iter()
                .map(|(key, value)| {
                    let key = match key {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other.clone(),
                    };
                    (key, lowercase_keys(value))
                })
                .collect(),
        ),
        Value::Sequence(items) => Value::Sequence(items.iter().map(lowercase_keys).collect()),
        other => other.clone(),
    }
}

/// Parse an endpoint url. Bare `host:port` addresses get `default_scheme`.
pub fn parse_url(raw: &str, default_scheme: &str) -> Result<Url> {
    let full = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("{}://{}", default_scheme, raw)
    };
    Url::parse(&full).map_err(|e| CliError::config(format!("invalid url {}: {}", raw, e)))
}

/// `host:port` of an endpoint, or just the host when no port is known.
pub fn host_port(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port_or_known_default() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Substitute `${VAR}` references with environment values. Unset variables
/// expand to the empty string.
pub fn expand_env(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let var = &after[..end];
                out.push_str(&std::env::var(var).unwrap_or_default());
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r#"
name: test-network
client:
  organization: Org1
  credentialStore:
    path: /tmp/state-store
  cryptoconfig:
    path: /opt/crypto-config
  BCCSP:
    security:
      default:
        provider: PKCS11
      hashAlgorithm: SHA2
      level: 256
      library: /usr/lib/softhsm/libsofthsm2.so
      pin: 98765432
      label: ForFabric
channels:
  mychannel:
    orderers:
      - orderer.example.com
    peers:
      peer0.org1.example.com: {}
organizations:
  Org1:
    mspid: Org1MSP
    cryptoPath: peerOrganizations/org1.example.com/users/{username}@org1.example.com/msp
    peers:
      - peer0.org1.example.com
    certificateAuthorities:
      - ca.org1.example.com
orderers:
  orderer.example.com:
    url: grpcs://localhost:7050
    grpcOptions:
      ssl-target-name-override: orderer.example.com
    tlsCACerts:
      path: /opt/tls/orderer-ca.pem
peers:
  peer0.org1.example.com:
    url: grpc://localhost:7051
certificateAuthorities:
  ca.org1.example.com:
    url: http://localhost:7054
    caName: ca-org1
"#;

    fn profile() -> ConnectionProfile {
        ConnectionProfile::from_yaml_str("test.yaml", PROFILE).unwrap()
    }

    #[test]
    fn test_lookup_dotted_and_case_insensitive() {
        let p = profile();
        assert_eq!(p.client_organization(), Some("Org1"));
        assert!(p.lookup("CLIENT.Organization").is_some());
        assert!(p.lookup("client.missing").is_none());
        assert!(p.entry("peers", "peer0.org1.example.com").is_some());
    }

    #[test]
    fn test_node_endpoints() {
        let p = profile();
        let peer = p.peer("peer0.org1.example.com").unwrap();
        assert_eq!(peer.address, "localhost:7051");
        assert!(!peer.tls);

        let orderer = p.orderer("orderer.example.com").unwrap();
        assert_eq!(orderer.address, "localhost:7050");
        assert!(orderer.tls);
        assert_eq!(
            orderer.tls_ca_cert,
            Some(PathBuf::from("/opt/tls/orderer-ca.pem"))
        );
        assert_eq!(
            orderer.hostname_override.as_deref(),
            Some("orderer.example.com")
        );

        let err = p.peer("peer9").unwrap_err();
        assert!(err.to_string().contains("peer peer9 is not defined in test.yaml"));
    }

    #[test]
    fn test_organization_and_ca() {
        let p = profile();
        let org = p.organization("Org1").unwrap();
        assert_eq!(org.msp_id, "Org1MSP");
        assert_eq!(org.peers, vec!["peer0.org1.example.com".to_string()]);

        let ca = p.certificate_authority_for("Org1").unwrap();
        assert_eq!(ca.name, "ca.org1.example.com");
        assert_eq!(ca.url, "http://localhost:7054");
        assert_eq!(ca.ca_name.as_deref(), Some("ca-org1"));
        assert!(ca.tls_ca_cert.is_none());

        assert!(p.organization("Org2").is_err());
    }

    #[test]
    fn test_channel_orderers_and_paths() {
        let p = profile();
        assert_eq!(
            p.channel_orderers("mychannel"),
            vec!["orderer.example.com".to_string()]
        );
        assert!(p.channel_orderers("other").is_empty());
        assert_eq!(
            p.credential_store_path(),
            Some(PathBuf::from("/tmp/state-store"))
        );
        assert_eq!(
            p.crypto_config_path(),
            Some(PathBuf::from("/opt/crypto-config"))
        );
    }

    #[test]
    fn test_crypto_suite() {
        let suite = profile().crypto_suite().unwrap();
        assert_eq!(suite.provider, CryptoProvider::Pkcs11);
        assert_eq!(suite.pin.as_deref(), Some("98765432"));
        assert_eq!(suite.label.as_deref(), Some("ForFabric"));
        assert_eq!(suite.security_level, 256);

        let bare = ConnectionProfile::from_yaml_str("bare.yaml", "client: {}").unwrap();
        assert_eq!(bare.crypto_suite().unwrap(), CryptoSuiteConfig::default());

        let huge = ConnectionProfile::from_yaml_str(
            "huge.yaml",
            "client:\n  BCCSP:\n    security:\n      level: 4294967552\n",
        )
        .unwrap();
        let err = huge.crypto_suite().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("level 4294967552 is out of range"));
    }

    #[test]
    fn test_section_keys_in_any_case() {
        let p = ConnectionProfile::from_yaml_str(
            "mixed.yaml",
            r#"
organizations:
  Org1:
    MSPID: Org1MSP
    CertificateAuthorities: [ca0]
orderers:
  orderer0:
    URL: grpc://localhost:7050
    TLSCACerts:
      Path: /tls/ca.pem
    GRPCOptions:
      SSL-Target-Name-Override: orderer.example.com
certificateAuthorities:
  ca0:
    url: http://localhost:7054
    CAName: ca-org1
"#,
        )
        .unwrap();

        assert_eq!(p.organization("Org1").unwrap().msp_id, "Org1MSP");
        let orderer = p.orderer("orderer0").unwrap();
        assert_eq!(orderer.tls_ca_cert, Some(PathBuf::from("/tls/ca.pem")));
        assert_eq!(
            orderer.hostname_override.as_deref(),
            Some("orderer.example.com")
        );
        assert!(orderer.tls);
        let ca = p.certificate_authority_for("Org1").unwrap();
        assert_eq!(ca.ca_name.as_deref(), Some("ca-org1"));
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = ConnectionProfile::from_yaml_str("bad.yaml", "peers: [unclosed").unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().starts_with("failed to parse connection profile bad.yaml"));
    }

    #[test]
    fn test_parse_url_and_expand_env() {
        let url = parse_url("grpcs://host:7051/", "grpc").unwrap();
        assert_eq!(url.scheme(), "grpcs");
        assert_eq!(host_port(&url).as_deref(), Some("host:7051"));

        let bare = parse_url("peer0.org1.example.com:7051", "grpc").unwrap();
        assert_eq!(bare.scheme(), "grpc");
        assert_eq!(host_port(&bare).as_deref(), Some("peer0.org1.example.com:7051"));

        assert!(parse_url("grpc://host:99999", "grpc").unwrap_err().is_config());

        std::env::set_var("FABRIC_CLI_TEST_ROOT", "/srv/fabric");
        assert_eq!(
            expand_env("${FABRIC_CLI_TEST_ROOT}/crypto"),
            "/srv/fabric/crypto"
        );
        assert_eq!(expand_env("${FABRIC_CLI_TEST_UNSET_VAR}/x"), "/x");
        assert_eq!(expand_env("plain/${unterminated"), "plain/${unterminated");
    }
}
