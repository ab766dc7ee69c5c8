//! Ledger collaborators: the height oracle that paces cycles and the anchor
//! client that publishes root digests.
//!
//! The scheduler only sees the two traits. `factom` implements both against
//! factomd and factom-walletd JSON-RPC endpoints.

use crate::error::LedgerError;
use crate::types::{digest_hex, parse_digest_hex, Digest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod factom;

pub use factom::FactomClient;

/// Source of the monotonically increasing state-advance counter
#[async_trait]
pub trait HeightOracle: Send + Sync {
    /// Current height of the ledger
    async fn current_height(&self) -> Result<u64, LedgerError>;

    /// Whether the anchor chain has been created on the ledger
    async fn chain_exists(&self, chain_id: &ChainId) -> Result<bool, LedgerError>;
}

/// Publishes a root digest and returns the ledger's handle for it
#[async_trait]
pub trait AnchorClient: Send + Sync {
    async fn submit(&self, root: &Digest, label: &str) -> Result<CommitmentId, LedgerError>;
}

/// 32-byte chain identifier, written as 64 hex characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(Digest);

impl ChainId {
    pub fn as_bytes(&self) -> &Digest {
        &self.0
    }
}

impl FromStr for ChainId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_digest_hex(&s.to_ascii_lowercase())
            .map(ChainId)
            .ok_or_else(|| format!("chain id must be 64 hex characters, got {:?}", s))
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&digest_hex(&self.0))
    }
}

const EC_ADDRESS_LEN: usize = 52;
const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Public entry-credit address that pays for submissions.
///
/// Only the public half is held here; signing happens inside factom-walletd.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcAddress(String);

impl EcAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for EcAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("Es") {
            return Err(
                "expected a public EC address, got a private Es key; keep it in factom-walletd"
                    .to_string(),
            );
        }
        if !s.starts_with("EC") {
            return Err(format!("EC address must start with \"EC\", got {:?}", s));
        }
        if s.len() != EC_ADDRESS_LEN {
            return Err(format!(
                "EC address must be {} characters, got {}",
                EC_ADDRESS_LEN,
                s.len()
            ));
        }
        if let Some(c) = s.chars().find(|c| !BASE58_ALPHABET.contains(*c)) {
            return Err(format!("EC address contains invalid character {:?}", c));
        }
        Ok(EcAddress(s.to_string()))
    }
}

impl fmt::Display for EcAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of a published anchor (the ledger's entry hash)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitmentId(Digest);

impl CommitmentId {
    pub fn new(digest: Digest) -> Self {
        Self(digest)
    }

    pub fn as_bytes(&self) -> &Digest {
        &self.0
    }
}

impl FromStr for CommitmentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_digest_hex(s)
            .map(CommitmentId)
            .ok_or_else(|| format!("commitment id must be 64 lowercase hex characters, got {:?}", s))
    }
}

impl fmt::Display for CommitmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&digest_hex(&self.0))
    }
}

/// Ledger endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// factomd JSON-RPC endpoint
    #[serde(default = "default_factomd_url")]
    pub factomd_url: String,

    /// factom-walletd JSON-RPC endpoint (holds the EC private key)
    #[serde(default = "default_walletd_url")]
    pub walletd_url: String,

    /// Entry-credit public address paying for entries
    #[serde(default)]
    pub ec_address: String,

    /// Chain receiving snapshot entries
    #[serde(default = "default_chain_id")]
    pub chain_id: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

pub(crate) fn default_factomd_url() -> String {
    "http://localhost:8088/v2".to_string()
}

pub(crate) fn default_walletd_url() -> String {
    "http://localhost:8089/v2".to_string()
}

pub(crate) fn default_chain_id() -> String {
    "d3bf4593aeeb46fc60b83c0b064e4bf7654a704d8a4583dd4a39bf04f4c35344".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            factomd_url: default_factomd_url(),
            walletd_url: default_walletd_url(),
            ec_address: String::new(),
            chain_id: default_chain_id(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl LedgerConfig {
    /// Validate ledger configuration
    pub fn validate(&self) -> Result<(), String> {
        for (name, url) in [
            ("factomd_url", &self.factomd_url),
            ("walletd_url", &self.walletd_url),
        ] {
            let parsed = reqwest::Url::parse(url)
                .map_err(|e| format!("{} {:?} is not a valid URL: {}", name, url, e))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(format!("{} must use http or https", name));
            }
        }
        self.chain_id.parse::<ChainId>()?;
        self.ec_address.parse::<EcAddress>()?;
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err("Ledger timeouts must be greater than zero".to_string());
        }
        Ok(())
    }
}
