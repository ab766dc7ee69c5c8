//! Factom JSON-RPC client
//!
//! Heights and chain heads come from factomd. Entries are composed by
//! factom-walletd, which signs the commit with the EC key it holds, and the
//! resulting commit and reveal requests are forwarded to factomd.

use super::{AnchorClient, ChainId, CommitmentId, EcAddress, HeightOracle, LedgerConfig};
use crate::error::{LedgerError, NotaryError};
use crate::types::Digest;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, instrument};

/// Maximum entry payload (content plus ExtIDs with their length prefixes)
pub const MAX_ENTRY_PAYLOAD: usize = 10 * 1024;

/// JSON-RPC error code factomd uses for an unknown chain
const MISSING_CHAIN_HEAD: i64 = -32009;

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct HeightsResult {
    directoryblockheight: u64,
}

#[derive(Debug, Deserialize)]
struct ChainHeadResult {
    #[serde(default)]
    chainhead: String,
    #[serde(default)]
    chaininprocesslist: bool,
}

/// A JSON-RPC request prepared by walletd for factomd
#[derive(Debug, Deserialize)]
struct ForwardedRequest {
    method: String,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct ComposeEntryResult {
    commit: ForwardedRequest,
    reveal: ForwardedRequest,
}

#[derive(Debug, Deserialize)]
struct RevealEntryResult {
    entryhash: String,
}

/// Unwrap a JSON-RPC 2.0 response body into its typed result
fn decode_response<T: DeserializeOwned>(method: &str, body: Value) -> Result<T, LedgerError> {
    let response: RpcResponse = serde_json::from_value(body).map_err(|e| {
        LedgerError::InvalidResponse(format!("{}: not a JSON-RPC response: {}", method, e))
    })?;

    if let Some(error) = response.error {
        let message = match error.data {
            Some(Value::String(data)) => format!("{} ({})", error.message, data),
            _ => error.message,
        };
        return Err(LedgerError::Rpc {
            code: error.code,
            message,
        });
    }

    let result = response
        .result
        .ok_or_else(|| LedgerError::InvalidResponse(format!("{}: missing result", method)))?;
    serde_json::from_value(result)
        .map_err(|e| LedgerError::InvalidResponse(format!("{}: unexpected result: {}", method, e)))
}

/// Size of an entry payload as the ledger counts it
fn entry_payload_size(ext_ids: &[&[u8]], content: &[u8]) -> usize {
    ext_ids.iter().map(|id| 2 + id.len()).sum::<usize>() + content.len()
}

fn map_http_error(error: reqwest::Error, timeout: Duration) -> LedgerError {
    if error.is_timeout() {
        LedgerError::Timeout(timeout)
    } else if error.is_connect() {
        LedgerError::Request(format!("Connection error: {}", error))
    } else if error.is_status() {
        LedgerError::Request(format!("HTTP status error: {}", error))
    } else {
        LedgerError::Request(format!("HTTP error: {}", error))
    }
}

/// Client for factomd and factom-walletd
pub struct FactomClient {
    client: Client,
    factomd_url: String,
    walletd_url: String,
    ec_address: EcAddress,
    chain_id: ChainId,
    request_timeout: Duration,
    next_id: AtomicU64,
}

impl FactomClient {
    /// Build a client from validated ledger configuration
    pub fn new(config: &LedgerConfig) -> Result<Self, NotaryError> {
        let chain_id: ChainId = config.chain_id.parse().map_err(NotaryError::Config)?;
        let ec_address: EcAddress = config.ec_address.parse().map_err(NotaryError::Config)?;
        let request_timeout = Duration::from_secs(config.request_timeout_secs);

        let client = Client::builder()
            .no_proxy()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(request_timeout)
            .build()
            .map_err(|e| NotaryError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            factomd_url: config.factomd_url.clone(),
            walletd_url: config.walletd_url.clone(),
            ec_address,
            chain_id,
            request_timeout,
            next_id: AtomicU64::new(0),
        })
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    async fn call<T: DeserializeOwned>(
        &self,
        url: &str,
        method: &str,
        params: Option<Value>,
    ) -> Result<T, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut request = json!({ "jsonrpc": "2.0", "id": id, "method": method });
        if let Some(params) = params {
            request["params"] = params;
        }

        debug!(url, method, id, "JSON-RPC request");
        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| map_http_error(e, self.request_timeout))?;

        // factomd reports RPC errors with non-2xx statuses, so decode the body first
        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            if status.is_success() {
                LedgerError::InvalidResponse(format!("{}: {}", method, e))
            } else {
                LedgerError::Request(format!("{} returned HTTP {}", method, status))
            }
        })?;
        decode_response(method, body)
    }
}

#[async_trait]
impl HeightOracle for FactomClient {
    async fn current_height(&self) -> Result<u64, LedgerError> {
        let heights: HeightsResult = self.call(&self.factomd_url, "heights", None).await?;
        Ok(heights.directoryblockheight)
    }

    async fn chain_exists(&self, chain_id: &ChainId) -> Result<bool, LedgerError> {
        let params = json!({ "chainid": chain_id.to_string() });
        match self
            .call::<ChainHeadResult>(&self.factomd_url, "chain-head", Some(params))
            .await
        {
            Ok(head) => Ok(!head.chainhead.is_empty() || head.chaininprocesslist),
            Err(LedgerError::Rpc { code, .. }) if code == MISSING_CHAIN_HEAD => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl AnchorClient for FactomClient {
    #[instrument(skip(self, root), fields(chain = %self.chain_id))]
    async fn submit(&self, root: &Digest, label: &str) -> Result<CommitmentId, LedgerError> {
        let size = entry_payload_size(&[label.as_bytes()], root);
        if size > MAX_ENTRY_PAYLOAD {
            return Err(LedgerError::PayloadTooLarge {
                size,
                limit: MAX_ENTRY_PAYLOAD,
            });
        }

        let params = json!({
            "entry": {
                "chainid": self.chain_id.to_string(),
                "extids": [hex::encode(label.as_bytes())],
                "content": hex::encode(root),
            },
            "ecpub": self.ec_address.as_str(),
        });
        let composed: ComposeEntryResult = self
            .call(&self.walletd_url, "compose-entry", Some(params))
            .await?;

        let _: Value = self
            .call(
                &self.factomd_url,
                &composed.commit.method,
                Some(composed.commit.params),
            )
            .await?;
        let revealed: RevealEntryResult = self
            .call(
                &self.factomd_url,
                &composed.reveal.method,
                Some(composed.reveal.params),
            )
            .await?;

        revealed
            .entryhash
            .parse()
            .map_err(LedgerError::InvalidResponse)
    }
}
