//! # JSON-RPC Shapes
//!
//! Request and response types for the node's atomic API, served at
//! `/ext/bc/C/avax`, plus the one EVM call the builder needs, served at
//! `/ext/bc/C/rpc`. This module only builds and reads JSON; moving it over
//! HTTP is the job of whatever implements the traits in [`crate::client`].
//!
//! ## Method Index
//!
//! | Method             | Description                                      |
//! |--------------------|--------------------------------------------------|
//! | `avax.getUTXOs`    | Shared-memory UTXOs owned by addresses           |
//! | `avax.issueTx`     | Submit a signed atomic transaction               |
//! | `avax.getTxStatus` | Status of a submitted transaction                |
//! | `eth_baseFee`      | Current C-Chain base fee in wei (EVM endpoint)   |
//!
//! Request IDs come from the [`RpcRequestFactory`] that built the request,
//! so two clients in one process never share a counter.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transaction::types::{TxStatus, Utxo};
use crate::utxo::parse_utxos;

/// Path of the atomic API relative to the node's base URL.
pub const AVAX_ENDPOINT: &str = "/ext/bc/C/avax";

/// Path of the C-Chain EVM API relative to the node's base URL.
pub const EVM_ENDPOINT: &str = "/ext/bc/C/rpc";

// ---------------------------------------------------------------------------
// RPC Method Enumeration
// ---------------------------------------------------------------------------

/// Supported JSON-RPC methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpcMethod {
    /// Parameters: [`GetUtxosParams`].
    #[serde(rename = "avax.getUTXOs")]
    GetUtxos,
    /// Parameters: [`IssueTxParams`].
    #[serde(rename = "avax.issueTx")]
    IssueTx,
    /// Parameters: [`GetTxStatusParams`].
    #[serde(rename = "avax.getTxStatus")]
    GetTxStatus,
    /// No parameters.
    #[serde(rename = "eth_baseFee")]
    BaseFee,
}

impl RpcMethod {
    /// Path, relative to the node's base URL, that serves this method.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::GetUtxos | Self::IssueTx | Self::GetTxStatus => AVAX_ENDPOINT,
            Self::BaseFee => EVM_ENDPOINT,
        }
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Parameters of `avax.getUTXOs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUtxosParams {
    /// Bech32 addresses with a chain prefix, e.g. `C-fuji1...`.
    pub addresses: Vec<String>,
    /// Chain alias or ID the UTXOs were exported from, e.g. `"P"`.
    pub source_chain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Always `"hex"`; the parser in [`crate::utxo`] reads nothing else.
    pub encoding: String,
}

/// Parameters of `avax.issueTx`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueTxParams {
    /// `0x`-prefixed hex of the signed transaction.
    pub tx: String,
    pub encoding: String,
}

/// Parameters of `avax.getTxStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetTxStatusParams {
    /// CB58 transaction ID.
    #[serde(rename = "txID")]
    pub tx_id: String,
}

// ---------------------------------------------------------------------------
// RPC Request / Response
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version. Always "2.0".
    pub jsonrpc: String,
    /// Request identifier. Echoed back in the response.
    pub id: serde_json::Value,
    pub method: RpcMethod,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl RpcRequest {
    pub fn new(id: serde_json::Value, method: RpcMethod, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method,
            params,
        }
    }
}

/// A JSON-RPC 2.0 response.
///
/// Exactly one of `result` or `error` should be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    /// Creates a successful response.
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Creates an error response.
    pub fn error(id: serde_json::Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Parses a raw response body.
    pub fn from_json(body: &str) -> Result<Self, ResponseError> {
        serde_json::from_str(body).map_err(|e| ResponseError::Malformed(e.to_string()))
    }

    /// The `result` member, or the node's error.
    pub fn into_result(self) -> Result<serde_json::Value, ResponseError> {
        match (self.error, self.result) {
            (Some(error), _) => Err(ResponseError::Rpc(error)),
            (None, Some(result)) => Ok(result),
            (None, None) => Err(ResponseError::Malformed("response has neither result nor error".to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// RPC Errors
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 error object as returned by the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("rpc error {code}: {message}")]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Invalid method parameters.
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::new(-32602, msg)
    }

    /// Internal server error.
    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::new(-32603, msg)
    }
}

/// Why a response could not be turned into a typed result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResponseError {
    /// The node answered with an error object.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The body was not the JSON we expected.
    #[error("malformed response: {0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Typed Response Payloads
// ---------------------------------------------------------------------------

/// Result of `avax.getUTXOs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUtxosResult {
    /// Decimal string, as the node sends it.
    #[serde(default)]
    pub num_fetched: Option<String>,
    /// Hex-encoded UTXOs.
    #[serde(default)]
    pub utxos: Vec<String>,
    /// Pagination cursor; opaque to us.
    #[serde(default)]
    pub end_index: Option<serde_json::Value>,
}

/// Result of `avax.issueTx`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueTxResult {
    /// CB58 transaction ID.
    #[serde(rename = "txID")]
    pub tx_id: String,
}

/// Result of `avax.getTxStatus`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxStatusResult {
    #[serde(default)]
    pub status: Option<String>,
}

fn typed_result<T: serde::de::DeserializeOwned>(response: RpcResponse) -> Result<T, ResponseError> {
    let value = response.into_result()?;
    serde_json::from_value(value).map_err(|e| ResponseError::Malformed(e.to_string()))
}

/// Spendable UTXOs from an `avax.getUTXOs` response. Entries the parser
/// can't use are skipped with a warning.
pub fn parse_utxos_response(response: RpcResponse) -> Result<Vec<Utxo>, ResponseError> {
    let result: GetUtxosResult = typed_result(response)?;
    Ok(parse_utxos(&result.utxos))
}

/// CB58 transaction ID from an `avax.issueTx` response.
pub fn parse_issue_tx_response(response: RpcResponse) -> Result<String, ResponseError> {
    let result: IssueTxResult = typed_result(response)?;
    Ok(result.tx_id)
}

/// Status from an `avax.getTxStatus` response. A missing or unfamiliar
/// status reads as [`TxStatus::Unknown`].
pub fn parse_tx_status_response(response: RpcResponse) -> Result<TxStatus, ResponseError> {
    let result: TxStatusResult = typed_result(response)?;
    Ok(result
        .status
        .and_then(|s| s.parse().ok())
        .unwrap_or(TxStatus::Unknown))
}

/// Base fee in wei from an `eth_baseFee` response (`0x`-prefixed quantity).
pub fn parse_base_fee_response(response: RpcResponse) -> Result<u128, ResponseError> {
    let quantity: String = typed_result(response)?;
    let digits = quantity
        .strip_prefix("0x")
        .ok_or_else(|| ResponseError::Malformed(format!("base fee {:?} is not a hex quantity", quantity)))?;
    u128::from_str_radix(digits, 16)
        .map_err(|e| ResponseError::Malformed(format!("base fee {:?}: {}", quantity, e)))
}

// ---------------------------------------------------------------------------
// Request Factory
// ---------------------------------------------------------------------------

/// Builds requests with increasing IDs, starting at 1.
#[derive(Debug)]
pub struct RpcRequestFactory {
    next_id: AtomicU64,
}

impl Default for RpcRequestFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcRequestFactory {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }

    fn request<P: Serialize>(&self, method: RpcMethod, params: &P) -> RpcRequest {
        // Plain structs of strings; serialization cannot fail.
        let params = serde_json::to_value(params).unwrap_or(serde_json::Value::Null);
        self.request_with(method, params)
    }

    fn request_with(&self, method: RpcMethod, params: serde_json::Value) -> RpcRequest {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        RpcRequest::new(serde_json::json!(id), method, params)
    }

    /// `avax.getUTXOs` for `addresses`, hex encoding.
    pub fn get_utxos(&self, addresses: &[String], source_chain: &str) -> RpcRequest {
        self.request(
            RpcMethod::GetUtxos,
            &GetUtxosParams {
                addresses: addresses.to_vec(),
                source_chain: source_chain.to_string(),
                limit: None,
                encoding: "hex".to_string(),
            },
        )
    }

    /// `avax.issueTx` carrying `signed_tx` as `0x` hex.
    pub fn issue_tx(&self, signed_tx: &[u8]) -> RpcRequest {
        self.request(
            RpcMethod::IssueTx,
            &IssueTxParams {
                tx: format!("0x{}", hex::encode(signed_tx)),
                encoding: "hex".to_string(),
            },
        )
    }

    /// `avax.getTxStatus` for a CB58 transaction ID.
    pub fn get_tx_status(&self, tx_id: &str) -> RpcRequest {
        self.request(
            RpcMethod::GetTxStatus,
            &GetTxStatusParams {
                tx_id: tx_id.to_string(),
            },
        )
    }

    /// `eth_baseFee`, empty positional params.
    pub fn base_fee(&self) -> RpcRequest {
        self.request_with(RpcMethod::BaseFee, serde_json::json!([]))
    }
}
