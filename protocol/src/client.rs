//! # Collaborator Traits
//!
//! The library does no I/O. UTXO lookup, base-fee lookup and transaction
//! submission are traits implemented by the caller, async because every real
//! implementation talks to a node.
//!
//! [`RpcClient`] implements all three on top of a bare [`RpcTransport`] (send a
//! request, get a response back), so an HTTP client only needs to move JSON
//! to plug in. Tests use in-memory implementations.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::rpc::{
    parse_base_fee_response, parse_issue_tx_response, parse_tx_status_response, parse_utxos_response, ResponseError, RpcError, RpcRequest,
    RpcRequestFactory, RpcResponse,
};
use crate::transaction::types::{TxStatus, Utxo};

/// Errors from a collaborator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// The request never got an answer (connection, timeout, HTTP status).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error.
    #[error(transparent)]
    Rpc(RpcError),

    /// The node answered with something we couldn't read.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<ResponseError> for ClientError {
    fn from(e: ResponseError) -> Self {
        match e {
            ResponseError::Rpc(rpc) => Self::Rpc(rpc),
            ResponseError::Malformed(msg) => Self::Malformed(msg),
        }
    }
}

/// Looks up spendable UTXOs in shared memory.
#[async_trait]
pub trait UtxoSource: Send + Sync {
    /// UTXOs exported from `source_chain` to any of `addresses`.
    async fn get_utxos(&self, addresses: &[String], source_chain: &str) -> Result<Vec<Utxo>, ClientError>;
}

/// Submits signed transactions and reports their status.
#[async_trait]
pub trait TxSubmitter: Send + Sync {
    /// Issues signed bytes and returns the CB58 transaction ID the node
    /// assigned.
    async fn issue_tx(&self, signed_tx: &[u8]) -> Result<String, ClientError>;

    async fn tx_status(&self, tx_id: &str) -> Result<TxStatus, ClientError>;
}

/// Reports the chain's current base fee.
#[async_trait]
pub trait BaseFeeSource: Send + Sync {
    /// Base fee in wei, the unit the import builder takes.
    async fn base_fee(&self) -> Result<u128, ClientError>;
}

/// Moves one JSON-RPC request to the endpoint serving its method and back.
/// See [`crate::rpc::RpcMethod::endpoint`].
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, request: RpcRequest) -> Result<RpcResponse, ClientError>;
}

/// [`UtxoSource`], [`TxSubmitter`] and [`BaseFeeSource`] over any
/// [`RpcTransport`].
#[derive(Debug)]
pub struct RpcClient<T> {
    transport: T,
    requests: RpcRequestFactory,
}

impl<T: RpcTransport> RpcClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            requests: RpcRequestFactory::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn send(&self, request: RpcRequest) -> Result<RpcResponse, ClientError> {
        debug!(method = ?request.method, id = %request.id, "rpc call");
        self.transport.call(request).await
    }
}

#[async_trait]
impl<T: RpcTransport> UtxoSource for RpcClient<T> {
    async fn get_utxos(&self, addresses: &[String], source_chain: &str) -> Result<Vec<Utxo>, ClientError> {
        let response = self.send(self.requests.get_utxos(addresses, source_chain)).await?;
        Ok(parse_utxos_response(response)?)
    }
}

#[async_trait]
impl<T: RpcTransport> TxSubmitter for RpcClient<T> {
    async fn issue_tx(&self, signed_tx: &[u8]) -> Result<String, ClientError> {
        let response = self.send(self.requests.issue_tx(signed_tx)).await?;
        Ok(parse_issue_tx_response(response)?)
    }

    async fn tx_status(&self, tx_id: &str) -> Result<TxStatus, ClientError> {
        let response = self.send(self.requests.get_tx_status(tx_id)).await?;
        Ok(parse_tx_status_response(response)?)
    }
}

#[async_trait]
impl<T: RpcTransport> BaseFeeSource for RpcClient<T> {
    async fn base_fee(&self) -> Result<u128, ClientError> {
        let response = self.send(self.requests.base_fee()).await?;
        Ok(parse_base_fee_response(response)?)
    }
}
