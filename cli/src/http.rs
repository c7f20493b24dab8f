//! JSON-RPC transport over HTTP(S), backed by `reqwest`.
//!
//! Each request is POSTed to the node's base URL joined with the path of
//! the API serving its method, so one transport covers both the atomic API
//! and the EVM API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use atomix_protocol::client::{ClientError, RpcTransport};
use atomix_protocol::rpc::{RpcMethod, RpcRequest, RpcResponse};

/// Per-request timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`RpcTransport`] over a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base: Url,
}

impl HttpTransport {
    /// Creates a transport for the node at `base_url` (`http` or `https`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base = Url::parse(base_url)
            .map_err(|e| ClientError::Transport(format!("invalid node URL {:?}: {}", base_url, e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ClientError::Transport(format!(
                "unsupported scheme {:?} in {:?}",
                base.scheme(),
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self { client, base })
    }

    /// Full URL serving `method`. Any path and query on the base URL are kept.
    pub fn endpoint_url(&self, method: RpcMethod) -> Url {
        let mut url = self.base.clone();
        let path = format!("{}{}", self.base.path().trim_end_matches('/'), method.endpoint());
        url.set_path(&path);
        url
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(&self, request: RpcRequest) -> Result<RpcResponse, ClientError> {
        let url = self.endpoint_url(request.method);
        let response = self
            .client
            .post(url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("{}: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(format!("{}: {}", url, e)))?;

        if !status.is_success() {
            // Some gateways wrap a JSON-RPC error in a non-2xx status.
            if let Ok(parsed) = RpcResponse::from_json(&body) {
                if parsed.error.is_some() {
                    return Ok(parsed);
                }
            }
            return Err(ClientError::Transport(format!("HTTP {}: {}", status, body.trim())));
        }
        Ok(RpcResponse::from_json(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atomix_protocol::client::{BaseFeeSource, RpcClient, TxSubmitter};
    use atomix_protocol::transaction::TxStatus;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn endpoint_urls_keep_base_path_and_query() {
        let t = HttpTransport::new("http://127.0.0.1:9650", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(t.endpoint_url(RpcMethod::IssueTx).as_str(), "http://127.0.0.1:9650/ext/bc/C/avax");
        assert_eq!(t.endpoint_url(RpcMethod::BaseFee).as_str(), "http://127.0.0.1:9650/ext/bc/C/rpc");

        let t = HttpTransport::new("https://api.avax-test.network", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            t.endpoint_url(RpcMethod::GetUtxos).as_str(),
            "https://api.avax-test.network/ext/bc/C/avax"
        );

        let t = HttpTransport::new("http://node.local:9650/prefix/?token=x", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            t.endpoint_url(RpcMethod::BaseFee).as_str(),
            "http://node.local:9650/prefix/ext/bc/C/rpc?token=x"
        );
    }

    #[test]
    fn rejects_unusable_urls() {
        assert!(HttpTransport::new("ftp://node.local", DEFAULT_TIMEOUT).is_err());
        assert!(HttpTransport::new("not a url", DEFAULT_TIMEOUT).is_err());
        assert!(HttpTransport::new("http://host:notaport", DEFAULT_TIMEOUT).is_err());
    }

    #[tokio::test]
    async fn posts_json_to_the_method_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let status = server
            .mock("POST", "/ext/bc/C/avax")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(json!({
                "jsonrpc": "2.0",
                "method": "avax.getTxStatus",
                "params": {"txID": "abc"}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":{"status":"Processing"}}"#)
            .create_async()
            .await;
        let base_fee = server
            .mock("POST", "/ext/bc/C/rpc")
            .match_body(Matcher::PartialJson(json!({"method": "eth_baseFee", "params": []})))
            .with_status(200)
            .with_body(r#"{"jsonrpc":"2.0","id":2,"result":"0x5d21dba00"}"#)
            .create_async()
            .await;

        let client = RpcClient::new(HttpTransport::new(&server.url(), DEFAULT_TIMEOUT).unwrap());
        assert_eq!(client.tx_status("abc").await.unwrap(), TxStatus::Processing);
        assert_eq!(client.base_fee().await.unwrap(), 25_000_000_000);

        status.assert_async().await;
        base_fee.assert_async().await;
    }

    #[tokio::test]
    async fn http_errors_become_transport_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/ext/bc/C/avax")
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let client = RpcClient::new(HttpTransport::new(&server.url(), DEFAULT_TIMEOUT).unwrap());
        match client.issue_tx(&[1, 2]).await {
            Err(ClientError::Transport(msg)) => assert!(msg.contains("503"), "{}", msg),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn rpc_errors_behind_an_error_status_are_kept() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/ext/bc/C/avax")
            .with_status(500)
            .with_body(r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"tx already issued"}}"#)
            .create_async()
            .await;

        let client = RpcClient::new(HttpTransport::new(&server.url(), DEFAULT_TIMEOUT).unwrap());
        match client.issue_tx(&[1, 2]).await {
            Err(ClientError::Rpc(err)) => assert_eq!(err.code, -32000),
            other => panic!("expected rpc error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn silent_node_times_out() {
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            // Accept and hold the connection without answering.
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let transport = HttpTransport::new(&format!("http://127.0.0.1:{}", port), Duration::from_millis(200)).unwrap();
        let client = RpcClient::new(transport);
        let outcome = tokio::time::timeout(Duration::from_secs(3), client.tx_status("abc")).await;
        assert!(matches!(outcome, Ok(Err(ClientError::Transport(_)))), "{:?}", outcome);

        server.abort();
    }
}
