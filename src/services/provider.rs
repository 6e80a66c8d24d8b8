//! Starknet RPC Provider
//!
//! Handles JSON-RPC interactions with a Starknet node.
//!
//! # Features
//! - Read-only contract calls (`starknet_call`)
//! - Transaction finality polling (`starknet_getTransactionStatus`)
//! - Receipt / event retrieval (`starknet_getTransactionReceipt`)

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::TransportError;
use crate::types::{selector, Felt};

/// `TXN_HASH_NOT_FOUND` (아직 노드에 전파되지 않은 트랜잭션)
const TXN_HASH_NOT_FOUND: i64 = 29;

/// 컨트랙트 호출 (read call과 invoke call 공용)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    #[serde(rename = "contract_address")]
    pub to: Felt,
    #[serde(rename = "entry_point_selector")]
    pub selector: Felt,
    pub calldata: Vec<Felt>,
}

impl Call {
    pub fn new(to: Felt, entry_point: &str, calldata: Vec<Felt>) -> Self {
        Self {
            to,
            selector: selector(entry_point),
            calldata,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    #[serde(rename = "SUCCEEDED")]
    Succeeded,
    #[serde(rename = "REVERTED")]
    Reverted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalityStatus {
    #[serde(rename = "RECEIVED")]
    Received,
    #[serde(rename = "REJECTED")]
    Rejected,
    #[serde(rename = "ACCEPTED_ON_L2")]
    AcceptedOnL2,
    #[serde(rename = "ACCEPTED_ON_L1")]
    AcceptedOnL1,
}

/// 컨트랙트가 emit한 이벤트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub from_address: Felt,
    pub keys: Vec<Felt>,
    pub data: Vec<Felt>,
}

/// 트랜잭션 영수증
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_hash: Felt,
    pub execution_status: ExecutionStatus,
    pub finality_status: FinalityStatus,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revert_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionStatus {
    finality_status: FinalityStatus,
    #[serde(default)]
    execution_status: Option<ExecutionStatus>,
    #[serde(default)]
    failure_reason: Option<String>,
}

/// 원격 procedure transport
///
/// 재시도 없음: 실패는 그대로 호출자에게 전파된다.
#[async_trait]
pub trait StarknetProvider: Send + Sync {
    /// Read-only 호출
    async fn call(&self, call: &Call) -> Result<Vec<Felt>, TransportError>;

    /// 트랜잭션이 L2에서 accept될 때까지 대기
    async fn wait_for_transaction(&self, tx_hash: Felt) -> Result<(), TransportError>;

    /// 트랜잭션 영수증 조회
    async fn get_transaction_receipt(
        &self,
        tx_hash: Felt,
    ) -> Result<TransactionReceipt, TransportError>;
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC over HTTPS provider
///
/// # Example
/// ```ignore
/// let provider = JsonRpcProvider::new("https://starknet-sepolia.public.blastapi.io/rpc/v0_7")?;
/// let result = provider.call(&Call::new(oracle, "get_data_median", vec![pair])).await?;
/// ```
pub struct JsonRpcProvider {
    url: reqwest::Url,
    http: reqwest::Client,
    next_id: AtomicU64,
    poll_interval: Duration,
}

impl JsonRpcProvider {
    /// 확인 대기 polling 간격 기본값
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

    pub fn new(rpc_url: &str) -> Result<Self, TransportError> {
        let url = reqwest::Url::parse(rpc_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", rpc_url, e)))?;

        Ok(Self {
            url,
            http: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(method, id, "JSON-RPC request");

        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        let bytes = self
            .http
            .post(self.url.clone())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let response: RpcResponse<T> = serde_json::from_slice(&bytes)
            .map_err(|e| TransportError::InvalidResponse(format!("{}: {}", method, e)))?;

        if let Some(error) = response.error {
            tracing::debug!(method, id, code = error.code, "JSON-RPC error");
            return Err(TransportError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        response
            .result
            .ok_or_else(|| TransportError::InvalidResponse(format!("{}: missing result", method)))
    }
}

#[async_trait]
impl StarknetProvider for JsonRpcProvider {
    async fn call(&self, call: &Call) -> Result<Vec<Felt>, TransportError> {
        self.request(
            "starknet_call",
            json!({ "request": call, "block_id": "pending" }),
        )
        .await
    }

    async fn wait_for_transaction(&self, tx_hash: Felt) -> Result<(), TransportError> {
        loop {
            let status = self
                .request::<TransactionStatus>(
                    "starknet_getTransactionStatus",
                    json!({ "transaction_hash": tx_hash }),
                )
                .await;

            match status {
                Ok(status) => {
                    if status.execution_status == Some(ExecutionStatus::Reverted) {
                        return Err(TransportError::TransactionFailed {
                            tx_hash,
                            reason: status
                                .failure_reason
                                .unwrap_or_else(|| "REVERTED".to_string()),
                        });
                    }
                    match status.finality_status {
                        FinalityStatus::AcceptedOnL2 | FinalityStatus::AcceptedOnL1 => {
                            tracing::debug!(%tx_hash, "transaction accepted");
                            return Ok(());
                        }
                        FinalityStatus::Rejected => {
                            return Err(TransportError::TransactionFailed {
                                tx_hash,
                                reason: status
                                    .failure_reason
                                    .unwrap_or_else(|| "REJECTED".to_string()),
                            });
                        }
                        FinalityStatus::Received => {}
                    }
                }
                Err(TransportError::Rpc { code, .. }) if code == TXN_HASH_NOT_FOUND => {}
                Err(e) => return Err(e),
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn get_transaction_receipt(
        &self,
        tx_hash: Felt,
    ) -> Result<TransactionReceipt, TransportError> {
        self.request(
            "starknet_getTransactionReceipt",
            json!({ "transaction_hash": tx_hash }),
        )
        .await
    }
}
