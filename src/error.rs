//! Error Handling Module
//!
//! Provides the error taxonomy shared by both adapters.
//! Uses thiserror for domain errors; nothing here retries or suppresses failures.

use thiserror::Error;

use crate::types::Felt;

pub type Result<T> = std::result::Result<T, ClientError>;

/// 어댑터 에러 타입
///
/// # Taxonomy
///
/// - `Uninitialized`: 컨트랙트 핸들 / 서명 계정 없이 호출 (네트워크 호출 전에 실패)
/// - `Transport`: RPC 호출, 트랜잭션 제출, 확인 대기 실패 (그대로 전파)
/// - `Decode`: 반환값의 개수/형식이 ABI와 불일치
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0} not initialized")]
    Uninitialized(&'static str),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Decode error: {0}")]
    Decode(String),
}

/// RPC transport 에러
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Malformed RPC response: {0}")]
    InvalidResponse(String),

    #[error("Transaction {tx_hash} failed: {reason}")]
    TransactionFailed { tx_hash: Felt, reason: String },

    #[error("Account error: {0}")]
    Account(String),
}

impl ClientError {
    /// 안정적인 에러 코드 (로그/상위 레이어 매핑용)
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Uninitialized(_) => "UNINITIALIZED",
            ClientError::Transport(err) => err.code(),
            ClientError::Decode(_) => "DECODE_ERROR",
        }
    }

    pub fn is_uninitialized(&self) -> bool {
        matches!(self, ClientError::Uninitialized(_))
    }
}

impl TransportError {
    pub fn code(&self) -> &'static str {
        match self {
            TransportError::InvalidUrl(_) => "INVALID_URL",
            TransportError::Http(_) => "HTTP_ERROR",
            TransportError::Rpc { .. } => "RPC_ERROR",
            TransportError::InvalidResponse(_) => "INVALID_RESPONSE",
            TransportError::TransactionFailed { .. } => "TRANSACTION_FAILED",
            TransportError::Account(_) => "ACCOUNT_ERROR",
        }
    }
}
