//! Signing Identity
//!
//! 트랜잭션을 서명/제출하는 계정 추상화.
//! 서명 로직(STARK curve ECDSA, nonce, fee 추정)은 외부 구현이 담당한다.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::services::provider::Call;
use crate::types::Felt;

/// 서명 계정 (opaque credential)
///
/// `VaultClient::set_account`로 연결되며, 연결되지 않은 상태에서는
/// 모든 mutating 호출이 `Uninitialized`로 실패한다.
#[async_trait]
pub trait Account: Send + Sync {
    /// 계정 컨트랙트 주소
    fn address(&self) -> Felt;

    /// multicall invoke 제출, 트랜잭션 해시 반환
    ///
    /// 제출만 하며 확인(finality)은 기다리지 않는다.
    async fn execute(&self, calls: &[Call]) -> Result<Felt, TransportError>;
}
