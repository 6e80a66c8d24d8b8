//! Services Module
//!
//! 온체인 컨트랙트와의 상호작용을 담당하는 어댑터 레이어
//!
//! # Services
//! - `PragmaOracle`: 가격 피드 조회
//! - `VaultClient`: private lending vault 호출
//! - `JsonRpcProvider`: Starknet JSON-RPC transport
//! - `Deployments`: 네트워크별 배포 주소 테이블

pub mod abi;
mod account;
mod deployments;
mod price_oracle;
mod provider;
mod vault;

#[cfg(test)]
pub(crate) mod mock;

pub use abi::VaultEvent;
pub use account::Account;
pub use deployments::{
    Deployments, NetworkDeployment, MAINNET_RPC_URL, ORACLE_CONTRACT, SEPOLIA_RPC_URL,
    VAULT_CONTRACT,
};
pub use price_oracle::{PragmaOracle, BTC_USD, ETH_USD, PRAGMA_ORACLE_ADDRESS, USDC_USD};
pub use provider::{
    Call, Event, ExecutionStatus, FinalityStatus, JsonRpcProvider, StarknetProvider,
    TransactionReceipt,
};
pub use vault::{VaultClient, VaultConfig};
