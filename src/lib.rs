//! VestaZK Starknet Client Library
//!
//! # Overview
//!
//! VestaZK 프라이빗 렌딩 vault와 Pragma 가격 오라클을 위한
//! Starknet 클라이언트 어댑터.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      Application                         │
//! └───────────────┬─────────────────────────┬───────────────┘
//!                 │                         │
//!                 ▼                         ▼
//!        ┌────────────────┐        ┌────────────────┐
//!        │  PragmaOracle  │        │  VaultClient   │──── Account
//!        └───────┬────────┘        └───────┬────────┘   (signer)
//!                │                         │
//!                └────────────┬────────────┘
//!                             ▼
//!                  ┌────────────────────┐
//!                  │ StarknetProvider   │  starknet_call
//!                  │ (JSON-RPC v0_7)    │  getTransactionStatus
//!                  └─────────┬──────────┘  getTransactionReceipt
//!                            ▼
//!                  ┌────────────────────┐
//!                  │  Starknet Contracts│
//!                  │  Oracle   Vault    │
//!                  └────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: 환경 설정 관리 (`vestazk-status` 바이너리)
//! - `error`: 에러 타입 및 처리
//! - `services`: 오라클 / vault 어댑터, RPC transport, ABI 인코딩
//! - `types`: felt, 네트워크, 결과 레코드
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vestazk_client::{Deployments, Network, PragmaOracle, VaultClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let oracle = PragmaOracle::new(Network::Sepolia)?;
//!     let btc = oracle.get_btc_price().await?;
//!
//!     let vault = VaultClient::for_network(Network::Sepolia, &Deployments::builtin()?)?;
//!     let stats = vault.get_vault_stats().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod services;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use error::{ClientError, Result, TransportError};
pub use services::{
    Account, Call, Deployments, JsonRpcProvider, PragmaOracle, StarknetProvider, VaultClient,
    VaultConfig, VaultEvent,
};
pub use types::{
    DepositOutcome, Felt, HealthFactor, Network, PriceRecord, TxOutcome, VaultStats,
};
