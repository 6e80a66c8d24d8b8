//! Common Types Module
//!
//! 어댑터 전반에서 사용되는 공통 타입 정의
//!
//! 모든 레코드는 원격 호출 결과의 일시적인 projection이며,
//! 실제 상태(잔액, commitment, nullifier, merkle tree)는 컨트랙트가 소유한다.

mod felt;

pub use felt::{join_u256, selector, split_u256, Felt, MAX_SHORT_STRING_LEN};

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use ethers::types::U256;
use serde::{Deserialize, Serialize};

/// Starknet 네트워크
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Sepolia,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Sepolia => "sepolia",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "sepolia" | "testnet" | "test" => Ok(Network::Sepolia),
            other => Err(format!("unknown network: {}", other)),
        }
    }
}

/// 오라클 가격 데이터 (`get_data_median` 결과)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// 가격 (`decimals` 자리 고정소수점)
    pub price: U256,
    pub decimals: u32,
    /// 마지막 업데이트 (unix seconds)
    pub last_updated: U256,
    /// 집계된 소스 수
    pub num_sources: u32,
}

impl PriceRecord {
    /// 업데이트 시각 (i64 범위를 넘으면 None)
    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        if self.last_updated.bits() > 63 {
            return None;
        }
        DateTime::from_timestamp(self.last_updated.low_u64() as i64, 0)
    }

    /// 사람이 읽기 쉬운 형태로 변환
    ///
    /// price = 6500012345678, decimals = 8 → "65000.12345678"
    pub fn formatted(&self) -> String {
        if self.decimals == 0 || self.decimals > 76 {
            return self.price.to_string();
        }
        let scale = U256::exp10(self.decimals as usize);
        let whole = self.price / scale;
        let frac = self.price % scale;
        format!(
            "{}.{:0>width$}",
            whole,
            frac.to_string(),
            width = self.decimals as usize
        )
    }
}

/// 집계 Health Factor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthFactor {
    pub collateral: U256,
    pub debt: U256,
    pub health: U256,
}

/// Vault 통계 스냅샷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultStats {
    pub merkle_root: Felt,
    pub commitment_count: u64,
    pub total_deposited: U256,
    pub total_borrowed: U256,
    pub health_factor: HealthFactor,
}

/// 트랜잭션 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutcome {
    pub tx_hash: Felt,
}

/// Deposit 결과
///
/// `commitment == Felt::ZERO` 는 "Deposited 이벤트 없음"을 의미하며
/// 0 값 commitment가 아님
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositOutcome {
    pub commitment: Felt,
    pub tx_hash: Felt,
}

impl DepositOutcome {
    /// 영수증에서 commitment를 찾았는지 여부
    pub fn commitment_found(&self) -> bool {
        !self.commitment.is_zero()
    }
}
