//! Deployment Address Table
//!
//! (network, contract name) → 배포된 컨트랙트 주소
//!
//! 기본 테이블은 `deployments.json`에서 빌드 시 임베드되며,
//! 다른 배포 환경은 JSON으로 교체 가능하다.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::types::{Felt, Network};

/// Sepolia 공개 RPC (rpc_url이 비어 있을 때 fallback)
pub const SEPOLIA_RPC_URL: &str = "https://starknet-sepolia.public.blastapi.io/rpc/v0_7";

/// Mainnet 공개 RPC
pub const MAINNET_RPC_URL: &str =
    "https://starknet-mainnet.g.alchemy.com/starknet/version/rpc/v0_7";

/// Vault 컨트랙트 이름
pub const VAULT_CONTRACT: &str = "VesuVault";

/// 오라클 컨트랙트 이름
pub const ORACLE_CONTRACT: &str = "PragmaOracle";

const BUILTIN_DEPLOYMENTS: &str = include_str!("../../deployments.json");

/// 네트워크별 배포 정보
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDeployment {
    #[serde(default)]
    pub rpc_url: String,
    #[serde(default)]
    pub contracts: HashMap<String, Felt>,
}

/// 배포 주소 테이블
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deployments {
    networks: HashMap<Network, NetworkDeployment>,
}

impl Deployments {
    /// 임베드된 기본 테이블
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_DEPLOYMENTS)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ClientError::Decode(format!("invalid deployments table: {}", e)))
    }

    /// 네트워크 RPC URL
    ///
    /// 테이블에 없거나 비어 있으면 Sepolia 공개 RPC
    pub fn rpc_url(&self, network: Network) -> &str {
        self.networks
            .get(&network)
            .map(|d| d.rpc_url.as_str())
            .filter(|url| !url.is_empty())
            .unwrap_or(SEPOLIA_RPC_URL)
    }

    /// 컨트랙트 주소 조회
    pub fn contract_address(&self, network: Network, name: &str) -> Option<Felt> {
        self.networks
            .get(&network)
            .and_then(|d| d.contracts.get(name))
            .copied()
    }

    /// RPC URL 교체
    pub fn set_rpc_url(&mut self, network: Network, rpc_url: &str) {
        self.networks.entry(network).or_default().rpc_url = rpc_url.to_string();
    }

    /// 테이블 항목 추가/교체
    pub fn set_contract_address(&mut self, network: Network, name: &str, address: Felt) {
        self.networks
            .entry(network)
            .or_default()
            .contracts
            .insert(name.to_string(), address);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let table = Deployments::builtin().unwrap();
        assert_eq!(table.rpc_url(Network::Sepolia), SEPOLIA_RPC_URL);
        assert_eq!(table.rpc_url(Network::Mainnet), MAINNET_RPC_URL);
        assert!(table.contract_address(Network::Sepolia, ORACLE_CONTRACT).is_some());
    }

    #[test]
    fn test_missing_contract() {
        let table = Deployments::builtin().unwrap();
        assert_eq!(table.contract_address(Network::Mainnet, "NoSuchContract"), None);
    }

    #[test]
    fn test_rpc_url_fallback() {
        let table = Deployments::from_json(r#"{ "mainnet": { "rpc_url": "" } }"#).unwrap();
        assert_eq!(table.rpc_url(Network::Mainnet), SEPOLIA_RPC_URL);
        assert_eq!(table.rpc_url(Network::Sepolia), SEPOLIA_RPC_URL);
    }

    #[test]
    fn test_custom_table() {
        let json = r#"{
            "sepolia": {
                "rpc_url": "http://localhost:5050/rpc",
                "contracts": { "VesuVault": "0x1234" }
            }
        }"#;
        let table = Deployments::from_json(json).unwrap();
        assert_eq!(table.rpc_url(Network::Sepolia), "http://localhost:5050/rpc");
        assert_eq!(
            table.contract_address(Network::Sepolia, VAULT_CONTRACT),
            Some(Felt::from(0x1234u64))
        );
    }

    #[test]
    fn test_set_contract_address() {
        let mut table = Deployments::default();
        table.set_contract_address(Network::Mainnet, VAULT_CONTRACT, Felt::ONE);
        assert_eq!(table.contract_address(Network::Mainnet, VAULT_CONTRACT), Some(Felt::ONE));

        table.set_rpc_url(Network::Mainnet, "http://localhost:5050/rpc");
        assert_eq!(table.rpc_url(Network::Mainnet), "http://localhost:5050/rpc");
    }

    #[test]
    fn test_invalid_table() {
        let err = Deployments::from_json(r#"{ "goerli": {} }"#).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
