//! Configuration Module
//!
//! `vestazk-status` 바이너리용 환경변수 설정.
//! 라이브러리 어댑터 자체는 생성자 인자만 받는다.

use std::env;

use anyhow::{Context, Result};

use crate::services::{Deployments, ORACLE_CONTRACT, VAULT_CONTRACT};
use crate::types::{Felt, Network};

/// 기본 조회 페어
const DEFAULT_PRICE_PAIRS: &str = "BTC/USD,ETH/USD,USDC/USD";

/// 애플리케이션 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// 네트워크 (기본값: sepolia)
    pub network: Network,

    /// RPC URL (없으면 배포 테이블 값)
    pub rpc_url: Option<String>,

    /// Vault 주소 (없으면 배포 테이블 값)
    pub vault_address: Option<Felt>,

    /// 배포 테이블 JSON 경로 (없으면 내장 테이블)
    pub deployments_path: Option<String>,

    /// 조회할 가격 페어
    pub price_pairs: Vec<String>,
}

impl Config {
    /// 환경변수에서 설정 로드
    ///
    /// # Optional Environment Variables
    ///
    /// - `STARKNET_NETWORK`: mainnet | sepolia
    /// - `STARKNET_RPC_URL`: RPC URL override
    /// - `VESTAZK_VAULT_ADDRESS`: vault 주소 override
    /// - `DEPLOYMENTS_PATH`: 배포 테이블 JSON 경로
    /// - `PRICE_PAIRS`: 콤마로 구분된 페어 목록
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let network = match var("STARKNET_NETWORK") {
            Some(value) => value
                .parse::<Network>()
                .map_err(anyhow::Error::msg)
                .context("STARKNET_NETWORK must be mainnet or sepolia")?,
            None => Network::default(),
        };

        let vault_address = var("VESTAZK_VAULT_ADDRESS")
            .filter(|v| !v.is_empty())
            .map(|v| Felt::from_hex(&v))
            .transpose()
            .context("VESTAZK_VAULT_ADDRESS must be a hex felt")?;

        let price_pairs = var("PRICE_PAIRS")
            .unwrap_or_else(|| DEFAULT_PRICE_PAIRS.to_string())
            .split(',')
            .map(|pair| pair.trim().to_string())
            .filter(|pair| !pair.is_empty())
            .collect();

        Ok(Config {
            network,
            rpc_url: var("STARKNET_RPC_URL").filter(|v| !v.is_empty()),
            vault_address,
            deployments_path: var("DEPLOYMENTS_PATH").filter(|v| !v.is_empty()),
            price_pairs,
        })
    }

    /// override가 적용된 배포 테이블
    pub fn deployments(&self) -> Result<Deployments> {
        let mut deployments = match &self.deployments_path {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read deployments table {}", path))?;
                Deployments::from_json(&json)?
            }
            None => Deployments::builtin()?,
        };

        if let Some(rpc_url) = &self.rpc_url {
            deployments.set_rpc_url(self.network, rpc_url);
        }
        if let Some(address) = self.vault_address {
            deployments.set_contract_address(self.network, VAULT_CONTRACT, address);
        }

        Ok(deployments)
    }

    /// 오라클 주소 (배포 테이블에 없으면 None)
    pub fn oracle_address(&self, deployments: &Deployments) -> Option<Felt> {
        deployments.contract_address(self.network, ORACLE_CONTRACT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        // 환경변수 없이 기본값으로 설정 생성
        let config = config_from(&[]).unwrap();
        assert_eq!(config.network, Network::Sepolia);
        assert_eq!(config.rpc_url, None);
        assert_eq!(config.price_pairs, vec!["BTC/USD", "ETH/USD", "USDC/USD"]);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("STARKNET_NETWORK", "mainnet"),
            ("STARKNET_RPC_URL", "http://localhost:5050/rpc"),
            ("VESTAZK_VAULT_ADDRESS", "0x7a17"),
            ("PRICE_PAIRS", " BTC/USD , ,STRK/USD"),
        ])
        .unwrap();

        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.price_pairs, vec!["BTC/USD", "STRK/USD"]);

        let deployments = config.deployments().unwrap();
        assert_eq!(deployments.rpc_url(Network::Mainnet), "http://localhost:5050/rpc");
        assert_eq!(
            deployments.contract_address(Network::Mainnet, VAULT_CONTRACT),
            Some(Felt::from(0x7a17u64))
        );
        assert!(config.oracle_address(&deployments).is_some());
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("STARKNET_NETWORK", "goerli")]).is_err());
        assert!(config_from(&[("VESTAZK_VAULT_ADDRESS", "not-hex")]).is_err());
    }

    #[test]
    fn test_missing_deployments_file() {
        let config = config_from(&[("DEPLOYMENTS_PATH", "/nonexistent/deployments.json")]).unwrap();
        assert!(config.deployments().is_err());
    }
}
