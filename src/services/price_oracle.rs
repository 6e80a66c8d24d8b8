//! Price Oracle Service
//!
//! Pragma 오라클의 `get_data_median(data_type)` 조회
//!
//! # Return Layout
//!
//! ```text
//! [price, decimals, last_updated_timestamp, num_sources_aggregated]
//! ```
//!
//! 매 호출마다 새로 조회하며 캐시하지 않는다.

use std::sync::Arc;

use crate::error::Result;
use crate::services::abi::{names, FeltReader};
use crate::services::deployments::{MAINNET_RPC_URL, SEPOLIA_RPC_URL};
use crate::services::provider::{Call, JsonRpcProvider, StarknetProvider};
use crate::types::{Felt, Network, PriceRecord};

/// Pragma 오라클 주소 (모든 네트워크 공통)
pub const PRAGMA_ORACLE_ADDRESS: &str =
    "0x2a85bd616f912537c50a49a4076db02c00b29b2cdc8a197ce92ed1837fa875b";

pub const BTC_USD: &str = "BTC/USD";
pub const ETH_USD: &str = "ETH/USD";
pub const USDC_USD: &str = "USDC/USD";

/// 가격 오라클 어댑터
///
/// # Example
/// ```ignore
/// let oracle = PragmaOracle::new(Network::Sepolia)?;
/// let btc = oracle.get_btc_price().await?;
/// println!("BTC/USD = {}", btc.formatted());
/// ```
pub struct PragmaOracle {
    provider: Arc<dyn StarknetProvider>,
    address: Felt,
}

impl PragmaOracle {
    /// 네트워크별 공개 RPC에 연결
    pub fn new(network: Network) -> Result<Self> {
        let rpc_url = match network {
            Network::Sepolia => SEPOLIA_RPC_URL,
            Network::Mainnet => MAINNET_RPC_URL,
        };
        let provider = JsonRpcProvider::new(rpc_url)?;
        let address = Felt::from_hex(PRAGMA_ORACLE_ADDRESS)?;

        tracing::debug!(%network, rpc_url, %address, "Pragma oracle bound");
        Ok(Self::with_provider(Arc::new(provider), address))
    }

    /// 임의의 provider / 오라클 주소로 생성
    pub fn with_provider(provider: Arc<dyn StarknetProvider>, address: Felt) -> Self {
        Self { provider, address }
    }

    pub fn address(&self) -> Felt {
        self.address
    }

    /// 페어 가격 조회 (예: `"BTC/USD"`)
    ///
    /// 페어 심볼은 short string으로 인코딩되며, 인코딩할 수 없으면
    /// 네트워크 호출 없이 `Decode` 에러
    pub async fn get_price(&self, pair: &str) -> Result<PriceRecord> {
        let pair_id = Felt::from_short_string(pair)?;
        let call = Call::new(self.address, names::GET_DATA_MEDIAN, vec![pair_id]);

        let result = self.provider.call(&call).await?;

        let mut reader = FeltReader::new(names::GET_DATA_MEDIAN, &result);
        let record = PriceRecord {
            price: reader.felt()?.value(),
            decimals: reader.u32()?,
            last_updated: reader.felt()?.value(),
            num_sources: reader.u32()?,
        };
        reader.finish()?;

        tracing::debug!(pair, price = %record.price, decimals = record.decimals, "price fetched");
        Ok(record)
    }

    pub async fn get_btc_price(&self) -> Result<PriceRecord> {
        self.get_price(BTC_USD).await
    }

    pub async fn get_eth_price(&self) -> Result<PriceRecord> {
        self.get_price(ETH_USD).await
    }

    pub async fn get_usdc_price(&self) -> Result<PriceRecord> {
        self.get_price(USDC_USD).await
    }
}
