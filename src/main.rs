//! VestaZK Status
//!
//! 설정된 네트워크의 오라클 가격과 vault 상태를 조회해 JSON으로 출력한다.
//!
//! ```text
//! STARKNET_NETWORK=sepolia VESTAZK_VAULT_ADDRESS=0x... vestazk-status
//! ```

use std::sync::Arc;

use anyhow::Context;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vestazk_client::services::PRAGMA_ORACLE_ADDRESS;
use vestazk_client::{Config, Felt, JsonRpcProvider, PragmaOracle, VaultClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    // RUST_LOG=vestazk_client=trace 형태로 레벨 제어 가능
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "vestazk_client=debug,vestazk_status=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting VestaZK status");

    // 설정 로드
    let config = Config::from_env()?;
    let deployments = config.deployments()?;
    let network = config.network;
    tracing::info!("📋 Configuration loaded (network: {})", network);

    // 오라클 초기화
    let rpc_url = deployments.rpc_url(network);
    let oracle_address = match config.oracle_address(&deployments) {
        Some(address) => address,
        None => Felt::from_hex(PRAGMA_ORACLE_ADDRESS)?,
    };
    let oracle = PragmaOracle::with_provider(
        Arc::new(JsonRpcProvider::new(rpc_url)?),
        oracle_address,
    );
    tracing::info!("📈 Pragma oracle ready at {}", oracle_address);

    let mut prices = serde_json::Map::new();
    for pair in &config.price_pairs {
        match oracle.get_price(pair).await {
            Ok(record) => {
                prices.insert(
                    pair.clone(),
                    json!({
                        "price": record.formatted(),
                        "decimals": record.decimals,
                        "num_sources": record.num_sources,
                        "last_updated": record.last_updated_at(),
                    }),
                );
            }
            Err(e) => {
                tracing::warn!(pair = %pair, code = e.code(), "price query failed: {}", e);
                prices.insert(pair.clone(), json!({ "error": e.to_string() }));
            }
        }
    }

    // Vault 상태
    let vault = VaultClient::for_network(network, &deployments)?;
    let stats = match vault.vault_address() {
        Some(address) => {
            tracing::info!("🏦 Vault bound at {}", address);
            let stats = vault
                .get_vault_stats()
                .await
                .context("Failed to read vault stats")?;
            Some(stats)
        }
        None => {
            tracing::warn!("No vault address for {}, skipping vault stats", network);
            None
        }
    };

    let report = json!({
        "network": network,
        "rpc_url": rpc_url,
        "prices": prices,
        "vault": stats,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    tracing::info!("✅ Done");
    Ok(())
}
