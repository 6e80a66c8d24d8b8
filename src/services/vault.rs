//! Vault Service
//!
//! Handles private lending vault contract interactions.
//!
//! # Features
//! - Mutating operations (deposit, withdraw, borrow, repay, emergency exit)
//! - Contract state queries (merkle root, commitments, nullifiers, totals)
//! - Receipt event decoding
//!
//! # Binding State
//!
//! ```text
//! contract  account   reads   mutations
//! ────────  ───────   ─────   ─────────
//!   None      any      ✗        ✗
//!   Some      None     ✓        ✗
//!   Some      Some     ✓        ✓
//! ```

use std::sync::Arc;

use ethers::types::U256;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::services::abi::{
    event_field_or, names, Calldata, FeltReader, VaultEvent, DEPOSITED_COMMITMENT_INDEX,
};
use crate::services::account::Account;
use crate::services::deployments::{Deployments, VAULT_CONTRACT};
use crate::services::provider::{Call, JsonRpcProvider, StarknetProvider};
use crate::types::{DepositOutcome, Felt, HealthFactor, Network, TxOutcome, VaultStats};

/// Vault 어댑터 설정 (생성 후 불변)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    pub network: Network,
    pub vault_address: Option<Felt>,
    pub wbtc_address: Option<Felt>,
    pub usdc_address: Option<Felt>,
    pub vesu_pool_address: Option<Felt>,
    pub verifier_address: Option<Felt>,
}

impl VaultConfig {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            ..Default::default()
        }
    }

    pub fn with_vault_address(mut self, address: Felt) -> Self {
        self.vault_address = Some(address);
        self
    }
}

/// 배포된 vault 컨트랙트 핸들
#[derive(Clone)]
struct ContractHandle {
    address: Felt,
    provider: Arc<dyn StarknetProvider>,
}

impl ContractHandle {
    async fn call(&self, entry_point: &'static str, calldata: Vec<Felt>) -> Result<Vec<Felt>> {
        let call = Call::new(self.address, entry_point, calldata);
        Ok(self.provider.call(&call).await?)
    }

    async fn merkle_root(&self) -> Result<Felt> {
        let result = self.call(names::GET_MERKLE_ROOT, vec![]).await?;
        let mut reader = FeltReader::new(names::GET_MERKLE_ROOT, &result);
        let root = reader.felt()?;
        reader.finish()?;
        Ok(root)
    }

    async fn commitment_count(&self) -> Result<u64> {
        let result = self.call(names::GET_COMMITMENT_COUNT, vec![]).await?;
        let mut reader = FeltReader::new(names::GET_COMMITMENT_COUNT, &result);
        let count = reader.u64()?;
        reader.finish()?;
        Ok(count)
    }

    async fn is_nullifier_used(&self, nullifier: Felt) -> Result<bool> {
        let result = self.call(names::IS_NULLIFIER_USED, vec![nullifier]).await?;
        let mut reader = FeltReader::new(names::IS_NULLIFIER_USED, &result);
        let used = reader.bool()?;
        reader.finish()?;
        Ok(used)
    }

    async fn read_u256(&self, entry_point: &'static str) -> Result<U256> {
        let result = self.call(entry_point, vec![]).await?;
        let mut reader = FeltReader::new(entry_point, &result);
        let value = reader.u256()?;
        reader.finish()?;
        Ok(value)
    }

    async fn aggregate_health_factor(&self) -> Result<HealthFactor> {
        let result = self.call(names::GET_AGGREGATE_HEALTH_FACTOR, vec![]).await?;
        let mut reader = FeltReader::new(names::GET_AGGREGATE_HEALTH_FACTOR, &result);
        let health_factor = HealthFactor {
            collateral: reader.u256()?,
            debt: reader.u256()?,
            health: reader.u256()?,
        };
        reader.finish()?;
        Ok(health_factor)
    }
}

/// 컨트랙트 핸들 + 서명 계정
#[derive(Clone)]
struct VaultBinding {
    contract: Option<ContractHandle>,
    account: Option<Arc<dyn Account>>,
}

impl VaultBinding {
    fn contract(&self) -> Result<&ContractHandle> {
        self.contract
            .as_ref()
            .ok_or(ClientError::Uninitialized("Vault"))
    }

    fn signer(&self) -> Result<(&ContractHandle, &Arc<dyn Account>)> {
        match (&self.contract, &self.account) {
            (Some(contract), Some(account)) => Ok((contract, account)),
            _ => Err(ClientError::Uninitialized("Account or vault")),
        }
    }

    fn is_initialized(&self) -> bool {
        self.contract.is_some() && self.account.is_some()
    }
}

/// Vault 어댑터
///
/// # Example
/// ```ignore
/// let mut vault = VaultClient::for_network(Network::Sepolia, &Deployments::builtin()?)?;
/// vault.set_account(Arc::new(my_account));
///
/// let deposit = vault.deposit(U256::from(100_000_000u64)).await?;
/// if !deposit.commitment_found() {
///     tracing::warn!("Deposited event missing");
/// }
/// ```
#[derive(Clone)]
pub struct VaultClient {
    config: VaultConfig,
    provider: Arc<dyn StarknetProvider>,
    binding: VaultBinding,
}

impl VaultClient {
    /// 기본 배포 테이블의 RPC로 연결
    pub fn new(config: VaultConfig) -> Result<Self> {
        Self::connect(config, &Deployments::builtin()?)
    }

    /// 배포 테이블에서 vault 주소를 찾아 생성
    ///
    /// 테이블에 vault가 없으면 초기화되지 않은 어댑터를 반환
    pub fn for_network(network: Network, deployments: &Deployments) -> Result<Self> {
        let mut config = VaultConfig::new(network);
        config.vault_address = deployments.contract_address(network, VAULT_CONTRACT);
        Self::connect(config, deployments)
    }

    /// 주어진 배포 테이블의 RPC로 연결
    pub fn connect(config: VaultConfig, deployments: &Deployments) -> Result<Self> {
        let rpc_url = deployments.rpc_url(config.network);
        let provider = JsonRpcProvider::new(rpc_url)?;
        Ok(Self::with_provider(config, Arc::new(provider)))
    }

    /// 임의의 provider로 생성
    pub fn with_provider(config: VaultConfig, provider: Arc<dyn StarknetProvider>) -> Self {
        let contract = config.vault_address.map(|address| ContractHandle {
            address,
            provider: provider.clone(),
        });

        match &contract {
            Some(handle) => tracing::debug!(network = %config.network, vault = %handle.address, "vault bound"),
            None => tracing::debug!(network = %config.network, "no vault address configured"),
        }

        Self {
            config,
            provider,
            binding: VaultBinding {
                contract,
                account: None,
            },
        }
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn vault_address(&self) -> Option<Felt> {
        self.binding.contract.as_ref().map(|c| c.address)
    }

    pub fn account_address(&self) -> Option<Felt> {
        self.binding.account.as_ref().map(|a| a.address())
    }

    /// 서명 계정 연결 (재호출 시 교체)
    pub fn set_account(&mut self, account: Arc<dyn Account>) {
        tracing::debug!(account = %account.address(), "account attached");
        self.binding.account = Some(account);
    }

    /// 서명 계정이 연결된 새 어댑터
    pub fn with_account(mut self, account: Arc<dyn Account>) -> Self {
        self.set_account(account);
        self
    }

    /// 계정과 컨트랙트 핸들이 모두 있는지
    pub fn is_initialized(&self) -> bool {
        self.binding.is_initialized()
    }

    // ============ Mutating Operations ============

    /// 트랜잭션 제출 후 finality까지 대기
    async fn invoke(&self, entry_point: &'static str, calldata: Vec<Felt>) -> Result<Felt> {
        let (contract, account) = self.binding.signer()?;
        let call = Call::new(contract.address, entry_point, calldata);

        let tx_hash = account.execute(std::slice::from_ref(&call)).await?;
        tracing::info!(entry_point, %tx_hash, "transaction submitted");

        self.provider.wait_for_transaction(tx_hash).await?;
        tracing::info!(entry_point, %tx_hash, "transaction confirmed");

        Ok(tx_hash)
    }

    /// 담보 예치
    ///
    /// 영수증에 `Deposited` 이벤트가 없으면 commitment는 `Felt::ZERO`
    pub async fn deposit(&self, amount: U256) -> Result<DepositOutcome> {
        let calldata = Calldata::new().u256(amount).build();
        let tx_hash = self.invoke(names::DEPOSIT, calldata).await?;

        let receipt = self.provider.get_transaction_receipt(tx_hash).await?;
        let commitment = event_field_or(
            &receipt,
            names::DEPOSITED,
            DEPOSITED_COMMITMENT_INDEX,
            Felt::ZERO,
        );
        if commitment.is_zero() {
            tracing::warn!(%tx_hash, "Deposited event not found in receipt");
        }

        Ok(DepositOutcome {
            commitment,
            tx_hash,
        })
    }

    pub async fn withdraw(&self, commitment: Felt, amount: U256) -> Result<TxOutcome> {
        let calldata = Calldata::new().felt(commitment).u256(amount).build();
        let tx_hash = self.invoke(names::WITHDRAW, calldata).await?;
        Ok(TxOutcome { tx_hash })
    }

    /// ZK 증명과 함께 대출
    ///
    /// `proof`는 verifier가 요구하는 `full_proof_with_hints` 그대로 전달
    pub async fn borrow_with_proof(
        &self,
        amount: U256,
        recipient: Felt,
        proof: &[Felt],
    ) -> Result<TxOutcome> {
        let calldata = Calldata::new()
            .u256(amount)
            .felt(recipient)
            .span(proof)
            .build();
        let tx_hash = self.invoke(names::BORROW_WITH_PROOF, calldata).await?;
        Ok(TxOutcome { tx_hash })
    }

    pub async fn repay(&self, amount: U256) -> Result<TxOutcome> {
        let calldata = Calldata::new().u256(amount).build();
        let tx_hash = self.invoke(names::REPAY, calldata).await?;
        Ok(TxOutcome { tx_hash })
    }

    pub async fn emergency_exit(
        &self,
        commitment: Felt,
        amount: U256,
        proof: &[Felt],
    ) -> Result<TxOutcome> {
        let calldata = Calldata::new()
            .felt(commitment)
            .u256(amount)
            .span(proof)
            .build();
        let tx_hash = self.invoke(names::EMERGENCY_EXIT, calldata).await?;
        Ok(TxOutcome { tx_hash })
    }

    // ============ Read-only Operations ============

    pub async fn merkle_root(&self) -> Result<Felt> {
        self.binding.contract()?.merkle_root().await
    }

    pub async fn commitment_count(&self) -> Result<u64> {
        self.binding.contract()?.commitment_count().await
    }

    pub async fn is_nullifier_used(&self, nullifier: Felt) -> Result<bool> {
        self.binding.contract()?.is_nullifier_used(nullifier).await
    }

    pub async fn total_deposited(&self) -> Result<U256> {
        self.binding
            .contract()?
            .read_u256(names::GET_TOTAL_DEPOSITED)
            .await
    }

    pub async fn total_borrowed(&self) -> Result<U256> {
        self.binding
            .contract()?
            .read_u256(names::GET_TOTAL_BORROWED)
            .await
    }

    pub async fn get_aggregate_health_factor(&self) -> Result<HealthFactor> {
        self.binding.contract()?.aggregate_health_factor().await
    }

    /// Vault 통계 스냅샷
    ///
    /// 5개의 read call을 동시에 보내고 모두 기다린다.
    /// 하나라도 실패하면 전체가 실패 (부분 결과 없음)
    pub async fn get_vault_stats(&self) -> Result<VaultStats> {
        let contract = self.binding.contract()?;

        let (merkle_root, commitment_count, total_deposited, total_borrowed, health_factor) = tokio::try_join!(
            contract.merkle_root(),
            contract.commitment_count(),
            contract.read_u256(names::GET_TOTAL_DEPOSITED),
            contract.read_u256(names::GET_TOTAL_BORROWED),
            contract.aggregate_health_factor()
        )?;

        Ok(VaultStats {
            merkle_root,
            commitment_count,
            total_deposited,
            total_borrowed,
            health_factor,
        })
    }

    /// 트랜잭션 영수증의 vault 이벤트 디코딩
    ///
    /// 다른 컨트랙트가 emit한 이벤트는 건너뛴다
    pub async fn receipt_events(&self, tx_hash: Felt) -> Result<Vec<VaultEvent>> {
        let contract = self.binding.contract()?;
        let receipt = self.provider.get_transaction_receipt(tx_hash).await?;

        let mut events = Vec::new();
        for event in receipt
            .events
            .iter()
            .filter(|e| e.from_address == contract.address)
        {
            if let Some(decoded) = VaultEvent::decode(event)? {
                events.push(decoded);
            }
        }
        Ok(events)
    }
}
