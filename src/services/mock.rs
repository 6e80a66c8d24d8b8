//! 테스트용 Provider / Account

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Barrier;

use crate::error::TransportError;
use crate::services::account::Account;
use crate::services::provider::{
    Call, Event, ExecutionStatus, FinalityStatus, StarknetProvider, TransactionReceipt,
};
use crate::types::{selector, Felt};

/// selector별 응답을 돌려주는 provider
#[derive(Default)]
pub(crate) struct MockProvider {
    responses: Mutex<HashMap<Felt, Result<Vec<Felt>, i64>>>,
    receipts: Mutex<HashMap<Felt, TransactionReceipt>>,
    barrier: Option<Arc<Barrier>>,
    pub calls: AtomicUsize,
    pub waits: AtomicUsize,
    pub receipt_fetches: AtomicUsize,
    pub call_log: Mutex<Vec<Call>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 모든 read call이 `parties`개가 동시에 도착할 때까지 대기
    pub fn with_barrier(parties: usize) -> Self {
        Self {
            barrier: Some(Arc::new(Barrier::new(parties))),
            ..Self::default()
        }
    }

    pub fn respond(&self, entry_point: &str, felts: Vec<Felt>) {
        self.responses
            .lock()
            .unwrap()
            .insert(selector(entry_point), Ok(felts));
    }

    pub fn fail(&self, entry_point: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(selector(entry_point), Err(-32603));
    }

    pub fn set_receipt(&self, tx_hash: Felt, events: Vec<Event>) {
        self.receipts.lock().unwrap().insert(
            tx_hash,
            TransactionReceipt {
                transaction_hash: tx_hash,
                execution_status: ExecutionStatus::Succeeded,
                finality_status: FinalityStatus::AcceptedOnL2,
                events,
                revert_reason: None,
            },
        );
    }

    /// 지금까지의 transport 호출 수 (call + wait + receipt)
    pub fn total_requests(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
            + self.waits.load(Ordering::SeqCst)
            + self.receipt_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StarknetProvider for MockProvider {
    async fn call(&self, call: &Call) -> Result<Vec<Felt>, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.call_log.lock().unwrap().push(call.clone());

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }

        let response = self.responses.lock().unwrap().get(&call.selector).cloned();
        match response {
            Some(Ok(felts)) => Ok(felts),
            Some(Err(code)) => Err(TransportError::Rpc {
                code,
                message: "Internal error".to_string(),
            }),
            None => Err(TransportError::Rpc {
                code: 21,
                message: "Invalid message selector".to_string(),
            }),
        }
    }

    async fn wait_for_transaction(&self, _tx_hash: Felt) -> Result<(), TransportError> {
        self.waits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_transaction_receipt(
        &self,
        tx_hash: Felt,
    ) -> Result<TransactionReceipt, TransportError> {
        self.receipt_fetches.fetch_add(1, Ordering::SeqCst);
        let receipt = self.receipts.lock().unwrap().get(&tx_hash).cloned();
        Ok(receipt.unwrap_or(TransactionReceipt {
            transaction_hash: tx_hash,
            execution_status: ExecutionStatus::Succeeded,
            finality_status: FinalityStatus::AcceptedOnL2,
            events: vec![],
            revert_reason: None,
        }))
    }
}

/// 제출된 call을 기록하는 계정
pub(crate) struct MockAccount {
    address: Felt,
    tx_hash: Felt,
    reject: bool,
    pub executed: Mutex<Vec<Vec<Call>>>,
}

impl MockAccount {
    pub fn new(address: Felt, tx_hash: Felt) -> Self {
        Self {
            address,
            tx_hash,
            reject: false,
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(address: Felt) -> Self {
        Self {
            reject: true,
            ..Self::new(address, Felt::ZERO)
        }
    }
}

#[async_trait]
impl Account for MockAccount {
    fn address(&self) -> Felt {
        self.address
    }

    async fn execute(&self, calls: &[Call]) -> Result<Felt, TransportError> {
        self.executed.lock().unwrap().push(calls.to_vec());
        if self.reject {
            return Err(TransportError::Account("insufficient balance for fee".to_string()));
        }
        Ok(self.tx_hash)
    }
}
