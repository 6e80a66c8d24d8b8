//! Contract ABI helpers
//!
//! # Layout
//!
//! ```text
//! call result : [felt, felt, ...]  (u256 = low, high)
//! event       : keys = [selector(name), user]
//!               data = 나머지 필드 (선언 순서)
//! ```

use ethers::types::U256;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::services::provider::{Event, TransactionReceipt};
use crate::types::{join_u256, selector, split_u256, Felt};

/// Entry point / event 이름
pub mod names {
    pub const GET_DATA_MEDIAN: &str = "get_data_median";

    pub const DEPOSIT: &str = "deposit";
    pub const WITHDRAW: &str = "withdraw";
    pub const BORROW_WITH_PROOF: &str = "borrow_with_proof";
    pub const REPAY: &str = "repay";
    pub const EMERGENCY_EXIT: &str = "emergency_exit";

    pub const GET_MERKLE_ROOT: &str = "get_merkle_root";
    pub const GET_COMMITMENT_COUNT: &str = "get_commitment_count";
    pub const IS_NULLIFIER_USED: &str = "is_nullifier_used";
    pub const GET_TOTAL_DEPOSITED: &str = "get_total_deposited";
    pub const GET_TOTAL_BORROWED: &str = "get_total_borrowed";
    pub const GET_AGGREGATE_HEALTH_FACTOR: &str = "get_aggregate_health_factor";

    pub const DEPOSITED: &str = "Deposited";
    pub const WITHDRAWN: &str = "Withdrawn";
    pub const BORROWED: &str = "Borrowed";
    pub const REPAID: &str = "Repaid";
    pub const EMERGENCY_EXITED: &str = "EmergencyExited";
}

/// `Deposited` 이벤트 data에서 commitment 위치
pub const DEPOSITED_COMMITMENT_INDEX: usize = 2;

/// 반환값 순차 디코더
///
/// 필드 개수가 부족하거나 남으면 `Decode` 에러
pub struct FeltReader<'a> {
    context: &'static str,
    felts: &'a [Felt],
    pos: usize,
}

impl<'a> FeltReader<'a> {
    pub fn new(context: &'static str, felts: &'a [Felt]) -> Self {
        Self {
            context,
            felts,
            pos: 0,
        }
    }

    pub fn felt(&mut self) -> Result<Felt> {
        let value = self.felts.get(self.pos).copied().ok_or_else(|| {
            ClientError::Decode(format!(
                "{}: expected more than {} fields",
                self.context, self.pos
            ))
        })?;
        self.pos += 1;
        Ok(value)
    }

    pub fn u256(&mut self) -> Result<U256> {
        let low = self.felt()?;
        let high = self.felt()?;
        join_u256(low, high)
    }

    pub fn u64(&mut self) -> Result<u64> {
        self.felt()?.to_u64()
    }

    pub fn u32(&mut self) -> Result<u32> {
        self.felt()?.to_u32()
    }

    pub fn bool(&mut self) -> Result<bool> {
        self.felt()?.to_bool()
    }

    /// 모든 필드를 소비했는지 확인
    pub fn finish(self) -> Result<()> {
        if self.pos != self.felts.len() {
            return Err(ClientError::Decode(format!(
                "{}: expected {} fields, got {}",
                self.context,
                self.pos,
                self.felts.len()
            )));
        }
        Ok(())
    }
}

/// Calldata 빌더
#[derive(Debug, Default)]
pub struct Calldata(Vec<Felt>);

impl Calldata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn felt(mut self, value: Felt) -> Self {
        self.0.push(value);
        self
    }

    pub fn u256(mut self, value: U256) -> Self {
        let (low, high) = split_u256(value);
        self.0.push(low);
        self.0.push(high);
        self
    }

    /// `Span<felt252>`: 길이 + 원소
    pub fn span(mut self, values: &[Felt]) -> Self {
        self.0.push(Felt::from(values.len() as u64));
        self.0.extend_from_slice(values);
        self
    }

    pub fn build(self) -> Vec<Felt> {
        self.0
    }
}

/// Vault 컨트랙트 이벤트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum VaultEvent {
    Deposited {
        user: Felt,
        amount: U256,
        commitment: Felt,
    },
    Withdrawn {
        user: Felt,
        amount: U256,
        commitment: Felt,
    },
    Borrowed {
        user: Felt,
        amount: U256,
        nullifier: Felt,
    },
    Repaid {
        user: Felt,
        amount: U256,
    },
    EmergencyExited {
        user: Felt,
        amount: U256,
        fee: U256,
        commitment: Felt,
    },
}

impl VaultEvent {
    /// 영수증 이벤트 디코딩
    ///
    /// Vault 이벤트가 아니면 `Ok(None)`
    pub fn decode(event: &Event) -> Result<Option<Self>> {
        let Some(key) = event.keys.first() else {
            return Ok(None);
        };

        let user = || {
            event.keys.get(1).copied().ok_or_else(|| {
                ClientError::Decode("vault event: missing user key".to_string())
            })
        };

        let decoded = if *key == selector(names::DEPOSITED) {
            let mut data = FeltReader::new(names::DEPOSITED, &event.data);
            let decoded = VaultEvent::Deposited {
                user: user()?,
                amount: data.u256()?,
                commitment: data.felt()?,
            };
            data.finish()?;
            decoded
        } else if *key == selector(names::WITHDRAWN) {
            let mut data = FeltReader::new(names::WITHDRAWN, &event.data);
            let decoded = VaultEvent::Withdrawn {
                user: user()?,
                amount: data.u256()?,
                commitment: data.felt()?,
            };
            data.finish()?;
            decoded
        } else if *key == selector(names::BORROWED) {
            let mut data = FeltReader::new(names::BORROWED, &event.data);
            let decoded = VaultEvent::Borrowed {
                user: user()?,
                amount: data.u256()?,
                nullifier: data.felt()?,
            };
            data.finish()?;
            decoded
        } else if *key == selector(names::REPAID) {
            let mut data = FeltReader::new(names::REPAID, &event.data);
            let decoded = VaultEvent::Repaid {
                user: user()?,
                amount: data.u256()?,
            };
            data.finish()?;
            decoded
        } else if *key == selector(names::EMERGENCY_EXITED) {
            let mut data = FeltReader::new(names::EMERGENCY_EXITED, &event.data);
            let decoded = VaultEvent::EmergencyExited {
                user: user()?,
                amount: data.u256()?,
                fee: data.u256()?,
                commitment: data.felt()?,
            };
            data.finish()?;
            decoded
        } else {
            return Ok(None);
        };

        Ok(Some(decoded))
    }

    pub fn name(&self) -> &'static str {
        match self {
            VaultEvent::Deposited { .. } => names::DEPOSITED,
            VaultEvent::Withdrawn { .. } => names::WITHDRAWN,
            VaultEvent::Borrowed { .. } => names::BORROWED,
            VaultEvent::Repaid { .. } => names::REPAID,
            VaultEvent::EmergencyExited { .. } => names::EMERGENCY_EXITED,
        }
    }
}

/// 이름이 `event_name`인 첫 이벤트의 `data[index]`
///
/// 이벤트가 없거나 필드가 없으면 None
pub fn find_event_field(
    receipt: &TransactionReceipt,
    event_name: &str,
    index: usize,
) -> Option<Felt> {
    let key = selector(event_name);
    receipt
        .events
        .iter()
        .find(|event| event.keys.first() == Some(&key))
        .and_then(|event| event.data.get(index).copied())
}

/// `find_event_field`와 같지만 없으면 `sentinel` 반환
pub fn event_field_or(
    receipt: &TransactionReceipt,
    event_name: &str,
    index: usize,
    sentinel: Felt,
) -> Felt {
    find_event_field(receipt, event_name, index).unwrap_or(sentinel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::provider::{ExecutionStatus, FinalityStatus};

    fn event(name: &str, keys: &[u64], data: &[u64]) -> Event {
        let mut all_keys = vec![selector(name)];
        all_keys.extend(keys.iter().map(|k| Felt::from(*k)));
        Event {
            from_address: Felt::from(0x999u64),
            keys: all_keys,
            data: data.iter().map(|d| Felt::from(*d)).collect(),
        }
    }

    fn receipt(events: Vec<Event>) -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: Felt::from(0x1u64),
            execution_status: ExecutionStatus::Succeeded,
            finality_status: FinalityStatus::AcceptedOnL2,
            events,
            revert_reason: None,
        }
    }

    #[test]
    fn test_reader_exact_shape() {
        let felts = [Felt::from(1u64), Felt::from(2u64), Felt::ZERO, Felt::from(9u64)];
        let mut reader = FeltReader::new("test", &felts);
        assert_eq!(reader.felt().unwrap(), Felt::from(1u64));
        assert_eq!(reader.u256().unwrap(), U256::from(2));
        assert_eq!(reader.u64().unwrap(), 9);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_reader_short_and_trailing() {
        let felts = [Felt::from(1u64)];
        let mut reader = FeltReader::new("test", &felts);
        assert!(reader.u256().is_err());

        let felts = [Felt::from(1u64), Felt::from(2u64)];
        let mut reader = FeltReader::new("test", &felts);
        reader.felt().unwrap();
        assert!(matches!(reader.finish(), Err(ClientError::Decode(_))));
    }

    #[test]
    fn test_calldata_layout() {
        let amount = U256::from(10) + (U256::from(1) << 128u32);
        let proof = [Felt::from(0xau64), Felt::from(0xbu64)];
        let calldata = Calldata::new()
            .felt(Felt::from(0xcu64))
            .u256(amount)
            .span(&proof)
            .build();

        let expected: Vec<Felt> = [0xc_u64, 10, 1, 2, 0xa, 0xb].into_iter().map(Felt::from).collect();
        assert_eq!(calldata, expected);
    }

    #[test]
    fn test_decode_deposited() {
        let decoded = VaultEvent::decode(&event("Deposited", &[0x77], &[100, 0, 0xc0ffee]))
            .unwrap()
            .unwrap();
        assert_eq!(
            decoded,
            VaultEvent::Deposited {
                user: Felt::from(0x77u64),
                amount: U256::from(100),
                commitment: Felt::from(0xc0ffeeu64),
            }
        );
        assert_eq!(decoded.name(), "Deposited");
    }

    #[test]
    fn test_decode_emergency_exited() {
        let decoded = VaultEvent::decode(&event("EmergencyExited", &[0x77], &[500, 0, 5, 0, 0xdead]))
            .unwrap()
            .unwrap();
        assert_eq!(
            decoded,
            VaultEvent::EmergencyExited {
                user: Felt::from(0x77u64),
                amount: U256::from(500),
                fee: U256::from(5),
                commitment: Felt::from(0xdeadu64),
            }
        );
    }

    #[test]
    fn test_decode_repaid_and_borrowed() {
        let repaid = VaultEvent::decode(&event("Repaid", &[0x1], &[42, 0])).unwrap();
        assert!(matches!(repaid, Some(VaultEvent::Repaid { .. })));

        let borrowed = VaultEvent::decode(&event("Borrowed", &[0x1], &[42, 0, 0x5])).unwrap();
        assert!(matches!(
            borrowed,
            Some(VaultEvent::Borrowed { nullifier, .. }) if nullifier == Felt::from(0x5u64)
        ));
    }

    #[test]
    fn test_decode_foreign_event() {
        assert!(VaultEvent::decode(&event("Transfer", &[], &[1, 2, 3])).unwrap().is_none());
    }

    #[test]
    fn test_decode_malformed_event() {
        // commitment 누락
        let result = VaultEvent::decode(&event("Withdrawn", &[0x1], &[1, 0]));
        assert!(matches!(result, Err(ClientError::Decode(_))));

        // user key 누락
        let result = VaultEvent::decode(&event("Repaid", &[], &[1, 0]));
        assert!(matches!(result, Err(ClientError::Decode(_))));
    }

    #[test]
    fn test_find_event_field_first_match() {
        let deposits = receipt(vec![
            event("Transfer", &[], &[9, 9, 9]),
            event("Deposited", &[0x1], &[1, 0, 0xaaa]),
            event("Deposited", &[0x1], &[1, 0, 0xbbb]),
        ]);
        assert_eq!(
            find_event_field(&deposits, "Deposited", DEPOSITED_COMMITMENT_INDEX),
            Some(Felt::from(0xaaau64))
        );
    }

    #[test]
    fn test_event_field_sentinel_when_absent() {
        let foreign = receipt(vec![event("Transfer", &[], &[9, 9, 9])]);
        assert_eq!(find_event_field(&foreign, "Deposited", 2), None);
        assert_eq!(event_field_or(&foreign, "Deposited", 2, Felt::ZERO), Felt::ZERO);

        // 이벤트는 있지만 필드가 짧은 경우도 sentinel
        let short = receipt(vec![event("Deposited", &[0x1], &[1])]);
        assert_eq!(event_field_or(&short, "Deposited", 2, Felt::ZERO), Felt::ZERO);
    }
}
