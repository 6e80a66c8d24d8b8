//! Starknet Field Element
//!
//! Cairo의 `felt252`와 `u256`을 Rust 타입으로 표현
//!
//! # Wire Format
//!
//! ```text
//! felt252 : 0x-prefixed hex, 값 < P (P = 2^251 + 17 * 2^192 + 1)
//! u256    : [low, high] 두 개의 felt, 각 word < 2^128
//!           value = low + high * 2^128
//! string  : 31바이트 이하 ASCII → big-endian 정수 하나 (short string)
//! ```

use std::fmt;
use std::str::FromStr;

use ethers::types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

use crate::error::{ClientError, Result};

/// Starknet field prime: 2^251 + 17 * 2^192 + 1
const FIELD_PRIME: U256 = U256([1, 0, 0, 0x0800_0000_0000_0011]);

/// short string 최대 길이 (bytes)
pub const MAX_SHORT_STRING_LEN: usize = 31;

/// Starknet field element (`felt252`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Felt(U256);

impl Felt {
    pub const ZERO: Felt = Felt(U256([0, 0, 0, 0]));
    pub const ONE: Felt = Felt(U256([1, 0, 0, 0]));

    /// U256 값으로 생성 (P 이상이면 실패)
    pub fn new(value: U256) -> Result<Self> {
        if value >= FIELD_PRIME {
            return Err(ClientError::Decode(format!(
                "value {:#x} exceeds the field prime",
                value
            )));
        }
        Ok(Self(value))
    }

    /// `0x` hex 문자열 파싱
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.is_empty() || digits.len() > 64 {
            return Err(ClientError::Decode(format!("invalid felt hex: {:?}", s)));
        }
        let value = U256::from_str_radix(digits, 16)
            .map_err(|_| ClientError::Decode(format!("invalid felt hex: {:?}", s)))?;
        Self::new(value)
    }

    /// Cairo short string 인코딩
    ///
    /// `"BTC/USD"` → `0x4254432f555344`
    pub fn from_short_string(s: &str) -> Result<Self> {
        if !s.is_ascii() {
            return Err(ClientError::Decode(format!(
                "short string must be ASCII: {:?}",
                s
            )));
        }
        if s.len() > MAX_SHORT_STRING_LEN {
            return Err(ClientError::Decode(format!(
                "short string longer than {} bytes: {:?}",
                MAX_SHORT_STRING_LEN, s
            )));
        }
        Ok(Self(U256::from_big_endian(s.as_bytes())))
    }

    /// short string 디코딩 (ASCII가 아니면 None)
    pub fn to_short_string(&self) -> Option<String> {
        let mut bytes = [0u8; 32];
        self.0.to_big_endian(&mut bytes);
        let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        let text = &bytes[start..];
        if text.is_ascii() {
            String::from_utf8(text.to_vec()).ok()
        } else {
            None
        }
    }

    /// 내부 U256 값
    pub fn value(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// u64로 변환 (Cairo `u64`)
    pub fn to_u64(&self) -> Result<u64> {
        if self.0.bits() > 64 {
            return Err(ClientError::Decode(format!("{} does not fit in u64", self)));
        }
        Ok(self.0.low_u64())
    }

    /// u32로 변환 (decimals, source count 등)
    pub fn to_u32(&self) -> Result<u32> {
        let value = self.to_u64()?;
        u32::try_from(value)
            .map_err(|_| ClientError::Decode(format!("{} does not fit in u32", self)))
    }

    /// bool로 변환 (0 또는 1만 허용)
    pub fn to_bool(&self) -> Result<bool> {
        match self.to_u64() {
            Ok(0) => Ok(false),
            Ok(1) => Ok(true),
            _ => Err(ClientError::Decode(format!("{} is not a bool", self))),
        }
    }
}

impl From<u64> for Felt {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl FromStr for Felt {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl Serialize for Felt {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Felt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Felt::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Entry point selector 계산
///
/// `starknet_keccak(name) = keccak256(name) & (2^250 - 1)`
pub fn selector(name: &str) -> Felt {
    let hash = Keccak256::digest(name.as_bytes());
    let mask = (U256::one() << 250u32) - U256::one();
    Felt(U256::from_big_endian(&hash) & mask)
}

/// u256 → (low, high) 분할
pub fn split_u256(value: U256) -> (Felt, Felt) {
    let low_mask = (U256::one() << 128u32) - U256::one();
    (Felt(value & low_mask), Felt(value >> 128u32))
}

/// (low, high) → u256 결합
///
/// 각 word는 128비트 이하여야 함
pub fn join_u256(low: Felt, high: Felt) -> Result<U256> {
    if low.0.bits() > 128 || high.0.bits() > 128 {
        return Err(ClientError::Decode(format!(
            "u256 word out of range: low={}, high={}",
            low, high
        )));
    }
    Ok(low.0 + (high.0 << 128u32))
}
