use crate::error::TypesError;
use std::fmt;
use std::str::FromStr;

/// 256-bit unsigned integer for deposit weights and treasury amounts.
///
/// Stored as 4 x u64 in little-endian limb order. Only checked arithmetic is
/// exposed: ledger code must decide what an overflow means.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct U256([u64; 4]);

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.iter().rev().cmp(other.0.iter().rev())
    }
}

/// Largest power of ten that fits in a limb, used for decimal rendering.
const DECIMAL_CHUNK: u64 = 10_000_000_000_000_000_000;

impl U256 {
    pub const ZERO: Self = Self([0, 0, 0, 0]);
    pub const ONE: Self = Self([1, 0, 0, 0]);
    pub const MAX: Self = Self([u64::MAX; 4]);

    pub const fn from_u64(val: u64) -> Self {
        Self([val, 0, 0, 0])
    }

    pub const fn from_u128(val: u128) -> Self {
        Self([val as u64, (val >> 64) as u64, 0, 0])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&l| l == 0)
    }

    pub fn checked_add(&self, rhs: &Self) -> Option<Self> {
        let (sum, carry) = self.overflowing_add(rhs);
        (!carry).then_some(sum)
    }

    pub fn checked_sub(&self, rhs: &Self) -> Option<Self> {
        let (diff, borrow) = self.overflowing_sub(rhs);
        (!borrow).then_some(diff)
    }

    pub fn checked_mul(&self, rhs: &Self) -> Option<Self> {
        let mut wide = [0u64; 8];

        for i in 0..4 {
            if self.0[i] == 0 {
                continue;
            }
            let mut carry = 0u128;
            for j in 0..4 {
                let cur = wide[i + j] as u128
                    + (self.0[i] as u128) * (rhs.0[j] as u128)
                    + carry;
                wide[i + j] = cur as u64;
                carry = cur >> 64;
            }
            wide[i + 4] = carry as u64;
        }

        if wide[4..].iter().any(|&l| l != 0) {
            return None;
        }
        Some(Self([wide[0], wide[1], wide[2], wide[3]]))
    }

    /// Floor division; `None` on division by zero.
    pub fn checked_div(&self, rhs: &Self) -> Option<Self> {
        self.checked_div_rem(rhs).map(|(q, _)| q)
    }

    pub fn checked_rem(&self, rhs: &Self) -> Option<Self> {
        self.checked_div_rem(rhs).map(|(_, r)| r)
    }

    /// Quotient and remainder by binary long division.
    pub fn checked_div_rem(&self, rhs: &Self) -> Option<(Self, Self)> {
        if rhs.is_zero() {
            return None;
        }
        if self < rhs {
            return Some((Self::ZERO, *self));
        }

        let mut quotient = Self::ZERO;
        let mut remainder = Self::ZERO;

        for i in (0..self.bit_len()).rev() {
            let spilled = remainder.bit(255);
            remainder = remainder.shl1();
            if self.bit(i) {
                remainder.0[0] |= 1;
            }
            // `spilled` means the true remainder is >= 2^256 > rhs; the
            // wrapping subtraction below still yields the exact result.
            if spilled || remainder >= *rhs {
                remainder = remainder.overflowing_sub(rhs).0;
                quotient.set_bit(i);
            }
        }

        Some((quotient, remainder))
    }

    /// Get bit at position
    pub fn bit(&self, pos: u32) -> bool {
        if pos >= 256 {
            return false;
        }
        (self.0[(pos / 64) as usize] >> (pos % 64)) & 1 != 0
    }

    /// Position of highest set bit + 1
    pub fn bit_len(&self) -> u32 {
        for i in (0..4).rev() {
            if self.0[i] != 0 {
                return (i as u32 + 1) * 64 - self.0[i].leading_zeros();
            }
        }
        0
    }

    /// Lossy conversion for gauges and log output.
    pub fn to_f64_lossy(&self) -> f64 {
        self.0
            .iter()
            .rev()
            .fold(0.0f64, |acc, &limb| acc.mul_add(2f64.powi(64), limb as f64))
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (i, limb) in self.0.iter().rev().enumerate() {
            bytes[i * 8..(i + 1) * 8].copy_from_slice(&limb.to_be_bytes());
        }
        bytes
    }

    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        let mut limbs = [0u64; 4];
        for (i, chunk) in bytes.chunks_exact(8).enumerate() {
            let mut limb = [0u8; 8];
            limb.copy_from_slice(chunk);
            limbs[3 - i] = u64::from_be_bytes(limb);
        }
        Self(limbs)
    }

    /// Parse a base-10 string of ASCII digits.
    pub fn from_decimal_str(s: &str) -> Result<Self, TypesError> {
        if s.is_empty() {
            return Err(TypesError::InvalidAmount(s.to_string()));
        }

        let ten = Self::from_u64(10);
        s.chars().try_fold(Self::ZERO, |acc, c| {
            let digit = c
                .to_digit(10)
                .ok_or_else(|| TypesError::InvalidAmount(s.to_string()))?;
            acc.checked_mul(&ten)
                .and_then(|v| v.checked_add(&Self::from_u64(digit as u64)))
                .ok_or(TypesError::AmountOverflow)
        })
    }

    fn overflowing_add(&self, rhs: &Self) -> (Self, bool) {
        let mut result = [0u64; 4];
        let mut carry = false;
        for i in 0..4 {
            let (s1, o1) = self.0[i].overflowing_add(rhs.0[i]);
            let (s2, o2) = s1.overflowing_add(carry as u64);
            result[i] = s2;
            carry = o1 || o2;
        }
        (Self(result), carry)
    }

    fn overflowing_sub(&self, rhs: &Self) -> (Self, bool) {
        let mut result = [0u64; 4];
        let mut borrow = false;
        for i in 0..4 {
            let (d1, u1) = self.0[i].overflowing_sub(rhs.0[i]);
            let (d2, u2) = d1.overflowing_sub(borrow as u64);
            result[i] = d2;
            borrow = u1 || u2;
        }
        (Self(result), borrow)
    }

    fn shl1(&self) -> Self {
        Self([
            self.0[0] << 1,
            (self.0[1] << 1) | (self.0[0] >> 63),
            (self.0[2] << 1) | (self.0[1] >> 63),
            (self.0[3] << 1) | (self.0[2] >> 63),
        ])
    }

    fn set_bit(&mut self, pos: u32) {
        self.0[(pos / 64) as usize] |= 1 << (pos % 64);
    }
}

impl From<u8> for U256 {
    fn from(val: u8) -> Self {
        Self::from_u64(val as u64)
    }
}

impl From<u64> for U256 {
    fn from(val: u64) -> Self {
        Self::from_u64(val)
    }
}

impl From<u128> for U256 {
    fn from(val: u128) -> Self {
        Self::from_u128(val)
    }
}

impl TryFrom<U256> for u128 {
    type Error = TypesError;

    fn try_from(value: U256) -> Result<Self, Self::Error> {
        if value.0[2] != 0 || value.0[3] != 0 {
            Err(TypesError::AmountOverflow)
        } else {
            Ok((value.0[1] as u128) << 64 | value.0[0] as u128)
        }
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.pad("0");
        }

        let chunk = Self::from_u64(DECIMAL_CHUNK);
        let mut parts = Vec::new();
        let mut n = *self;
        while !n.is_zero() {
            let Some((q, r)) = n.checked_div_rem(&chunk) else {
                return Err(fmt::Error);
            };
            parts.push(r.0[0]);
            n = q;
        }

        let mut s = String::new();
        for (i, part) in parts.iter().rev().enumerate() {
            if i == 0 {
                s.push_str(&part.to_string());
            } else {
                s.push_str(&format!("{:019}", part));
            }
        }
        f.pad(&s)
    }
}

impl fmt::Debug for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U256({})", self)
    }
}

impl fmt::LowerHex for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_be_bytes()))
    }
}

impl FromStr for U256 {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(stripped) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            let padded_hex = if stripped.len() % 2 == 1 {
                format!("0{}", stripped)
            } else {
                stripped.to_string()
            };
            let bytes = hex::decode(padded_hex)?;
            if bytes.len() > 32 {
                return Err(TypesError::AmountOverflow);
            }
            let mut padded = [0u8; 32];
            padded[32 - bytes.len()..].copy_from_slice(&bytes);
            Ok(Self::from_be_bytes(padded))
        } else {
            Self::from_decimal_str(s)
        }
    }
}
