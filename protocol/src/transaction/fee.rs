//! Gas and fee arithmetic for atomic transactions.
//!
//! ```text
//! gas = encoded_len * TX_BYTES_GAS
//!     + signatures  * COST_PER_SIGNATURE
//!     + ATOMIC_TX_INTRINSIC_GAS
//! fee = ceil(gas * base_fee_wei / X2C_RATE)
//! ```
//!
//! The fee rounds *up*. Rounding down would systematically underpay by up to
//! one minor unit and the node rejects an underpaying import outright.

use thiserror::Error;

use crate::config::{ATOMIC_TX_INTRINSIC_GAS, COST_PER_SIGNATURE, TX_BYTES_GAS, X2C_RATE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FeeError {
    /// Gas or fee does not fit its integer type.
    #[error("gas or fee arithmetic overflowed")]
    Overflow,
}

/// Gas for the bytes and signatures of a transaction, before the intrinsic
/// surcharge.
pub fn dynamic_gas(encoded_len: usize, signatures: usize) -> Result<u64, FeeError> {
    let bytes_gas = (encoded_len as u64).checked_mul(TX_BYTES_GAS).ok_or(FeeError::Overflow)?;
    let sig_gas = (signatures as u64)
        .checked_mul(COST_PER_SIGNATURE)
        .ok_or(FeeError::Overflow)?;
    bytes_gas.checked_add(sig_gas).ok_or(FeeError::Overflow)
}

/// Total gas charged for an atomic transaction.
pub fn gas_used(encoded_len: usize, signatures: usize) -> Result<u64, FeeError> {
    dynamic_gas(encoded_len, signatures)?
        .checked_add(ATOMIC_TX_INTRINSIC_GAS)
        .ok_or(FeeError::Overflow)
}

/// Fee in minor units (nAVAX) for `gas` at `base_fee_wei` per unit.
pub fn calculate_fee(gas: u64, base_fee_wei: u128) -> Result<u64, FeeError> {
    let wei = (gas as u128).checked_mul(base_fee_wei).ok_or(FeeError::Overflow)?;
    let fee = wei / X2C_RATE + u128::from(wei % X2C_RATE != 0);
    u64::try_from(fee).map_err(|_| FeeError::Overflow)
}
