//! # Transaction Module
//!
//! Records, bodies, signed transactions, and the build/sign/verify steps
//! around them.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        — IDs, signatures, inputs/outputs, credentials, UTXOs
//! unsigned.rs     — UnsignedImportTx, UnsignedExportTx, UnsignedAtomicTx
//! atomic.rs       — AtomicTx: signed framing, IDs, both decode entry points
//! fee.rs          — Gas and fee arithmetic
//! builder.rs      — ImportTxBuilder: UTXOs in, unsigned import bytes out
//! signing.rs      — Unsigned bytes plus signers in, signed bytes out
//! verification.rs — Structural and signature checks on a signed tx
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build** with [`ImportTxBuilder`] (or [`build_import`]).
//! 2. **Sign** with [`sign_import`]; one signer per input.
//! 3. **Submit** the signed bytes through an external client.
//! 4. **Observe** the transaction come back inside a block's atomic blob,
//!    decoded by [`crate::batch`], and check it with [`verify_atomic_tx`].
//!
//! ## Design Decisions
//!
//! - Transaction IDs are the SHA-256 of the signed encoding, version
//!   included. They are never stored separately from the bytes they hash.
//! - Amounts are `u64` minor units. Fee arithmetic goes through `u128` and
//!   is checked end to end.
//! - Every value type is immutable after construction. Deducting the fee
//!   builds a new body; nothing is patched in place.

pub mod atomic;
pub mod builder;
pub mod fee;
pub mod signing;
pub mod types;
pub mod unsigned;
pub mod verification;

pub use atomic::{append_credentials, compute_tx_id, AtomicTx};
pub use builder::{build_import, BuildError, BuiltImport, ChainIds, ImportTxBuilder};
pub use fee::{calculate_fee, gas_used, FeeError};
pub use signing::{sign_import, sign_unsigned, SigningError};
pub use types::{
    ChainSignature, Credential, EvmInput, EvmOutput, Id, ShortId, TransferableInput, TransferableOutput, TxKind,
    TxStatus, Utxo,
};
pub use unsigned::{UnsignedAtomicTx, UnsignedExportTx, UnsignedImportTx};
pub use verification::{verify_atomic_tx, VerificationError};
