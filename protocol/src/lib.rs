// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Atomix Protocol — Core Library
//!
//! Encode, decode, build and sign the "atomic transactions" a C-Chain block
//! carries in its extra-data region: imports that credit an EVM account with
//! funds exported from another chain, and exports that debit one.
//!
//! The wire format is a linear, big-endian, type-tagged codec with a 2-byte
//! version in front. Transaction IDs are the SHA-256 of the signed bytes and
//! have to match the reference node bit for bit, so every byte width and
//! every field order in here is load-bearing.
//!
//! ## Architecture
//!
//! - **config** — Protocol constants, network presets, decoder limits.
//! - **codec** — Bounds-checked reader, big-endian packer, `Packable`.
//! - **transaction** — Records, unsigned bodies, signed transactions,
//!   fee arithmetic, the import builder, signing and verification.
//! - **batch** — Splits a multi-transaction blob into typed transactions.
//! - **crypto** — SHA-256, CB58 and the secp256k1 signature adapter.
//! - **utxo** — Parser for the UTXO encoding served by the lookup service.
//! - **rpc** — JSON-RPC request/response shapes. No transport.
//! - **client** — Async traits for the external services.
//! - **sdk** — A facade tying the pieces together.
//!
//! ## Ground Rules
//!
//! 1. Every function in the core is pure. No I/O, no global state.
//! 2. Decoders never trust a declared length before checking it against
//!    the bytes actually left.
//! 3. Amounts are `u64` minor units. Fee math runs in `u128`.

pub mod batch;
pub mod client;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod rpc;
pub mod sdk;
pub mod transaction;
pub mod utxo;

pub use batch::{decode_batch, BatchDecoder};
pub use codec::CodecError;
pub use sdk::{AtomicSdk, DetectedImport};
pub use transaction::{AtomicTx, UnsignedAtomicTx, UnsignedExportTx, UnsignedImportTx};
