//! # CLI Interface
//!
//! Argument structure for `atomix`, via `clap` derive. Offline commands
//! (`decode-batch`, `decode-tx`, `parse-utxo`, `sign`) need nothing but
//! their input. `utxos`, `base-fee`, `submit` and `status` talk to a node,
//! and so does `build-import` unless `--base-fee` is given.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::logging::LogFormat;

/// Decode, build and sign C-Chain atomic transactions.
#[derive(Parser, Debug)]
#[command(name = "atomix", about = "C-Chain atomic transaction toolkit", version, propagate_version = true)]
pub struct AtomixCli {
    /// Network preset: mainnet or fuji.
    #[arg(long, global = true, env = "ATOMIX_NETWORK", default_value = "fuji")]
    pub network: String,

    /// Default log filter when RUST_LOG is unset.
    #[arg(long, global = true, env = "ATOMIX_LOG", default_value = "warn")]
    pub log_level: String,

    #[arg(long, global = true, value_enum, env = "ATOMIX_LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a block's atomic blob into a JSON summary per transaction.
    DecodeBatch(DecodeBatchArgs),
    /// Decode one standalone signed transaction.
    DecodeTx(HexArg),
    /// Parse one hex UTXO as served by `avax.getUTXOs`.
    ParseUtxo(HexArg),
    /// Build an unsigned import from a file of hex UTXOs.
    BuildImport(BuildImportArgs),
    /// Sign unsigned import bytes.
    Sign(SignArgs),
    /// List UTXOs waiting in shared memory for the given addresses.
    Utxos(UtxosArgs),
    /// Print the current C-Chain base fee in wei.
    BaseFee(NodeArgs),
    /// Submit signed transaction bytes.
    Submit(SubmitArgs),
    /// Query the status of a submitted transaction.
    Status(StatusArgs),
    /// Print version information and exit.
    Version,
}

/// A single hex payload, `0x` optional.
#[derive(Args, Debug)]
pub struct HexArg {
    pub hex: String,
}

#[derive(Args, Debug)]
pub struct DecodeBatchArgs {
    /// Hex blob. Omit to read `--file`.
    #[arg(required_unless_present = "file")]
    pub hex: Option<String>,

    /// File holding the blob as hex text or raw bytes.
    #[arg(long, short = 'f', conflicts_with = "hex")]
    pub file: Option<PathBuf>,

    /// Largest transaction count accepted from a blob header.
    #[arg(long, default_value_t = atomix_protocol::config::DEFAULT_MAX_BATCH_TXS)]
    pub max_txs: u32,
}

#[derive(Args, Debug)]
pub struct BuildImportArgs {
    /// File with one hex UTXO per line; blank lines and `#` comments skipped.
    #[arg(long, short = 'u')]
    pub utxos: PathBuf,

    /// Destination EVM address, 20 bytes hex.
    #[arg(long, short = 'd')]
    pub destination: String,

    /// Base fee in wei. Fetched from the node when omitted.
    #[arg(long)]
    pub base_fee: Option<u128>,

    #[command(flatten)]
    pub node: NodeArgs,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Unsigned import bytes as produced by `build-import`.
    pub unsigned: String,

    /// Hex private keys, one per input in the body's input order.
    ///
    /// Prefer the environment variable over the flag so keys stay out of
    /// shell history.
    #[arg(long = "key", env = "ATOMIX_PRIVATE_KEY", value_delimiter = ',', required = true, hide_env_values = true)]
    pub keys: Vec<String>,
}

/// Node endpoint shared by the online commands.
#[derive(Args, Debug, Clone)]
pub struct NodeArgs {
    /// Base URL of the node, http or https. Defaults to the network's
    /// public API.
    #[arg(long, env = "ATOMIX_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "ATOMIX_RPC_TIMEOUT", default_value_t = 30)]
    pub rpc_timeout: u64,
}

#[derive(Args, Debug)]
pub struct UtxosArgs {
    /// Bech32 addresses with chain prefix, e.g. C-fuji1...
    #[arg(required = true)]
    pub addresses: Vec<String>,

    #[command(flatten)]
    pub node: NodeArgs,
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Signed transaction hex.
    pub signed: String,

    #[command(flatten)]
    pub node: NodeArgs,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// CB58 transaction ID.
    pub tx_id: String,

    #[command(flatten)]
    pub node: NodeArgs,
}
