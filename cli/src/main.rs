// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Atomix CLI
//!
//! Entry point for the `atomix` binary. Parses arguments, initializes
//! logging, runs one subcommand and prints its result as JSON on stdout.
//!
//! - `decode-batch` — split a block's atomic blob into transactions
//! - `decode-tx`    — decode and verify one signed transaction
//! - `parse-utxo`   — read one hex UTXO
//! - `build-import` — UTXO file in, unsigned import out
//! - `sign`         — unsigned import plus keys in, signed bytes out
//! - `utxos`        — pending imports for addresses (needs a node)
//! - `base-fee`     — current C-Chain base fee (needs a node)
//! - `submit`       — issue signed bytes (needs a node)
//! - `status`       — transaction status (needs a node)
//! - `version`      — print build version information

mod cli;
mod http;
mod logging;
mod summary;

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::json;

use atomix_protocol::batch::BatchDecoder;
use atomix_protocol::client::RpcClient;
use atomix_protocol::config::{DecoderConfig, NetworkParams, CODEC_VERSION};
use atomix_protocol::crypto::cb58;
use atomix_protocol::crypto::secp256k1::signing_key_from_hex;
use atomix_protocol::transaction::{compute_tx_id, verify_atomic_tx, ShortId};
use atomix_protocol::utxo::{parse_utxo_hex, parse_utxos};
use atomix_protocol::{AtomicSdk, AtomicTx};

use cli::{AtomixCli, Commands, NodeArgs};
use http::HttpTransport;
use summary::TxSummary;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = AtomixCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    if let Commands::Version = cli.command {
        print_version();
        return Ok(());
    }

    let network = NetworkParams::by_name(&cli.network)
        .ok_or_else(|| anyhow!("unknown network {:?} (expected mainnet or fuji)", cli.network))?;
    tracing::debug!(network = network.name, network_id = network.network_id, "network selected");

    match cli.command {
        Commands::DecodeBatch(args) => decode_batch(args),
        Commands::DecodeTx(args) => decode_tx(&args.hex),
        Commands::ParseUtxo(args) => {
            let utxo = parse_utxo_hex(&args.hex).context("failed to parse UTXO")?;
            print_json(&utxo)
        }
        Commands::BuildImport(args) => build_import(args, &network).await,
        Commands::Sign(args) => sign(args),
        Commands::Utxos(args) => {
            let sdk = connect(&args.node, &network)?;
            let utxos = sdk.pending_imports(&args.addresses).await?;
            print_json(&utxos)
        }
        Commands::BaseFee(node) => {
            let sdk = connect(&node, &network)?;
            let base_fee = sdk.base_fee().await?;
            print_json(&json!({ "baseFee": base_fee.to_string() }))
        }
        Commands::Submit(args) => {
            let signed = decode_hex(&args.signed).context("signed transaction is not valid hex")?;
            let sdk = connect(&args.node, &network)?;
            let tx_id = sdk.submit(&signed).await?;
            print_json(&json!({ "txId": tx_id }))
        }
        Commands::Status(args) => {
            let sdk = connect(&args.node, &network)?;
            let status = sdk.tx_status(&args.tx_id).await?;
            print_json(&json!({ "txId": args.tx_id, "status": status }))
        }
        Commands::Version => Ok(()),
    }
}

fn decode_batch(args: cli::DecodeBatchArgs) -> Result<()> {
    let blob = match (&args.hex, &args.file) {
        (Some(hex), _) => decode_hex(hex).context("blob is not valid hex")?,
        (None, Some(path)) => read_blob(path)?,
        (None, None) => return Err(anyhow!("pass a hex blob or --file")),
    };

    let decoder = BatchDecoder::new(DecoderConfig {
        max_batch_txs: args.max_txs,
    });
    let report = decoder.decode_report(&blob);
    let transactions: Vec<TxSummary<'_>> = report
        .transactions
        .iter()
        .enumerate()
        .map(|(i, tx)| TxSummary::new(tx, Some(i)))
        .collect();

    print_json(&json!({
        "declaredCount": report.declared_count,
        "decoded": transactions.len(),
        "complete": report.is_complete(),
        "failure": report.failure.as_ref().map(|f| f.to_string()),
        "transactions": transactions,
    }))
}

fn decode_tx(hex: &str) -> Result<()> {
    let bytes = decode_hex(hex).context("transaction is not valid hex")?;
    let tx = AtomicTx::from_bytes(&bytes).context("failed to decode transaction")?;
    let verification = match verify_atomic_tx(&tx) {
        Ok(_) => None,
        Err(e) => Some(e.to_string()),
    };
    print_json(&json!({
        "transaction": TxSummary::new(&tx, None),
        "verified": verification.is_none(),
        "verificationError": verification,
    }))
}

async fn build_import(args: cli::BuildImportArgs, network: &NetworkParams) -> Result<()> {
    let text = std::fs::read_to_string(&args.utxos)
        .with_context(|| format!("failed to read UTXO file {}", args.utxos.display()))?;
    let lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'));
    let utxos = parse_utxos(lines);
    if utxos.is_empty() {
        return Err(anyhow!("no usable UTXOs in {}", args.utxos.display()));
    }

    let destination = ShortId::from_hex(&args.destination).context("destination must be a 20-byte hex address")?;
    let base_fee = match args.base_fee {
        Some(base_fee) => base_fee,
        None => connect(&args.node, network)?
            .base_fee()
            .await
            .context("failed to fetch the base fee; pass --base-fee to build offline")?,
    };

    let sdk = AtomicSdk::for_network((), network)?;
    let built = sdk.build_import(&utxos, destination, base_fee)?;

    print_json(&json!({
        "unsigned": format!("0x{}", hex::encode(&built.bytes)),
        "inputs": built.tx.imported_inputs.len(),
        "inputTotal": built.tx.input_total(),
        "outputTotal": built.tx.output_total(),
        "gas": built.gas,
        "baseFee": base_fee.to_string(),
        "fee": built.fee,
    }))
}

fn sign(args: cli::SignArgs) -> Result<()> {
    let unsigned = decode_hex(&args.unsigned).context("unsigned transaction is not valid hex")?;
    let keys = args
        .keys
        .iter()
        .enumerate()
        .map(|(i, k)| signing_key_from_hex(k).with_context(|| format!("private key #{} is invalid", i + 1)))
        .collect::<Result<Vec<_>>>()?;

    let signed = atomix_protocol::transaction::sign_import(&unsigned, &keys)?;
    let id = compute_tx_id(&signed);
    tracing::info!(tx_id = %id, len = signed.len(), "signed import");

    print_json(&json!({
        "signed": format!("0x{}", hex::encode(&signed)),
        "txId": id,
        "txIdCb58": cb58::encode_id(&id),
    }))
}

/// Builds the SDK over an HTTP transport to `--rpc-url`, or to the
/// network's public API when none is given.
fn connect(node: &NodeArgs, network: &NetworkParams) -> Result<AtomicSdk<RpcClient<HttpTransport>>> {
    let url = node.rpc_url.as_deref().unwrap_or(network.api_url);
    let transport = HttpTransport::new(url, Duration::from_secs(node.rpc_timeout))?;
    tracing::debug!(url, timeout_secs = node.rpc_timeout, "node transport ready");
    Ok(AtomicSdk::for_network(RpcClient::new(transport), network)?)
}

fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    Ok(hex::decode(trimmed)?)
}

/// A blob file holds either hex text or the raw bytes.
fn read_blob(path: &Path) -> Result<Vec<u8>> {
    let raw = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    match std::str::from_utf8(&raw).ok().map(decode_hex) {
        Some(Ok(bytes)) => Ok(bytes),
        _ => Ok(raw),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("atomix {}", env!("CARGO_PKG_VERSION"));
    println!("codec  v{}", CODEC_VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn hex_arguments_accept_prefix() {
        assert_eq!(decode_hex("0xabCD").unwrap(), vec![0xAB, 0xCD]);
        assert_eq!(decode_hex(" 00ff\n").unwrap(), vec![0x00, 0xFF]);
        assert!(decode_hex("0xzz").is_err());
    }

    #[test]
    fn blob_files_may_be_hex_or_raw() {
        let mut hex_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(hex_file, "0x000000000001").unwrap();
        assert_eq!(read_blob(hex_file.path()).unwrap(), vec![0, 0, 0, 0, 0, 1]);

        let mut raw_file = tempfile::NamedTempFile::new().unwrap();
        raw_file.write_all(&[0xFF, 0x00, 0x10]).unwrap();
        assert_eq!(read_blob(raw_file.path()).unwrap(), vec![0xFF, 0x00, 0x10]);
    }

    fn utxo_file() -> tempfile::NamedTempFile {
        use atomix_protocol::transaction::{Id, Utxo};
        use atomix_protocol::utxo::encode_utxo;

        let utxo = Utxo {
            tx_id: Id::new([1; 32]),
            output_index: 0,
            asset_id: atomix_protocol::config::FUJI.avax_asset().unwrap(),
            amount: 5_000_000,
            address: ShortId::new([2; 20]),
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# pending").unwrap();
        writeln!(file, "0x{}", hex::encode(encode_utxo(&utxo))).unwrap();
        file
    }

    fn build_args(utxos: &Path, base_fee: Option<u128>, rpc_url: Option<String>) -> cli::BuildImportArgs {
        cli::BuildImportArgs {
            utxos: utxos.to_path_buf(),
            destination: "0x".to_string() + &"33".repeat(20),
            base_fee,
            node: NodeArgs {
                rpc_url,
                rpc_timeout: 5,
            },
        }
    }

    #[tokio::test]
    async fn build_import_offline_with_explicit_base_fee() {
        let file = utxo_file();
        // An unreachable node proves nothing is fetched.
        let args = build_args(file.path(), Some(25_000_000_000), Some("http://127.0.0.1:1".to_string()));
        build_import(args, &atomix_protocol::config::FUJI).await.unwrap();
    }

    #[tokio::test]
    async fn build_import_fetches_base_fee_when_omitted() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/ext/bc/C/rpc")
            .match_body(mockito::Matcher::PartialJson(json!({"method": "eth_baseFee"})))
            .with_status(200)
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x6fc23ac00"}"#)
            .create_async()
            .await;

        let file = utxo_file();
        build_import(build_args(file.path(), None, Some(server.url())), &atomix_protocol::config::FUJI)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn build_import_reports_unreachable_fee_source() {
        let file = utxo_file();
        let err = build_import(
            build_args(file.path(), None, Some("http://127.0.0.1:1".to_string())),
            &atomix_protocol::config::FUJI,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("--base-fee"), "{}", err);
    }
}
