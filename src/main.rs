use bitcoin::Network;
use bitcoin_tx_summary::chunk::EncodedChunk;
use bitcoin_tx_summary::summary::TransactionSummary;
use bitcoin_tx_summary::{DecodeOptions, Error, Result, RpcClient, RpcConfig, fetch_with, from_tx};
use clap::Parser;
use colored::*;
use log::info;
use prettytable::{Cell, Row, Table, format};
use std::fs;

#[derive(Parser, Debug)]
#[command(name = "bitcoin-tx-summary")]
#[command(author, version, about = "Summarize Bitcoin transactions as compact JSON", long_about = None)]
struct Args {
    /// Transaction id to fetch from the node
    #[arg(
        value_name = "HASH",
        required_unless_present_any = ["tx", "file"],
        conflicts_with_all = ["tx", "file"]
    )]
    hash: Option<String>,

    /// Hex-encoded transaction string
    #[arg(short, long, value_name = "HEX", conflicts_with = "file")]
    tx: Option<String>,

    /// File containing hex-encoded transaction
    #[arg(short, long, value_name = "FILE", conflicts_with = "tx")]
    file: Option<String>,

    /// Ask the node for confirmations and coinbase data
    #[arg(short, long)]
    verbose: bool,

    /// Also emit every data push as hex (`h<idx>` fields)
    #[arg(short = 'x', long = "hex")]
    hex: bool,

    /// Network used to render addresses
    #[arg(short, long, default_value_t = Network::Bitcoin)]
    network: Network,

    /// Print an overview table instead of JSON
    #[arg(long)]
    table: bool,

    /// RPC user (overrides BITCOIN_USERNAME)
    #[arg(long, value_name = "USER")]
    rpc_user: Option<String>,

    /// RPC password (overrides BITCOIN_PASSWORD)
    #[arg(long, value_name = "PASSWORD")]
    rpc_password: Option<String>,

    /// RPC host (overrides BITCOIN_IP)
    #[arg(long, value_name = "HOST")]
    rpc_host: Option<String>,

    /// RPC port (overrides BITCOIN_PORT)
    #[arg(long, value_name = "PORT")]
    rpc_port: Option<u16>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("{} {}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let options = DecodeOptions {
        confirmations: None,
        hex: args.hex,
        network: args.network,
    };

    let summary = if let Some(hash) = &args.hash {
        let config = rpc_config(&args)?;
        info!("fetching {} from {}", hash, config.url());
        let client = RpcClient::new(&config);
        fetch_with(&client, hash, args.verbose, &options).await?
    } else {
        from_tx(&raw_transaction(&args)?, &options)?
    };

    if args.table {
        display_summary(&summary);
    } else {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

/// Environment first, then command-line overrides
fn rpc_config(args: &Args) -> Result<RpcConfig> {
    let mut config = RpcConfig::from_env()?;
    if let Some(user) = &args.rpc_user {
        config.user = user.clone();
    }
    if let Some(password) = &args.rpc_password {
        config.password = password.clone();
    }
    if let Some(host) = &args.rpc_host {
        config.host = host.clone();
    }
    if let Some(port) = args.rpc_port {
        config.port = port;
    }
    Ok(config)
}

fn raw_transaction(args: &Args) -> Result<String> {
    match (&args.tx, &args.file) {
        (Some(hex_str), _) => Ok(hex_str.clone()),
        (None, Some(file_path)) => Ok(fs::read_to_string(file_path)?.trim().to_string()),
        (None, None) => Err(Error::Config(
            "provide a HASH, --tx <HEX> or --file <FILE>".to_string(),
        )),
    }
}

fn chunk_labels(chunks: &[EncodedChunk]) -> String {
    chunks
        .iter()
        .map(EncodedChunk::label)
        .collect::<Vec<_>>()
        .join(" ")
}

fn display_summary(summary: &TransactionSummary) {
    // Transaction Overview
    println!(
        "\n{} {}",
        "📋".bold(),
        "TRANSACTION OVERVIEW".green().bold()
    );
    println!("{}", "─".repeat(70).green());

    let mut overview = Table::new();
    overview.set_format(*format::consts::FORMAT_CLEAN);

    overview.add_row(Row::new(vec![
        Cell::new("Transaction ID (txid)").style_spec("Fb"),
        Cell::new(&summary.tx.txid).style_spec("Fc"),
    ]));
    overview.add_row(Row::new(vec![
        Cell::new("Lock Time").style_spec("Fb"),
        Cell::new(&summary.lock.to_string()).style_spec("Fw"),
    ]));
    if let Some(confirmations) = summary.confirmations {
        overview.add_row(Row::new(vec![
            Cell::new("Confirmations").style_spec("Fb"),
            Cell::new(&confirmations.to_string()).style_spec("Fw"),
        ]));
    }
    if let Some(coinbase) = &summary.coinbase {
        overview.add_row(Row::new(vec![
            Cell::new("Coinbase").style_spec("Fb"),
            Cell::new(coinbase).style_spec("Fy"),
        ]));
    }
    if let Some(raw) = &summary.tx.raw {
        overview.add_row(Row::new(vec![
            Cell::new("Size").style_spec("Fb"),
            Cell::new(&format!("{} bytes", raw.len() / 2)).style_spec("Fw"),
        ]));
    }

    overview.printstd();

    // Inputs
    println!(
        "\n{} {} ({})",
        "📥".bold(),
        "INPUTS".blue().bold(),
        summary.inputs.len().to_string().yellow().bold()
    );
    println!("{}", "─".repeat(70).blue());

    for input in &summary.inputs {
        println!(
            "\n{} {}",
            "Input".blue().bold(),
            format!("#{}", input.index).yellow()
        );

        let mut input_table = Table::new();
        input_table.set_format(*format::consts::FORMAT_CLEAN);

        input_table.add_row(Row::new(vec![
            Cell::new("  Previous TX").style_spec("Fb"),
            Cell::new(&input.sender.prev_txid).style_spec("Fw"),
        ]));
        input_table.add_row(Row::new(vec![
            Cell::new("  Output Index").style_spec("Fb"),
            Cell::new(&input.sender.prev_index.to_string()).style_spec("Fw"),
        ]));
        input_table.add_row(Row::new(vec![
            Cell::new("  Sequence").style_spec("Fb"),
            Cell::new(&format!("{:#010x}", input.sequence)).style_spec("Fw"),
        ]));
        if let Some(address) = &input.sender.address {
            input_table.add_row(Row::new(vec![
                Cell::new("  Sender").style_spec("Fb"),
                Cell::new(address).style_spec("Fc"),
            ]));
        }
        input_table.add_row(Row::new(vec![
            Cell::new("  Script Chunks").style_spec("Fb"),
            Cell::new(&chunk_labels(&input.chunks)).style_spec("Fd"),
        ]));

        input_table.printstd();
    }

    // Outputs
    println!(
        "\n{} {} ({})",
        "📤".bold(),
        "OUTPUTS".magenta().bold(),
        summary.outputs.len().to_string().yellow().bold()
    );
    println!("{}", "─".repeat(70).magenta());

    for output in &summary.outputs {
        println!(
            "\n{} {}",
            "Output".magenta().bold(),
            format!("#{}", output.index).yellow()
        );

        let mut output_table = Table::new();
        output_table.set_format(*format::consts::FORMAT_CLEAN);

        let btc_value = output.receiver.value as f64 / 100_000_000.0;
        output_table.add_row(Row::new(vec![
            Cell::new("  Value").style_spec("Fb"),
            Cell::new(&format!(
                "{:.8} BTC ({} satoshis)",
                btc_value, output.receiver.value
            ))
            .style_spec("Fy"),
        ]));
        if let Some(address) = &output.receiver.address {
            output_table.add_row(Row::new(vec![
                Cell::new("  Receiver").style_spec("Fb"),
                Cell::new(address).style_spec("Fc"),
            ]));
        }
        output_table.add_row(Row::new(vec![
            Cell::new("  Script Chunks").style_spec("Fb"),
            Cell::new(&chunk_labels(&output.chunks)).style_spec("Fg"),
        ]));

        output_table.printstd();
    }

    // Summary
    println!("\n{} {}", "💰".bold(), "SUMMARY".yellow().bold());
    println!("{}", "─".repeat(70).yellow());

    let mut totals = Table::new();
    totals.set_format(*format::consts::FORMAT_CLEAN);

    let total_output: u64 = summary.outputs.iter().map(|o| o.receiver.value).sum();
    let total_btc = total_output as f64 / 100_000_000.0;
    totals.add_row(Row::new(vec![
        Cell::new("Total Output Value").style_spec("Fb"),
        Cell::new(&format!("{:.8} BTC ({} satoshis)", total_btc, total_output)).style_spec("Fy"),
    ]));
    totals.add_row(Row::new(vec![
        Cell::new("Number of Inputs").style_spec("Fb"),
        Cell::new(&summary.inputs.len().to_string()).style_spec("Fw"),
    ]));
    totals.add_row(Row::new(vec![
        Cell::new("Number of Outputs").style_spec("Fb"),
        Cell::new(&summary.outputs.len().to_string()).style_spec("Fw"),
    ]));

    totals.printstd();

    println!("\n{}", "═".repeat(70).cyan().bold());
    println!();
}
