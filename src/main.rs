use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::Instrument;

use shopfloor::{
    generate_scan_id, init_telemetry, scan_span, EdgefoldStation, HttpMesClient, PackStation,
    SessionLog, ShopfloorConfig,
};

#[derive(Parser)]
#[command(name = "shopfloor")]
#[command(about = "Shop-floor scan stations for validating containers and recording production")]
#[command(
    long_about = "Runs one station session against the MES gateway. Scans are read line by \
                  line from stdin, the way a barcode scanner in keyboard-wedge mode delivers \
                  them. Station parameters come from shopfloor.toml and SHOPFLOOR_* env vars."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the edgefold station (single-unit processing)
    Edgefold {
        /// Override the configured workcenter key
        #[arg(long)]
        workcenter: Option<String>,
    },
    /// Run the pack station (batch accumulation)
    Pack {
        /// Override the configured workcenter key
        #[arg(long)]
        workcenter: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    ShopfloorConfig::load_env_file()?;
    let mut config = ShopfloorConfig::load()?;
    init_telemetry(&config.observability)?;
    match cli.command {
        Commands::Edgefold { workcenter } => {
            if let Some(key) = workcenter {
                config.edgefold.workcenter_key = key;
            }
            run_edgefold(config).await
        }
        Commands::Pack { workcenter } => {
            if let Some(key) = workcenter {
                config.pack.workcenter_key = key;
            }
            run_pack(config).await
        }
    }
}

fn build_client(config: &ShopfloorConfig) -> Result<HttpMesClient> {
    let mut client = HttpMesClient::new(&config.mes.base_url, config.mes.timeout())?;
    if let Some(key) = &config.mes.api_key {
        client = client.with_api_key(key);
    }
    Ok(client)
}

/// Print log entries appended since the last call. Handles the session log
/// being cleared between calls.
fn drain_log(log: &SessionLog, printed: &mut usize) {
    *printed = (*printed).min(log.entries().len());
    for entry in &log.entries()[*printed..] {
        println!("  {}", entry.text);
    }
    *printed = log.entries().len();
}

fn print_context(context: &shopfloor::WorkcenterContext) {
    println!(
        "Workcenter {} [{:?}] part: {} server: {}",
        context.workcenter_key(),
        context.status(),
        context.expected_part_number().unwrap_or("-"),
        context.server().unwrap_or("-"),
    );
}

async fn run_edgefold(config: ShopfloorConfig) -> Result<()> {
    let client = Arc::new(build_client(&config)?);
    let workcenter_key = config.edgefold.workcenter_key.clone();
    let mut station = EdgefoldStation::new(client, config.edgefold);
    let mut printed = 0;

    println!("Edgefold station — workcenter {workcenter_key}");
    station.refresh().await;
    drain_log(station.log(), &mut printed);
    print_context(station.context());
    println!("Scan barcode on substrate label (/refresh reloads, /quit exits):");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => continue,
            "/quit" => break,
            "/refresh" => {
                station.refresh().await;
                drain_log(station.log(), &mut printed);
                print_context(station.context());
            }
            serial => {
                let scan_id = generate_scan_id();
                let span = scan_span("edgefold", &workcenter_key, serial, &scan_id);
                station.scan(serial).instrument(span).await;
                drain_log(station.log(), &mut printed);
            }
        }
    }
    Ok(())
}

async fn run_pack(config: ShopfloorConfig) -> Result<()> {
    let client = Arc::new(build_client(&config)?);
    let workcenter_key = config.pack.workcenter_key.clone();
    let mut station = PackStation::new(client, config.pack);
    let mut printed = 0;

    println!("Pack station — workcenter {workcenter_key}");
    station.refresh().await;
    drain_log(station.log(), &mut printed);
    print_context(station.context());
    println!("Scan barcode on FG label (/pack, /unload <serial>, /list, /refresh, /quit):");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => continue,
            "/quit" => break,
            "/refresh" => {
                station.refresh().await;
                drain_log(station.log(), &mut printed);
                print_context(station.context());
            }
            "/list" => {
                let members = station.accumulator().members();
                println!(
                    "  {}/{} packed: {}",
                    members.len(),
                    station.accumulator().target_quantity(),
                    members.join(", "),
                );
            }
            "/pack" => {
                station.complete().await;
                drain_log(station.log(), &mut printed);
            }
            _ if input.starts_with("/unload ") => {
                let serial = input.trim_start_matches("/unload ").trim();
                station.unload(serial).await;
                drain_log(station.log(), &mut printed);
            }
            serial => {
                let scan_id = generate_scan_id();
                let span = scan_span("pack", &workcenter_key, serial, &scan_id);
                station.scan(serial).instrument(span).await;
                drain_log(station.log(), &mut printed);
                if station.accumulator().is_full() {
                    println!(
                        "  Pack list full ({} of {}). Enter /pack to record the batch.",
                        station.accumulator().len(),
                        station.accumulator().target_quantity(),
                    );
                }
            }
        }
    }
    Ok(())
}
