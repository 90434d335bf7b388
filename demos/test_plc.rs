//! Test TCP connection to a Mobile Racking controller.
//!
//! Usage: cargo run --example test_plc [IP] [PORT] [simple|legacy] [AISLE]
//!
//! Default IP: 1.1.1.2, port 2000, simple protocol. No aisle is opened unless given.

use mobile_racking::plc::PlcClient;
use mobile_racking::report::StatusReport;
use mobile_racking::wms::{self, ProtocolMode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let ip = std::env::args().nth(1).unwrap_or_else(|| "1.1.1.2".to_string());
    let port: u16 = std::env::args().nth(2).and_then(|s| s.parse().ok()).unwrap_or(2000);
    let mode: ProtocolMode = match std::env::args().nth(3) {
        Some(s) => s.parse().map_err(anyhow::Error::msg)?,
        None => ProtocolMode::Simple,
    };
    let aisle: Option<i32> = std::env::args().nth(4).and_then(|s| s.parse().ok());

    println!("Testing TCP connection to {ip}:{port} ({mode} protocol)");
    println!("======================================");

    let mut client = PlcClient::new(&ip, port, 10, mode);

    println!("\n[1] Diagnosing...");
    let diagnosis = client.diagnose_connection().await;
    print!("{diagnosis}");
    if !diagnosis.tcp_reachable {
        anyhow::bail!("Controller not reachable");
    }

    println!("\n[2] Requesting status...");
    println!("    TX: {}", wms::encode_status_request(mode));
    let status = client.fetch_status().await?;
    println!("    RX: {}", mobile_racking::report::format_hex(status.raw()));
    println!("    Words: {:?}", status.words());
    println!();
    print!("{}", StatusReport(&status));

    if let Some(aisle) = aisle {
        println!("\n[3] Opening aisle {aisle}...");
        println!("    TX: {}", wms::encode_open_aisle(aisle, mode)?);
        client.connect().await?;
        let result = client.open_aisle(aisle).await;
        client.disconnect().await?;
        let status = result?;
        println!("    Aisle to open: {}", status.aisle_to_open);
        println!("    Last open aisle: {}", status.last_open_aisle);
    }

    println!("\n======================================");
    println!("Done!");

    Ok(())
}
