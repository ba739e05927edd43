//! ST-Link Probe Info Tool
//!
//! Discovers an attached ST-Link, prints its variant and sends one command.
//!
//! Usage:
//!   cargo run --example probe_info -- [OPTIONS]
//!
//! Options:
//!   --list            Only list attached probes
//!   --timeout MS      Transfer timeout in ms (default: 200)
//!   --command HEX     Command bytes, e.g. "f1" (default: GET_VERSION)
//!   --rx N            Response length in bytes (default: 6)
//!
//! Set RUST_LOG=stlink_core=trace to see raw bytes on the wire.

use anyhow::{bail, Context, Result};
use stlink_core::config::SessionConfig;
use stlink_core::protocol::{ProbeSession, RusbBus, TransferRequest};
use tracing_subscriber::EnvFilter;

const STLINK_GET_VERSION: u8 = 0xf1;

fn parse_hex(s: &str) -> Result<Vec<u8>> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        bail!("hex string must have an even number of digits: {}", s);
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).with_context(|| format!("bad hex: {}", s)))
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut config = SessionConfig::default();
    let mut command = vec![STLINK_GET_VERSION];
    let mut rx_length = 6usize;
    let mut list_only = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--list" | "-l" => list_only = true,
            "--timeout" | "-t" => {
                i += 1;
                let value = args.get(i).context("--timeout needs a value")?;
                config.timeout_ms = value.parse().context("invalid timeout")?;
            }
            "--command" | "-c" => {
                i += 1;
                command = parse_hex(args.get(i).context("--command needs a value")?)?;
            }
            "--rx" | "-r" => {
                i += 1;
                let value = args.get(i).context("--rx needs a value")?;
                rx_length = value.parse().context("invalid response length")?;
            }
            other => bail!("unknown argument: {}", other),
        }
        i += 1;
    }
    config.validate()?;

    if list_only {
        let bus = RusbBus::new(&config)?;
        let probes = bus.list_probes()?;
        if probes.is_empty() {
            println!("No ST-Link probes attached");
        }
        for probe in probes {
            println!(
                "{:03}:{:03}  ST-Link {}  serial={}",
                probe.bus_number,
                probe.address,
                probe.variant,
                probe.serial_number.as_deref().unwrap_or("?")
            );
        }
        return Ok(());
    }

    let mut session = ProbeSession::open_default(&config)?;
    println!("Connected to ST-Link {}", session.version());

    let request = TransferRequest::new(command)
        .response_length(rx_length)
        .timeout(config.timeout());
    match session.transfer(&request)? {
        Some(reply) => println!("Response: {:02x?}", reply),
        None => println!("No response requested"),
    }

    Ok(())
}
