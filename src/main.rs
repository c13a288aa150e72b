//! ipmac - passive IP/MAC learner CLI.
//!
//! Prints every ARP and IPv6 DAD address claim seen on an interface.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ipmac::{
    Config, ConsoleReporter, FrameSource, HardwareAddress, IpMacLearner, PnetCapture,
    TrackingMode,
};

#[derive(Parser)]
#[command(name = "ipmac")]
#[command(about = "Passively learn IP/MAC bindings from ARP and IPv6 DAD traffic")]
struct Args {
    /// Network interface to listen on (e.g., br0)
    #[arg(short, long)]
    interface: Option<String>,

    /// Hardware address to track (repeatable); all are tracked when none given
    #[arg(short, long = "watch", value_name = "MAC")]
    watch: Vec<HardwareAddress>,

    /// Track every hardware address seen
    #[arg(long)]
    all: bool,

    /// Hand every frame to the extractor, not just ARP/IPv6/VLAN
    #[arg(long)]
    no_prefilter: bool,

    /// Show timestamps and the learned table on exit
    #[arg(short, long)]
    verbose: bool,

    /// List available interfaces and exit
    #[arg(long)]
    list_interfaces: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load().context("Failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if args.list_interfaces {
        for iface in PnetCapture::list_interfaces() {
            println!("{}", iface);
        }
        return Ok(());
    }

    let capture = match args.interface.as_deref().or(config.interface.as_deref()) {
        Some(name) => PnetCapture::new(name),
        None => PnetCapture::on_default_interface(),
    }
    .context("Failed to open capture interface")?
    .with_prefilter(config.prefilter && !args.no_prefilter);

    let mut watch = config.watch.clone();
    watch.extend(args.watch.iter().copied());

    let mode = if args.all || config.track_all || watch.is_empty() {
        TrackingMode::All
    } else {
        TrackingMode::Watched
    };

    tracing::info!(interface = %capture.interface_name(), ?mode, "starting ipmac");

    let reporter = ConsoleReporter::new().with_verbose(args.verbose);
    let mut learner = IpMacLearner::start(Box::new(capture), Box::new(reporter), mode)
        .context("Failed to start learner")?;

    for mac in watch {
        learner.add_mac(mac)?;
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    while running.load(Ordering::SeqCst) && !learner.is_finished() {
        thread::sleep(Duration::from_millis(100));
    }

    let table = learner.snapshot()?;
    let stats = learner.close().context("Capture failed")?;

    if args.verbose {
        println!();
        for (mac, known) in table {
            let ipv4 = known.ipv4.map(|ip| ip.to_string()).unwrap_or_else(|| "-".to_string());
            let ipv6 = known.ipv6.map(|ip| ip.to_string()).unwrap_or_else(|| "-".to_string());
            println!("{}  {:<15}  {}", mac, ipv4, ipv6);
        }
        if let Some(stats) = stats {
            println!(
                "\n{} frames, {} bindings, {} malformed",
                stats.frames, stats.bindings, stats.malformed
            );
        }
    }

    Ok(())
}
