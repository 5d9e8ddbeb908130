//! `picoevb` — command-line interface for the PicoEVB RDMA driver.
//!
//! ```text
//! USAGE:
//!   picoevb info                         Card information
//!   picoevb sweep [--direction c2h|h2c]  Throughput sweep
//!   picoevb dump [--cap BYTES]           Timed card read + hex dump
//!   picoevb words [--bytes BYTES]        Card read as 32-bit words
//!   picoevb mmap-test                    BAR mmap smoke test
//!
//! GLOBAL:
//!   --device PATH      DMA device node (default /dev/picoevb)
//!   --backend KIND     auto | kernel | software
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use picoevb_driver::abi::limits::{
    DEVICE_PATH, MMAP_TEST_PATTERN, MMAP_TEST_SIZE, ONESHOT_MAX_TRANSFER_SIZE,
    READ_TRANSFER_SIZE, SWEEP_MAX_TRANSFER_SIZE, SWEEP_REPEAT_COUNT, USER_DEVICE_PATH,
};
use picoevb_driver::hexdump::{HexDump, WordDump};
use picoevb_driver::oneshot::{read_words, timed_card_read};
use picoevb_driver::{
    select_backend, BackendSelection, Direction, DmaBackend, SweepConfig, ThroughputSweep,
    WallClock,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "picoevb", about = "PicoEVB RDMA driver CLI", version)]
struct Cli {
    /// DMA device node.
    #[arg(long, global = true, default_value = DEVICE_PATH)]
    device: String,

    /// Backend to run transfers on.
    #[arg(long, global = true, value_enum, default_value_t = Backend::Kernel)]
    backend: Backend,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    /// Kernel driver if present, software card otherwise.
    Auto,
    /// Kernel driver only.
    Kernel,
    /// In-memory software card.
    Software,
}

impl From<Backend> for BackendSelection {
    fn from(b: Backend) -> Self {
        match b {
            Backend::Auto => Self::Auto,
            Backend::Kernel => Self::Kernel,
            Backend::Software => Self::Software,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    /// Card to host.
    C2h,
    /// Host to card.
    H2c,
}

impl From<DirectionArg> for Direction {
    fn from(d: DirectionArg) -> Self {
        match d {
            DirectionArg::C2h => Self::C2H,
            DirectionArg::H2c => Self::H2C,
        }
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Print card information.
    Info,
    /// Measure DMA throughput over doubling transfer sizes.
    Sweep {
        /// Transfer direction.
        #[arg(long, value_enum, default_value_t = DirectionArg::C2h)]
        direction: DirectionArg,
        /// Largest transfer in bytes.
        #[arg(long, default_value_t = SWEEP_MAX_TRANSFER_SIZE)]
        max_size: u64,
        /// Transfers timed per size.
        #[arg(long, default_value_t = SWEEP_REPEAT_COUNT)]
        repeats: u32,
        /// Number of sizes (default: log2 of --max-size).
        #[arg(long)]
        steps: Option<u32>,
        /// Stop at the first size that reaches --max-size.
        #[arg(long)]
        stop_at_cap: bool,
        /// Skip the per-size progress lines.
        #[arg(long, short)]
        quiet: bool,
    },
    /// Read card RAM once, print the rate and a hex dump.
    Dump {
        /// Upper bound on bytes read.
        #[arg(long, default_value_t = ONESHOT_MAX_TRANSFER_SIZE)]
        cap: u64,
    },
    /// Read card RAM once and print 32-bit words.
    Words {
        /// Bytes to read (multiple of 4).
        #[arg(long, default_value_t = READ_TRANSFER_SIZE)]
        bytes: usize,
    },
    /// Map the user BAR and store a test pattern to word 0.
    MmapTest {
        /// User BAR device node.
        #[arg(long, default_value = USER_DEVICE_PATH)]
        path: String,
        /// Bytes to map.
        #[arg(long, default_value_t = MMAP_TEST_SIZE)]
        size: usize,
        /// Pattern to store (decimal or 0x-prefixed hex).
        #[arg(long, value_parser = parse_u32, default_value_t = MMAP_TEST_PATTERN)]
        pattern: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Cmd::MmapTest {
            path,
            size,
            pattern,
        } => cmd_mmap_test(&path, size, pattern),
        command => run_on_backend(cli.backend.into(), &cli.device, command),
    }
}

fn run_on_backend(selection: BackendSelection, device: &str, command: Cmd) -> Result<()> {
    let ram_size = software_ram_size(&command)?;
    let mut backend = select_backend(selection, device, ram_size)
        .with_context(|| format!("cannot open {device}"))?;
    tracing::info!("{} backend ready", backend.backend_type());

    match command {
        Cmd::Info => cmd_info(backend.as_mut())?,
        Cmd::Sweep {
            direction,
            max_size,
            repeats,
            steps,
            stop_at_cap,
            quiet,
        } => {
            let mut config = SweepConfig::default()
                .with_max_transfer_size(max_size)
                .with_repeat_count(repeats)
                .with_stop_at_cap(stop_at_cap);
            config.step_count = steps;
            cmd_sweep(backend.as_mut(), direction.into(), config, quiet)?;
        }
        Cmd::Dump { cap } => cmd_dump(backend.as_mut(), cap)?,
        Cmd::Words { bytes } => cmd_words(backend.as_mut(), bytes)?,
        Cmd::MmapTest {
            path,
            size,
            pattern,
        } => cmd_mmap_test(&path, size, pattern)?,
    }

    backend.shutdown().context("close() failed")?;
    Ok(())
}

/// RAM for a software card: the default sweep cap, or more if the sweep
/// asks for larger transfers.
fn software_ram_size(command: &Cmd) -> Result<usize> {
    let bytes = match command {
        Cmd::Sweep { max_size, .. } => (*max_size).max(SWEEP_MAX_TRANSFER_SIZE),
        _ => SWEEP_MAX_TRANSFER_SIZE,
    };
    usize::try_from(bytes).with_context(|| format!("{bytes} bytes does not fit in memory"))
}

fn cmd_info(backend: &mut dyn DmaBackend) -> Result<()> {
    let info = backend.card_info()?;
    println!("Backend      : {}", backend.backend_type());
    println!(
        "FPGA RAM     : {} bytes ({} KiB)",
        info.fpga_ram_size,
        info.fpga_ram_size / 1024
    );
    Ok(())
}

fn cmd_sweep(
    backend: &mut dyn DmaBackend,
    direction: Direction,
    config: SweepConfig,
    quiet: bool,
) -> Result<()> {
    let sweep = ThroughputSweep::new(direction, config);
    let report = sweep.run_with_progress(&mut WallClock::new(backend), |size| {
        if !quiet {
            println!("Test transfer size = {size}");
        }
    })?;

    print!("{report}");

    if let Some(peak) = report.peak() {
        tracing::info!("{direction} peak: {} at {} bytes", peak.throughput(), peak.bytes());
    }
    Ok(())
}

fn cmd_dump(backend: &mut dyn DmaBackend, cap: u64) -> Result<()> {
    let read = timed_card_read(backend, cap)?;
    println!("{}", read.row);
    print!("{}", HexDump(&read.data));
    Ok(())
}

fn cmd_words(backend: &mut dyn DmaBackend, bytes: usize) -> Result<()> {
    let words = read_words(backend, bytes)?;
    print!("{}", WordDump(&words));
    Ok(())
}

fn cmd_mmap_test(path: &str, size: usize, pattern: u32) -> Result<()> {
    picoevb_driver::mmio::mmap_smoke_test(path, size, pattern)?;
    println!("Stored {pattern:#x} to word 0 of {path}");
    Ok(())
}

fn parse_u32(s: &str) -> std::result::Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid u32 '{s}': {e}"))
}
