//! cnutil CLI
//!
//! Command-line access to the pool primitives.
//!
//! # Commands
//!
//! - `convert-blob` - Build the hashing blob of a serialized block
//! - `validate-address` - Check an address (optionally against the pool's)
//! - `hash` - CryptoNight slow hash
//! - `fast-hash` - Keccak-256, or the block id of a hashing blob
//! - `difficulty` - Difficulty of a hash
//! - `target` - Compact job target for a share difficulty
//! - `benchmark` - Run performance benchmark

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fmt::Display;
use std::time::Instant;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cnutil::algorithm::{ITERATIONS, SCRATCHPAD_SIZE};
use cnutil::report::{
    AddressReport, BlobReport, DifficultyReport, HashReport, TargetReport, decode_hex,
};
use cnutil::{CryptoNight, Variant};

/// Share blob used as benchmark input; the nonce sits at bytes 39..43
const BENCHMARK_BLOB: &str = "01009091e4aa05ff5fe4801727ed0c1b8b339e1a0054d75568fec6ba9c4346e88b10d59edbf6858b2b00008a63b2865b65b84d28bb31feb057b16a21e2eda4bf6cc6377e3310af04debe4a01";
const NONCE_OFFSET: usize = 39;

#[derive(Parser)]
#[command(name = "cnutil")]
#[command(version)]
#[command(about = "CryptoNote hashing blobs, address validation and CryptoNight")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a serialized block (hex) into its hashing blob
    ConvertBlob {
        /// Raw block bytes as hex
        block: String,
    },

    /// Validate a wallet address
    ValidateAddress {
        address: String,

        /// Also require the address to match the pool's network and length
        #[arg(long, env = "CNUTIL_POOL_ADDRESS")]
        pool_address: Option<String>,
    },

    /// Compute the CryptoNight slow hash of hex input
    Hash {
        input: String,

        /// Algorithm variant (values above 2 select 2)
        #[arg(short, long, env = "CNUTIL_VARIANT", default_value = "0")]
        variant: u8,

        /// Pick the variant from the blob's major version byte (overrides --variant)
        #[arg(long)]
        auto_variant: bool,
    },

    /// Compute the Keccak-256 fast hash of hex input
    FastHash {
        input: String,

        /// Treat the input as a hashing blob and print its block id
        #[arg(long)]
        block_id: bool,
    },

    /// Show the difficulty of a 32-byte hash
    Difficulty {
        hash: String,

        /// Also check the hash against this difficulty
        #[arg(short, long)]
        target: Option<u64>,
    },

    /// Show the compact job target for a share difficulty
    Target { difficulty: u64 },

    /// Run performance benchmark
    Benchmark {
        /// Number of hashes to compute
        #[arg(short, long, default_value = "20")]
        count: u32,

        /// Number of threads to use (default: number of CPU cores)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Algorithm variant
        #[arg(short, long, env = "CNUTIL_VARIANT", default_value = "2")]
        variant: u8,
    },
}

fn main() {
    // Logs go to stderr so JSON output stays parseable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    let result = match cli.command {
        Commands::ConvertBlob { block } => cmd_convert_blob(&block, json),
        Commands::ValidateAddress {
            address,
            pool_address,
        } => cmd_validate_address(&address, pool_address.as_deref(), json),
        Commands::Hash {
            input,
            variant,
            auto_variant,
        } => cmd_hash(&input, variant, auto_variant, json),
        Commands::FastHash { input, block_id } => cmd_fast_hash(&input, block_id, json),
        Commands::Difficulty { hash, target } => cmd_difficulty(&hash, target, json),
        Commands::Target { difficulty } => emit(&TargetReport::new(difficulty), json),
        Commands::Benchmark {
            count,
            threads,
            variant,
        } => cmd_benchmark(count, threads, variant),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print a report as text or pretty JSON
fn emit<T: Serialize + Display>(report: &T, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report);
    }
    Ok(())
}

fn cmd_convert_blob(block: &str, json: bool) -> anyhow::Result<()> {
    let report = BlobReport::from_hex(block)?;
    emit(&report, json)
}

fn cmd_validate_address(address: &str, pool_address: Option<&str>, json: bool) -> anyhow::Result<()> {
    let report = AddressReport::new(address, pool_address);
    emit(&report, json)?;

    if !report.valid || report.pool_match == Some(false) {
        std::process::exit(2);
    }
    Ok(())
}

fn cmd_hash(input: &str, variant: u8, auto_variant: bool, json: bool) -> anyhow::Result<()> {
    let data = decode_hex(input)?;

    let variant = if auto_variant {
        let major = data
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("--auto-variant needs a non-empty hashing blob"))?;
        Variant::from_major_version(major)
    } else {
        Variant::from(variant)
    };
    tracing::debug!(%variant, len = data.len(), "computing slow hash");

    let mut hasher = CryptoNight::new();
    emit(&HashReport::slow(&mut hasher, &data, variant), json)
}

fn cmd_fast_hash(input: &str, block_id: bool, json: bool) -> anyhow::Result<()> {
    let data = decode_hex(input)?;
    let report = if block_id {
        HashReport::block_id(&data)
    } else {
        HashReport::fast(&data)
    };
    emit(&report, json)
}

fn cmd_difficulty(hash: &str, target: Option<u64>, json: bool) -> anyhow::Result<()> {
    emit(&DifficultyReport::from_hex(hash, target)?, json)
}

fn cmd_benchmark(count: u32, threads: Option<usize>, variant: u8) -> anyhow::Result<()> {
    let variant = Variant::from(variant);
    let num_threads = threads.unwrap_or_else(num_cpus::get).max(1);
    let blob = decode_hex(BENCHMARK_BLOB)?;

    println!(
        "Running benchmark with {} hashes on {} threads (variant {})...",
        count, num_threads, variant
    );

    let start = Instant::now();

    // Each worker owns its scratchpad and hashes a disjoint nonce range
    std::thread::scope(|scope| {
        for worker in 0..num_threads {
            let mut input = blob.clone();
            scope.spawn(move || {
                let mut hasher = CryptoNight::new();
                for nonce in worker_nonces(worker, num_threads, count) {
                    input[NONCE_OFFSET..NONCE_OFFSET + 4].copy_from_slice(&nonce.to_le_bytes());
                    let _ = hasher.hash(&input, variant);
                }
                tracing::debug!(worker, "benchmark worker finished");
            });
        }
    });

    let elapsed = start.elapsed();
    let hashrate = count as f64 / elapsed.as_secs_f64();

    println!("\nResults:");
    println!("  Total hashes: {}", count);
    println!("  Time elapsed: {:.2}s", elapsed.as_secs_f64());
    println!("  Hashrate: {:.2} H/s", hashrate);

    // Memory info
    println!("\nAlgorithm parameters:");
    println!("  Scratchpad per thread: {} KB", SCRATCHPAD_SIZE / 1024);
    println!(
        "  Total memory: {} MB",
        num_threads * SCRATCHPAD_SIZE / (1024 * 1024)
    );
    println!("  Mixing iterations: {}", ITERATIONS);

    Ok(())
}

/// Nonces `worker, worker + threads, ...` below `count`
fn worker_nonces(worker: usize, threads: usize, count: u32) -> impl Iterator<Item = u32> {
    let start = u32::try_from(worker).unwrap_or(u32::MAX);
    (start..count).step_by(threads.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_nonces_partition() {
        let mut all: Vec<u32> = (0..3).flat_map(|w| worker_nonces(w, 3, 10)).collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());

        // More workers than hashes
        assert_eq!(worker_nonces(5, 8, 3).count(), 0);
    }

    #[test]
    fn test_worker_nonces_near_u32_max() {
        let mut odd = worker_nonces(1, 2, u32::MAX);
        assert_eq!(odd.nth(0x7fff_fffe), Some(u32::MAX - 2));
        assert_eq!(odd.next(), None);

        let mut fourth = worker_nonces(0, 4, u32::MAX);
        assert_eq!(fourth.nth(0x3fff_ffff), Some(u32::MAX - 3));
        assert_eq!(fourth.next(), None);
    }
}
