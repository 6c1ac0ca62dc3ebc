//! ipcountry: CLI tool for resolving IPv4 addresses against a CIDR reference file.

use clap::{Parser, Subcommand};
use ipcountry::{CacheConfig, MalformedLinePolicy, TableCache};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ipcountry")]
#[command(author = "Kaitu.io")]
#[command(version = "0.1.0")]
#[command(about = "Resolve IPv4 addresses to countries using a CIDR reference file", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up one or more addresses
    Lookup {
        /// Reference file (`<cidr>,<country>` per line, optionally .gz)
        #[arg(short, long)]
        table: PathBuf,

        /// Drop malformed reference lines instead of failing
        #[arg(long)]
        skip_malformed: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// IPv4 addresses to resolve
        #[arg(required = true)]
        ips: Vec<String>,
    },

    /// Build the table and print statistics
    Check {
        /// Reference file (`<cidr>,<country>` per line, optionally .gz)
        #[arg(short, long)]
        table: PathBuf,

        /// Drop malformed reference lines instead of failing
        #[arg(long)]
        skip_malformed: bool,
    },
}

#[derive(Serialize)]
struct IpInfo {
    ip: String,
    country: Option<String>,
    error: Option<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Lookup {
            table,
            skip_malformed,
            json,
            ips,
        } => lookup(&table, skip_malformed, json, &ips),
        Commands::Check {
            table,
            skip_malformed,
        } => check(&table, skip_malformed),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn open_cache(skip_malformed: bool) -> TableCache {
    let policy = if skip_malformed {
        MalformedLinePolicy::Skip
    } else {
        MalformedLinePolicy::Abort
    };
    TableCache::with_config(CacheConfig::default().line_policy(policy))
}

fn lookup(
    table: &Path,
    skip_malformed: bool,
    json: bool,
    ips: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let key = table.to_string_lossy();
    let cache = open_cache(skip_malformed);

    // Build up front so a broken table fails once, not per address
    cache.get_or_build(&key)?;

    let results: Vec<IpInfo> = ips
        .iter()
        .map(|ip| match cache.resolve(ip, &key) {
            Ok(country) => IpInfo {
                ip: ip.clone(),
                country: country.map(|c| c.to_string()),
                error: None,
            },
            Err(e) => IpInfo {
                ip: ip.clone(),
                country: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    for info in &results {
        match (&info.country, &info.error) {
            (_, Some(err)) => println!("{}\terror: {}", info.ip, err),
            (Some(country), None) => println!("{}\t{}", info.ip, country),
            (None, None) => println!("{}\t-", info.ip),
        }
    }

    Ok(())
}

fn check(table: &Path, skip_malformed: bool) -> Result<(), Box<dyn std::error::Error>> {
    let key = table.to_string_lossy();
    let loaded = open_cache(skip_malformed).get_or_build(&key)?;
    let table = loaded.table();

    let overlaps = table
        .entries()
        .windows(2)
        .filter(|pair| pair[1].min_addr() <= pair[0].max_addr())
        .count();

    println!("Reference: {}", loaded.key());
    println!("Ranges: {}", table.len());
    println!("Addresses covered: {}", table.address_count());
    if overlaps > 0 {
        println!("Overlapping neighbours: {}", overlaps);
    }

    Ok(())
}
