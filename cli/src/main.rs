//! latticegraph CLI — inspect and validate a block feed dump.
//!
//! Usage:
//! ```bash
//! latticegraph inspect blocks.json
//! latticegraph info
//! ```

use std::env;
use std::fs;
use std::process;

use anyhow::Context;
use latticegraph_core::{IngestCoordinator, InsertOutcome};
use latticegraph_feed::decode_blocks;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "inspect" => {
            let Some(path) = args.get(2) else {
                eprintln!("inspect requires a file path");
                process::exit(1);
            };
            if let Err(err) = cmd_inspect(path) {
                eprintln!("error: {err:#}");
                process::exit(1);
            }
        }
        "info" => cmd_info(),
        "version" | "--version" | "-V" => {
            println!("latticegraph {}", env!("CARGO_PKG_VERSION"));
        }
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    println!("latticegraph {}", env!("CARGO_PKG_VERSION"));
    println!("Block-lattice resolver — reconstructs account chains from unordered feeds\n");
    println!("USAGE:");
    println!("    latticegraph <COMMAND>\n");
    println!("COMMANDS:");
    println!("    inspect <file>  Resolve a JSON block dump and print chains + anomalies");
    println!("    info            Show resolver configuration info");
    println!("    version         Print version");
    println!("    help            Print this help");
}

fn cmd_info() {
    println!("LatticeGraph v{}", env!("CARGO_PKG_VERSION"));
    println!("  Actions: issue, send, receive, open, change, offer, commit, create-order");
    println!("  Edge kinds: chain, transfer, swap-left, swap-right");
    println!("  Fork tie-break: lexicographically smallest hash");
    println!("  State: in-memory only, rebuilt from the feed on each run");
}

fn cmd_inspect(path: &str) -> anyhow::Result<()> {
    let payload = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let blocks = decode_blocks(&payload).context("decoding block payload")?;

    let mut coordinator = IngestCoordinator::new();
    let mut rejected = 0usize;
    for block in blocks {
        if let InsertOutcome::Rejected(_) = coordinator.ingest(block) {
            rejected += 1;
        }
    }

    let graph = coordinator.current_graph();
    println!(
        "{} blocks across {} accounts ({} rejected)",
        graph.block_count(),
        graph.account_count(),
        rejected
    );

    for account in graph.accounts() {
        let summary = &coordinator.account_summaries()[account];
        println!(
            "\n{account}  [{}]  balance {}",
            summary.chain_state, summary.current_balance
        );
        for hash in &summary.ordered_blocks {
            if let Some(block) = graph.block_by_hash(hash) {
                println!("  {hash}  {}", block.action);
            }
        }
        if let Some(chain) = graph.chain_of(account) {
            for pending in chain.pending() {
                println!("  {}  {} (pending)", pending.hash, pending.action);
            }
        }
    }

    let anomalies = graph.anomalies();
    if anomalies.is_empty() {
        println!("\nNo anomalies.");
    } else {
        println!("\n{} anomalies:", anomalies.len());
        for anomaly in anomalies {
            let detail = serde_json::to_string(anomaly)?;
            println!("  [{}] {detail}", anomaly.kind());
        }
    }
    Ok(())
}
