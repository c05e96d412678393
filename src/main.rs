//! dirmap CLI - Directory Tree Acquisition
//!
//! Scans a directory tree into a typed node tree and prints it as an
//! indented listing or JSON, with streaming and statistics modes.

use clap::Parser;
use dirmap::config::{CliArgs, OutputFormat, ScanSettings};
use dirmap::error::Result;
use dirmap::service::{AcquisitionService, ScanOptions};
use dirmap::tree::Node;
use dirmap::walk::NodeKind;
use humansize::{format_size, BINARY};
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    // Parse CLI arguments
    let args = CliArgs::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: CliArgs) -> Result<()> {
    let settings = ScanSettings::from_cli(&args)?;
    let service = AcquisitionService::new(settings)?;

    // Streaming mode never needs the runtime or the cache.
    if args.stream {
        return run_stream(&service, &args);
    }

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| dirmap::error::DirmapError::config(format!("Failed to create runtime: {}", e)))?;

    if args.stats {
        let stats = rt.block_on(service.stats(&args.path))?;
        match args.format {
            OutputFormat::Json => println!("{}", to_json(&*stats)?),
            OutputFormat::Tree => print_stats(&stats),
        }
    } else {
        let options = ScanOptions {
            max_depth: args.max_depth,
            parallel: args.parallel,
            use_cache: !args.no_cache,
            timeout: None,
        };
        let tree = rt.block_on(service.scan(&args.path, options))?;
        match args.format {
            OutputFormat::Json => println!("{}", to_json(&*tree)?),
            OutputFormat::Tree => {
                print_tree(&tree, 0);
                println!(
                    "\n{} files, {} directories",
                    tree.file_count, tree.dir_count
                );
            }
        }
    }

    if args.cache_stats {
        let stats = service.cache_stats()?;
        println!(
            "\nCache: {}/{} entries, {} hits, {} misses, {} evictions, {} expired",
            stats.entries, stats.capacity, stats.hits, stats.misses, stats.evictions, stats.expired
        );
    }

    Ok(())
}

fn run_stream(service: &AcquisitionService, args: &CliArgs) -> Result<()> {
    for row in service.streaming_scan(&args.path, args.max_depth)? {
        match args.format {
            OutputFormat::Json => println!("{}", to_json(&row)?),
            OutputFormat::Tree => println!(
                "{}{:?}\t{}",
                "  ".repeat(row.depth.saturating_sub(1)),
                row.kind,
                row.path.display()
            ),
        }
    }
    Ok(())
}

fn print_tree(node: &Node, indent: usize) {
    let marker = match node.kind {
        NodeKind::Directory => "/",
        NodeKind::Symlink => " -> (symlink)",
        NodeKind::PermissionError | NodeKind::OtherError => " [!]",
        _ => "",
    };
    let size = node
        .size
        .map(|s| format!("  ({})", format_size(s, BINARY)))
        .unwrap_or_default();
    println!("{}{}{}{}", "  ".repeat(indent), node.name, marker, size);
    for child in &node.children {
        print_tree(child, indent + 1);
    }
}

fn print_stats(stats: &dirmap::service::DirectoryStats) {
    println!("=== Directory Statistics ===");
    println!("Files:       {}", stats.total_files);
    println!("Directories: {}", stats.total_directories);
    println!("Total size:  {}", format_size(stats.total_size_bytes, BINARY));

    if !stats.extension_histogram.is_empty() {
        println!("\nExtensions:");
        for (ext, count) in &stats.extension_histogram {
            println!("  .{:<12} {}", ext, count);
        }
    }

    if !stats.largest_files.is_empty() {
        println!("\nLargest files:");
        for file in &stats.largest_files {
            println!(
                "  {:>10}  {}",
                format_size(file.size, BINARY),
                file.path.display()
            );
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| dirmap::error::DirmapError::config(format!("JSON encoding failed: {}", e)))
}
