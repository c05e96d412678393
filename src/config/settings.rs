//! Configuration settings for dirmap
//!
//! Defines the runtime scan/cache settings, their defaults, and the CLI
//! arguments the `dirmap` binary maps onto them.

use crate::error::{DirmapError, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default maximum recursion depth
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Default worker pool size for concurrent scans
pub const DEFAULT_WORKERS: usize = 4;

/// Directories are only fanned out to the pool above this nesting level
pub const DEFAULT_PARALLEL_DEPTH: usize = 2;

/// Minimum entry count before a directory's children are fanned out
pub const DEFAULT_PARALLEL_MIN_ENTRIES: usize = 5;

/// Default result cache capacity
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Default TTL for cached scan trees
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default TTL for cached directory statistics
///
/// Statistics go stale faster than structure and are cheap to recompute.
pub const DEFAULT_STATS_TTL: Duration = Duration::from_secs(60);

/// Root entry count above which sequential scans show a progress bar
pub const DEFAULT_PROGRESS_THRESHOLD: usize = 100;

/// Number of largest files reported by directory statistics
pub const DEFAULT_STATS_TOP_N: usize = 10;

/// Names excluded from every scan unless overridden
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    ".git",
    "__pycache__",
    ".DS_Store",
    "node_modules",
    ".venv",
    "venv",
    "env",
    "build",
    "dist",
    "target",
    "*.egg-info",
    "cache",
    ".cache",
    "secrets",
    ".idea",
    ".vscode",
    ".trunk",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
];

/// Runtime settings for scanning and caching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Maximum recursion depth (root = 0)
    pub max_depth: usize,
    /// Worker pool size for concurrent scans (0 = auto-detect)
    pub workers: usize,
    /// Depth below which subdirectories are dispatched to the pool
    pub parallel_depth: usize,
    /// Minimum kept entries in a directory before its subdirectories fan out
    pub parallel_min_entries: usize,
    /// Name patterns excluded from traversal (literal or `*`/`?` wildcards)
    pub exclude_patterns: Vec<String>,
    /// Maximum number of cached results
    pub cache_capacity: usize,
    /// TTL for cached scan trees
    pub cache_ttl: Duration,
    /// TTL for cached directory statistics
    pub stats_ttl: Duration,
    /// Root entry count above which sequential scans report progress
    pub progress_threshold: usize,
    /// Number of largest files tracked by `stats`
    pub stats_top_n: usize,
    /// Show a progress bar for large sequential scans
    pub show_progress: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            workers: DEFAULT_WORKERS,
            parallel_depth: DEFAULT_PARALLEL_DEPTH,
            parallel_min_entries: DEFAULT_PARALLEL_MIN_ENTRIES,
            exclude_patterns: default_exclude_patterns(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl: DEFAULT_CACHE_TTL,
            stats_ttl: DEFAULT_STATS_TTL,
            progress_threshold: DEFAULT_PROGRESS_THRESHOLD,
            stats_top_n: DEFAULT_STATS_TOP_N,
            show_progress: false,
        }
    }
}

impl ScanSettings {
    /// Resolve the worker pool size, applying auto-detection
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        }
    }

    /// Build settings from parsed CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        let mut patterns = if args.no_default_excludes {
            Vec::new()
        } else {
            default_exclude_patterns()
        };
        patterns.extend(args.exclude.iter().cloned());

        let cache_ttl = parse_duration(&args.cache_ttl)?;

        Ok(Self {
            max_depth: args.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
            workers: args.workers,
            exclude_patterns: patterns,
            cache_ttl,
            show_progress: args.progress,
            ..Self::default()
        })
    }
}

/// The default exclusion pattern set as owned strings
pub fn default_exclude_patterns() -> Vec<String> {
    DEFAULT_EXCLUDE_PATTERNS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Parse a human-readable duration string ("300s", "5m")
pub fn parse_duration(value: &str) -> Result<Duration> {
    humantime::parse_duration(value)
        .map_err(|e| DirmapError::config(format!("Invalid duration '{}': {}", value, e)))
}

/// Output format for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Indented text tree
    #[default]
    Tree,
    /// JSON document for the web front ends
    Json,
}

/// dirmap - directory tree acquisition for diagram and web front ends
#[derive(Parser, Debug, Clone)]
#[command(name = "dirmap")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scan a directory tree into a typed, cached node tree")]
#[command(long_about = r#"
dirmap walks a directory tree under depth, exclusion, and symlink constraints
and assembles a typed node tree suitable for diagram generators and web
visualizers. Scan results are memoized in a TTL/LRU cache keyed by
(path, depth, exclusion set).

Examples:
  dirmap /src                          # Text tree, default depth
  dirmap /src -d 3 --format json       # JSON tree for front ends
  dirmap /src --parallel --workers 8   # Concurrent traversal
  dirmap /src --stats                  # Aggregate statistics
  dirmap /src --stream                 # Incremental (path, kind, depth) rows
"#)]
pub struct CliArgs {
    /// Directory to scan
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Maximum recursion depth
    #[arg(short = 'd', long, value_name = "DEPTH", env = "DIRMAP_MAX_DEPTH")]
    pub max_depth: Option<usize>,

    /// Use the concurrent traversal strategy
    #[arg(short = 'p', long)]
    pub parallel: bool,

    /// Worker pool size (0 = auto-detect)
    #[arg(short = 'w', long, default_value = "0", value_name = "NUM", env = "DIRMAP_WORKERS")]
    pub workers: usize,

    /// Additional exclusion pattern (repeatable, literal or wildcard)
    #[arg(short = 'e', long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Start from an empty exclusion set instead of the built-in defaults
    #[arg(long)]
    pub no_default_excludes: bool,

    /// Print aggregate statistics instead of the tree
    #[arg(long)]
    pub stats: bool,

    /// Stream entries incrementally instead of assembling a tree
    #[arg(long)]
    pub stream: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "tree", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Bypass the result cache
    #[arg(long)]
    pub no_cache: bool,

    /// TTL for cached scan trees
    #[arg(long, default_value = "300s", value_name = "DURATION", env = "DIRMAP_CACHE_TTL")]
    pub cache_ttl: String,

    /// Show a progress bar for large sequential scans
    #[arg(long)]
    pub progress: bool,

    /// Print cache statistics after the operation
    #[arg(long)]
    pub cache_stats: bool,
}
