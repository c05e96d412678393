//! The acquisition service facade
//!
//! Validates paths, consults the result cache, and dispatches traversal
//! to a bounded blocking pool so the caller's scheduler never blocks on
//! filesystem latency. Cache failures degrade to uncached operation and
//! never fail a scan.

use crate::cache::{fingerprint, CacheStats, ResultCache};
use crate::config::ScanSettings;
use crate::error::{DirmapError, Result};
use crate::filter::ExclusionFilter;
use crate::service::{derive_stats, DirectoryStats};
use crate::tree::{Node, TreeAssembler};
use crate::walk::{ScanStrategy, ScanStream, TraversalEngine};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Values held by the shared result cache
#[derive(Clone)]
pub enum CachedResult {
    /// An assembled scan tree
    Tree(Arc<Node>),
    /// Derived directory statistics
    Stats(Arc<DirectoryStats>),
}

/// Per-call scan options
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    /// Depth override; the settings default applies when absent
    pub max_depth: Option<usize>,
    /// Use the concurrent traversal strategy
    pub parallel: bool,
    /// Consult and populate the result cache
    pub use_cache: bool,
    /// Caller-imposed deadline for the traversal itself
    ///
    /// On expiry the scan fails with `ScanTimeout`; the in-flight
    /// traversal runs to completion on the blocking pool and its result
    /// is discarded.
    pub timeout: Option<std::time::Duration>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            parallel: false,
            use_cache: true,
            timeout: None,
        }
    }
}

/// Non-failing structural report for a candidate scan root
#[derive(Debug, Clone, Serialize)]
pub struct PathValidation {
    /// Passed every check
    pub valid: bool,
    /// Path exists
    pub exists: bool,
    /// Path is a directory
    pub is_directory: bool,
    /// Directory contents are listable
    pub readable: bool,
    /// Resolved absolute path
    pub absolute_path: PathBuf,
    /// Human-readable findings for each failed check
    pub errors: Vec<String>,
}

/// Facade over traversal, assembly, and caching
///
/// Owns the only mutable state shared across scans (the result cache)
/// as an explicit instance; construct one per process and hand it to
/// callers instead of reaching for globals.
pub struct AcquisitionService {
    settings: ScanSettings,
    filter: Arc<ExclusionFilter>,
    cache: ResultCache<CachedResult>,
    traversals: AtomicU64,
}

impl AcquisitionService {
    /// Build a service from settings, compiling the exclusion filter once
    pub fn new(settings: ScanSettings) -> Result<Self> {
        let filter = Arc::new(ExclusionFilter::new(&settings.exclude_patterns)?);
        let cache = ResultCache::new(settings.cache_capacity, settings.cache_ttl);
        Ok(Self {
            settings,
            filter,
            cache,
            traversals: AtomicU64::new(0),
        })
    }

    /// The settings this service was built with
    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Scan a directory into an assembled node tree
    ///
    /// The path must exist and be a directory; failures there are
    /// immediate scan-level errors, never cached results. Traversal runs
    /// on the blocking pool; dropping the returned future abandons the
    /// wait while the in-flight traversal runs to completion and its
    /// result is discarded.
    pub async fn scan(&self, path: impl AsRef<Path>, options: ScanOptions) -> Result<Arc<Node>> {
        let root = self.resolve_dir(path.as_ref()).await?;
        let max_depth = options.max_depth.unwrap_or(self.settings.max_depth);
        let key = fingerprint(&root, max_depth, self.filter.patterns());

        if options.use_cache {
            match self.cache.get(&key) {
                Ok(Some(CachedResult::Tree(tree))) => {
                    info!(path = %root.display(), "cache hit for directory scan");
                    return Ok(tree);
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "cache unavailable, scanning uncached"),
            }
        }

        let strategy = if options.parallel {
            ScanStrategy::Concurrent
        } else {
            ScanStrategy::Sequential
        };
        info!(path = %root.display(), max_depth, ?strategy, "scanning directory");

        let tree = {
            let root = root.clone();
            let settings = self.settings.clone();
            let filter = Arc::clone(&self.filter);
            let traversal = self.run_traversal(move || {
                let engine =
                    TraversalEngine::with_filter(&settings, filter).with_max_depth(max_depth);
                let entries = engine.scan(&root, strategy)?;
                Ok(Arc::new(TreeAssembler::assemble(&root, entries)))
            });
            match options.timeout {
                Some(limit) => tokio::time::timeout(limit, traversal)
                    .await
                    .map_err(|_| DirmapError::ScanTimeout(limit.as_secs()))??,
                None => traversal.await?,
            }
        };

        if options.use_cache {
            if let Err(e) = self.cache.set(
                key,
                CachedResult::Tree(Arc::clone(&tree)),
                Some(self.settings.cache_ttl),
            ) {
                warn!(error = %e, "failed to cache scan result");
            }
        }

        debug!(
            files = tree.file_count,
            directories = tree.dir_count,
            "directory scan complete"
        );
        Ok(tree)
    }

    /// Aggregate statistics for a directory, cached under the stats TTL
    pub async fn stats(&self, path: impl AsRef<Path>) -> Result<Arc<DirectoryStats>> {
        let root = self.resolve_dir(path.as_ref()).await?;
        let max_depth = self.settings.max_depth;
        let key = format!(
            "stats:{}",
            fingerprint(&root, max_depth, self.filter.patterns())
        );

        match self.cache.get(&key) {
            Ok(Some(CachedResult::Stats(stats))) => {
                info!(path = %root.display(), "cache hit for directory stats");
                return Ok(stats);
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "cache unavailable, computing stats uncached"),
        }

        let stats = {
            let root = root.clone();
            let settings = self.settings.clone();
            let filter = Arc::clone(&self.filter);
            let top_n = self.settings.stats_top_n;
            self.run_traversal(move || {
                let engine =
                    TraversalEngine::with_filter(&settings, filter).with_max_depth(max_depth);
                let entries = engine.scan_sequential(&root)?;
                Ok(Arc::new(derive_stats(&entries, top_n)))
            })
            .await?
        };

        if let Err(e) = self.cache.set(
            key,
            CachedResult::Stats(Arc::clone(&stats)),
            Some(self.settings.stats_ttl),
        ) {
            warn!(error = %e, "failed to cache directory stats");
        }

        Ok(stats)
    }

    /// Lazily walk a directory, yielding `(path, kind, depth)` rows
    ///
    /// Finite and not restartable; for callers that process entries
    /// incrementally without holding a full tree in memory. The stream
    /// performs blocking filesystem reads as it is pulled.
    pub fn streaming_scan(
        &self,
        path: impl AsRef<Path>,
        max_depth: Option<usize>,
    ) -> Result<ScanStream> {
        let root = self.resolve_dir_blocking(path.as_ref())?;
        let max_depth = max_depth.unwrap_or(self.settings.max_depth);
        let engine = TraversalEngine::with_filter(&self.settings, Arc::clone(&self.filter))
            .with_max_depth(max_depth);
        Ok(engine.stream(root))
    }

    /// Check whether a path is accessible and scannable, without failing
    pub fn validate_path(&self, path: impl AsRef<Path>) -> PathValidation {
        let path = path.as_ref();
        let absolute_path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let mut report = PathValidation {
            valid: false,
            exists: false,
            is_directory: false,
            readable: false,
            absolute_path,
            errors: Vec::new(),
        };

        let metadata = match std::fs::metadata(&report.absolute_path) {
            Ok(md) => md,
            Err(e) => {
                report.errors.push(match e.kind() {
                    std::io::ErrorKind::NotFound => "Path does not exist".to_string(),
                    _ => format!("OS error: {}", e),
                });
                return report;
            }
        };
        report.exists = true;

        if !metadata.is_dir() {
            report.errors.push("Path is not a directory".to_string());
            return report;
        }
        report.is_directory = true;

        match std::fs::read_dir(&report.absolute_path) {
            Ok(_) => {
                report.readable = true;
                report.valid = true;
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                report.errors.push("Permission denied".to_string());
            }
            Err(e) => report.errors.push(format!("OS error: {}", e)),
        }
        report
    }

    /// Cache statistics snapshot
    pub fn cache_stats(&self) -> Result<CacheStats> {
        self.cache.stats()
    }

    /// Drop all cached results
    pub fn cache_clear(&self) -> Result<()> {
        self.cache.clear()
    }

    /// The underlying result cache, for introspection and sweeps
    pub fn cache(&self) -> &ResultCache<CachedResult> {
        &self.cache
    }

    /// Number of real traversals performed (cache hits excluded)
    pub fn traversal_count(&self) -> u64 {
        self.traversals.load(Ordering::Relaxed)
    }

    /// Run one traversal closure on the blocking pool
    async fn run_traversal<T>(&self, work: impl FnOnce() -> Result<T> + Send + 'static) -> Result<T>
    where
        T: Send + 'static,
    {
        self.traversals.fetch_add(1, Ordering::Relaxed);
        match tokio::task::spawn_blocking(work).await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(DirmapError::Cancelled),
            Err(e) => Err(DirmapError::WorkerPool(e.to_string())),
        }
    }

    /// Resolve and validate a scan root (async path)
    async fn resolve_dir(&self, path: &Path) -> Result<PathBuf> {
        let root = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| DirmapError::from_root_io(path, e))?;
        let metadata = tokio::fs::metadata(&root)
            .await
            .map_err(|e| DirmapError::from_root_io(&root, e))?;
        if !metadata.is_dir() {
            return Err(DirmapError::NotADirectory(root));
        }
        Ok(root)
    }

    /// Resolve and validate a scan root (blocking path)
    fn resolve_dir_blocking(&self, path: &Path) -> Result<PathBuf> {
        let root =
            std::fs::canonicalize(path).map_err(|e| DirmapError::from_root_io(path, e))?;
        let metadata =
            std::fs::metadata(&root).map_err(|e| DirmapError::from_root_io(&root, e))?;
        if !metadata.is_dir() {
            return Err(DirmapError::NotADirectory(root));
        }
        Ok(root)
    }
}

impl std::fmt::Debug for AcquisitionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquisitionService")
            .field("settings", &self.settings)
            .field("traversals", &self.traversal_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walk::NodeKind;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn service() -> AcquisitionService {
        AcquisitionService::new(ScanSettings {
            workers: 2,
            ..ScanSettings::default()
        })
        .unwrap()
    }

    /// root/
    ///   file1.txt  "Hello World"
    ///   file2.py   "print('Hello')"
    ///   subdir/nested_file.md
    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("file1.txt"))
            .unwrap()
            .write_all(b"Hello World")
            .unwrap();
        File::create(dir.path().join("file2.py"))
            .unwrap()
            .write_all(b"print('Hello')")
            .unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();
        File::create(dir.path().join("subdir/nested_file.md"))
            .unwrap()
            .write_all(b"# Nested File")
            .unwrap();
        dir
    }

    #[tokio::test]
    async fn test_scan_basic_tree() {
        let svc = service();
        let dir = fixture();

        let tree = svc.scan(dir.path(), ScanOptions::default()).await.unwrap();
        assert_eq!(tree.kind, NodeKind::Directory);
        assert_eq!(tree.file_count, 3);
        assert_eq!(tree.dir_count, 1);

        // Canonical child order: directories first, then names.
        let names: Vec<&str> = tree.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["subdir", "file1.txt", "file2.py"]);
    }

    #[tokio::test]
    async fn test_scan_is_idempotent_through_cache() {
        let svc = service();
        let dir = fixture();

        let first = svc.scan(dir.path(), ScanOptions::default()).await.unwrap();
        let second = svc.scan(dir.path(), ScanOptions::default()).await.unwrap();

        assert_eq!(first, second);
        // The second call must not have traversed the filesystem again.
        assert_eq!(svc.traversal_count(), 1);
        let stats = svc.cache_stats().unwrap();
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn test_scan_without_cache_traverses_each_time() {
        let svc = service();
        let dir = fixture();
        let options = ScanOptions {
            use_cache: false,
            ..ScanOptions::default()
        };

        svc.scan(dir.path(), options).await.unwrap();
        svc.scan(dir.path(), options).await.unwrap();
        assert_eq!(svc.traversal_count(), 2);
    }

    #[tokio::test]
    async fn test_depth_override_changes_cache_key() {
        let svc = service();
        let dir = fixture();

        svc.scan(dir.path(), ScanOptions::default()).await.unwrap();
        let shallow = svc
            .scan(
                dir.path(),
                ScanOptions {
                    max_depth: Some(1),
                    ..ScanOptions::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(svc.traversal_count(), 2);
        // Depth 1 cuts below the subdirectory.
        let subdir = shallow.children.iter().find(|c| c.name == "subdir").unwrap();
        assert!(subdir.children.iter().all(|c| c.kind == NodeKind::MaxDepth));
    }

    #[tokio::test]
    async fn test_sequential_and_parallel_agree() {
        let svc = service();
        let dir = fixture();

        let sequential = svc
            .scan(
                dir.path(),
                ScanOptions {
                    use_cache: false,
                    ..ScanOptions::default()
                },
            )
            .await
            .unwrap();
        let parallel = svc
            .scan(
                dir.path(),
                ScanOptions {
                    use_cache: false,
                    parallel: true,
                    ..ScanOptions::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(sequential, parallel);
    }

    #[tokio::test]
    async fn test_missing_path_is_scan_level_error() {
        let svc = service();
        let err = svc
            .scan("/definitely/not/here", ScanOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DirmapError::PathNotFound(_)));
    }

    #[tokio::test]
    async fn test_file_root_is_not_a_directory() {
        let svc = service();
        let dir = fixture();
        let err = svc
            .scan(dir.path().join("file1.txt"), ScanOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DirmapError::NotADirectory(_)));
    }

    #[tokio::test]
    async fn test_stats_aggregates() {
        let svc = service();
        let dir = fixture();

        let stats = svc.stats(dir.path()).await.unwrap();
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_directories, 1);
        assert_eq!(
            stats.total_size_bytes,
            11 + 14 + 13 // file1.txt + file2.py + nested_file.md
        );
        assert_eq!(stats.extension_histogram.get("txt"), Some(&1));
        assert_eq!(stats.extension_histogram.get("py"), Some(&1));
        assert_eq!(stats.extension_histogram.get("md"), Some(&1));
        assert_eq!(stats.largest_files[0].name, "file2.py");

        // Second call is served from the cache.
        svc.stats(dir.path()).await.unwrap();
        assert_eq!(svc.traversal_count(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stats_survive_unreadable_subdirectory() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("a.txt"))
            .unwrap()
            .write_all(&[0u8; 10])
            .unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        File::create(dir.path().join("sub/b.py"))
            .unwrap()
            .write_all(&[0u8; 20])
            .unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        let as_root = fs::read_dir(&locked).is_ok();

        let svc = service();
        let stats = svc.stats(dir.path()).await.unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.total_directories, 2); // sub + locked, despite the denial
        assert_eq!(stats.total_size_bytes, 30);

        if !as_root {
            // The denial surfaced as an error-kind node, not a failed scan.
            let tree = svc
                .scan(
                    dir.path(),
                    ScanOptions {
                        use_cache: false,
                        ..ScanOptions::default()
                    },
                )
                .await
                .unwrap();
            let locked_node = tree.children.iter().find(|c| c.name == "locked").unwrap();
            assert_eq!(locked_node.children[0].kind, NodeKind::PermissionError);
        }
    }

    #[tokio::test]
    async fn test_streaming_scan_yields_rows() {
        let svc = service();
        let dir = fixture();

        let rows: Vec<_> = svc.streaming_scan(dir.path(), None).unwrap().collect();
        assert_eq!(rows.len(), 4);
        assert!(rows
            .iter()
            .any(|r| r.kind == NodeKind::File && r.path.ends_with("subdir/nested_file.md")));
    }

    #[tokio::test]
    async fn test_validate_path_reports() {
        let svc = service();
        let dir = fixture();

        let ok = svc.validate_path(dir.path());
        assert!(ok.valid && ok.exists && ok.is_directory && ok.readable);
        assert!(ok.errors.is_empty());

        let missing = svc.validate_path("/nonexistent/path");
        assert!(!missing.valid && !missing.exists);
        assert_eq!(missing.errors, vec!["Path does not exist".to_string()]);

        let file = svc.validate_path(dir.path().join("file1.txt"));
        assert!(file.exists && !file.is_directory && !file.valid);
    }

    #[tokio::test]
    async fn test_cache_clear_forces_rescan() {
        let svc = service();
        let dir = fixture();

        svc.scan(dir.path(), ScanOptions::default()).await.unwrap();
        svc.cache_clear().unwrap();
        svc.scan(dir.path(), ScanOptions::default()).await.unwrap();
        assert_eq!(svc.traversal_count(), 2);
    }

    #[tokio::test]
    async fn test_elapsed_deadline_is_a_timeout() {
        let svc = service();
        let dir = fixture();

        let err = svc
            .scan(
                dir.path(),
                ScanOptions {
                    timeout: Some(std::time::Duration::ZERO),
                    ..ScanOptions::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DirmapError::ScanTimeout(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_cycle_terminates() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        File::create(dir.path().join("sub/inner.txt")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("sub"), dir.path().join("link")).unwrap();

        let svc = service();
        let tree = svc
            .scan(
                dir.path(),
                ScanOptions {
                    max_depth: Some(50),
                    ..ScanOptions::default()
                },
            )
            .await
            .unwrap();

        let link = tree.children.iter().find(|c| c.name == "link").unwrap();
        assert_eq!(link.kind, NodeKind::Symlink);
        assert!(link.children.is_empty());
    }
}
