//! Traversal engine with sequential and concurrent strategies
//!
//! Both strategies honor the same depth, exclusion, and symlink policy
//! and produce equivalent entry sets; they differ only in how directory
//! listings are scheduled. The concurrent strategy fans subdirectories
//! out to a bounded worker pool near the root and falls back to
//! sequential recursion deeper down, where directories are many and
//! small and dispatch overhead would dominate.

use crate::config::ScanSettings;
use crate::error::{DirmapError, Result};
use crate::filter::ExclusionFilter;
use crate::progress::ScanProgress;
use crate::walk::{Entry, NodeKind, ScanStream};
use crossbeam::channel::{unbounded, Sender};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, warn};

/// Execution strategy for one scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanStrategy {
    /// Depth-first on the calling thread
    #[default]
    Sequential,
    /// Bounded worker pool with near-root fan-out
    Concurrent,
}

/// Walks a root path to a bounded depth, producing typed entries
pub struct TraversalEngine {
    filter: Arc<ExclusionFilter>,
    max_depth: usize,
    workers: usize,
    parallel_depth: usize,
    parallel_min_entries: usize,
    progress_threshold: usize,
    show_progress: bool,
}

impl TraversalEngine {
    /// Create an engine, compiling the exclusion filter from settings
    pub fn new(settings: &ScanSettings) -> Result<Self> {
        let filter = Arc::new(ExclusionFilter::new(&settings.exclude_patterns)?);
        Ok(Self::with_filter(settings, filter))
    }

    /// Create an engine around an already-compiled filter
    ///
    /// The filter is shared read-only by every worker of a scan; sharing
    /// one across engines keeps its per-name memo warm between scans.
    pub fn with_filter(settings: &ScanSettings, filter: Arc<ExclusionFilter>) -> Self {
        Self {
            filter,
            max_depth: settings.max_depth,
            workers: settings.effective_workers(),
            parallel_depth: settings.parallel_depth,
            parallel_min_entries: settings.parallel_min_entries,
            progress_threshold: settings.progress_threshold,
            show_progress: settings.show_progress,
        }
    }

    /// Override the maximum depth for this engine
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The exclusion filter in use
    pub fn filter(&self) -> &Arc<ExclusionFilter> {
        &self.filter
    }

    /// Scan `root` with the given strategy
    pub fn scan(&self, root: &Path, strategy: ScanStrategy) -> Result<Vec<Entry>> {
        match strategy {
            ScanStrategy::Sequential => self.scan_sequential(root),
            ScanStrategy::Concurrent => self.scan_concurrent(root),
        }
    }

    /// Lazily walk `root`, yielding `(path, kind, depth)` rows
    pub fn stream(&self, root: PathBuf) -> ScanStream {
        ScanStream::new(root, Arc::clone(&self.filter), self.max_depth)
    }

    /// Depth-first scan on the calling thread
    ///
    /// A failure to read the root is a scan-level error; failures below
    /// the root become placeholder entries and the scan continues.
    pub fn scan_sequential(&self, root: &Path) -> Result<Vec<Entry>> {
        let started = Instant::now();
        let mut entries = Vec::new();

        if self.max_depth == 0 {
            entries.push(Entry::max_depth(root, 1));
            return Ok(entries);
        }

        let read = fs::read_dir(root).map_err(|e| DirmapError::from_root_io(root, e))?;
        let children: Vec<_> = read.collect();

        let progress = if self.show_progress && children.len() > self.progress_threshold {
            ScanProgress::new(children.len() as u64)
        } else {
            ScanProgress::disabled()
        };

        {
            let mut sink = |e: Entry| entries.push(e);
            for dent in children {
                match dent {
                    Ok(de) => visit_child(&self.filter, self.max_depth, de, root, 0, &mut sink),
                    Err(e) => {
                        warn!(path = %root.display(), error = %e, "error listing directory");
                        sink(Entry::unreadable_dir(root, 1, &e));
                    }
                }
                progress.inc();
            }
        }
        progress.finish();

        debug!(
            path = %root.display(),
            entries = entries.len(),
            elapsed = ?started.elapsed(),
            "sequential scan complete"
        );
        Ok(entries)
    }

    /// Concurrent scan over a bounded worker pool
    ///
    /// Each job lists exactly one directory and either enqueues its
    /// subdirectories as new jobs (shallow, wide directories) or recurses
    /// sequentially within the owning worker (deep or small ones). Jobs
    /// never wait on other jobs, so the bounded pool cannot deadlock; an
    /// idle worker picks up whatever subtree is pending next.
    pub fn scan_concurrent(&self, root: &Path) -> Result<Vec<Entry>> {
        let started = Instant::now();

        if self.max_depth == 0 {
            return Ok(vec![Entry::max_depth(root, 1)]);
        }

        // Listed up front so a root-level failure stays scan-level.
        let read = fs::read_dir(root).map_err(|e| DirmapError::from_root_io(root, e))?;

        let workers = self.workers.max(1);
        let (jobs_tx, jobs_rx) = unbounded::<Job>();
        let (out_tx, out_rx) = unbounded::<Entry>();

        let ctx = Arc::new(WorkerCtx {
            filter: Arc::clone(&self.filter),
            max_depth: self.max_depth,
            parallel_depth: self.parallel_depth,
            parallel_min_entries: self.parallel_min_entries,
            jobs: jobs_tx,
            pending: AtomicUsize::new(1),
            workers,
        });

        let mut handles = Vec::with_capacity(workers);
        for i in 0..workers {
            let rx = jobs_rx.clone();
            let tx = out_tx.clone();
            let worker_ctx = Arc::clone(&ctx);
            let handle = thread::Builder::new()
                .name(format!("dirmap-walk-{}", i))
                .spawn(move || {
                    while let Ok(job) = rx.recv() {
                        match job {
                            Job::Scan { dir, depth } => {
                                worker_ctx.process_dir(&dir, depth, &tx);
                                worker_ctx.finish_job();
                            }
                            Job::Quit => break,
                        }
                    }
                });
            match handle {
                Ok(h) => handles.push(h),
                Err(e) => {
                    for _ in 0..handles.len() {
                        let _ = ctx.jobs.send(Job::Quit);
                    }
                    return Err(DirmapError::WorkerPool(e.to_string()));
                }
            }
        }

        // The root listing is the seed job, processed on the calling thread.
        ctx.process_read(root, 0, read, &out_tx);
        ctx.finish_job();

        drop(out_tx);
        let entries: Vec<Entry> = out_rx.iter().collect();
        for handle in handles {
            let _ = handle.join();
        }

        debug!(
            path = %root.display(),
            entries = entries.len(),
            workers,
            elapsed = ?started.elapsed(),
            "concurrent scan complete"
        );
        Ok(entries)
    }
}

impl std::fmt::Debug for TraversalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraversalEngine")
            .field("max_depth", &self.max_depth)
            .field("workers", &self.workers)
            .field("parallel_depth", &self.parallel_depth)
            .field("parallel_min_entries", &self.parallel_min_entries)
            .finish()
    }
}

/// Work item for the concurrent strategy
enum Job {
    /// List one directory at the given depth
    Scan { dir: PathBuf, depth: usize },
    /// Poison pill, one per worker
    Quit,
}

/// State shared by the coordinator and all pool workers of one scan
struct WorkerCtx {
    filter: Arc<ExclusionFilter>,
    max_depth: usize,
    parallel_depth: usize,
    parallel_min_entries: usize,
    jobs: Sender<Job>,
    pending: AtomicUsize,
    workers: usize,
}

impl WorkerCtx {
    /// List `dir` and emit its children, dispatching or recursing per policy
    fn process_dir(&self, dir: &Path, depth: usize, out: &Sender<Entry>) {
        if depth >= self.max_depth {
            let _ = out.send(Entry::max_depth(dir, depth + 1));
            return;
        }
        match fs::read_dir(dir) {
            Ok(read) => self.process_read(dir, depth, read, out),
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "error listing directory");
                let _ = out.send(Entry::unreadable_dir(dir, depth + 1, &e));
            }
        }
    }

    fn process_read(&self, dir: &Path, depth: usize, read: fs::ReadDir, out: &Sender<Entry>) {
        let mut subdirs = Vec::new();
        let mut kept = 0usize;

        for dent in read {
            let de = match dent {
                Ok(de) => de,
                Err(e) => {
                    warn!(path = %dir.display(), error = %e, "error listing directory");
                    let _ = out.send(Entry::unreadable_dir(dir, depth + 1, &e));
                    continue;
                }
            };
            let name = de.file_name().to_string_lossy().into_owned();
            if self.filter.should_exclude(&name) {
                continue;
            }
            let entry = Entry::from_dir_entry(&de, dir, depth + 1, name);
            kept += 1;
            if entry.kind == NodeKind::Directory {
                subdirs.push(entry.path.clone());
            }
            let _ = out.send(entry);
        }

        // Fan out only near the root and only when the directory is wide
        // enough for dispatch to beat plain recursion.
        let fan_out = depth < self.parallel_depth && kept > self.parallel_min_entries;
        for sub in subdirs {
            if fan_out {
                self.dispatch(sub, depth + 1);
            } else {
                self.process_dir(&sub, depth + 1, out);
            }
        }
    }

    fn dispatch(&self, dir: PathBuf, depth: usize) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.jobs.send(Job::Scan { dir, depth }).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Mark one job done; the last one out signals the pool to drain
    fn finish_job(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            for _ in 0..self.workers {
                let _ = self.jobs.send(Job::Quit);
            }
        }
    }
}

/// Recursive sequential walk below an already-emitted directory entry
fn walk_children(
    filter: &ExclusionFilter,
    max_depth: usize,
    dir: &Path,
    depth: usize,
    sink: &mut dyn FnMut(Entry),
) {
    if depth >= max_depth {
        sink(Entry::max_depth(dir, depth + 1));
        return;
    }
    match fs::read_dir(dir) {
        Ok(read) => {
            for dent in read {
                match dent {
                    Ok(de) => visit_child(filter, max_depth, de, dir, depth, sink),
                    Err(e) => {
                        warn!(path = %dir.display(), error = %e, "error listing directory");
                        sink(Entry::unreadable_dir(dir, depth + 1, &e));
                    }
                }
            }
        }
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "error listing directory");
            sink(Entry::unreadable_dir(dir, depth + 1, &e));
        }
    }
}

/// Classify one listed child and recurse into it if it is a directory
fn visit_child(
    filter: &ExclusionFilter,
    max_depth: usize,
    de: fs::DirEntry,
    parent: &Path,
    parent_depth: usize,
    sink: &mut dyn FnMut(Entry),
) {
    let name = de.file_name().to_string_lossy().into_owned();
    if filter.should_exclude(&name) {
        return;
    }
    let entry = Entry::from_dir_entry(&de, parent, parent_depth + 1, name);
    let recurse = entry.kind == NodeKind::Directory;
    let path = entry.path.clone();
    let depth = entry.depth;
    sink(entry);
    if recurse {
        walk_children(filter, max_depth, &path, depth, sink);
    }
}
