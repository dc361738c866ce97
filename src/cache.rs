//! On-disk cache for downloaded item icons.
//!
//! Icon downloads dominate a render pass: a busy shop has 40+ entries and
//! each card needs its icon. Most listings stay in the shop for several
//! days, so the same URLs come back poll after poll.
//!
//! # Design
//!
//! The cache is **content-addressed by URL**: the file name is the SHA-256 of
//! the icon URL, and the file holds the raw downloaded bytes (decoding happens
//! after the lookup, so a corrupt file fails decode and is re-downloaded).
//!
//! ```text
//! .item-shop-cache/
//! └── icons/
//!     ├── 3f2a…c1.img
//!     └── 9b07…4e.img
//! ```
//!
//! Entries not read or written for [`ICON_MAX_AGE`] are swept when the cache
//! is opened and again at most once a day while it is in use, so icons of
//! long-gone listings do not pile up. A hit refreshes the entry's mtime.
//!
//! Pass `--no-cache` to `render` or `run` to bypass it.

use sha2::{Digest, Sha256};
use std::cell::Cell;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

/// Subdirectory of the cache root holding icon files.
const ICON_DIR: &str = "icons";
const ICON_EXTENSION: &str = "img";

/// Entries older than this are removed by the sweep.
pub const ICON_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);
const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// SHA-256 of an icon URL, returned as a hex string.
pub fn hash_url(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"icon\0");
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Downloaded icon bytes keyed by URL.
#[derive(Debug)]
pub struct IconCache {
    dir: PathBuf,
    stats: CacheStats,
    last_sweep: Cell<Instant>,
}

impl IconCache {
    /// Open (creating if needed) the icon cache under `root` and sweep
    /// stale entries.
    pub fn open(root: &Path) -> io::Result<Self> {
        let dir = root.join(ICON_DIR);
        std::fs::create_dir_all(&dir)?;
        let cache = Self {
            dir,
            stats: CacheStats::default(),
            last_sweep: Cell::new(Instant::now()),
        };
        cache.sweep();
        Ok(cache)
    }

    fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.{ICON_EXTENSION}", hash_url(url)))
    }

    /// Cached bytes for `url`, counting a hit or a miss.
    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        let path = self.path_for(url);
        match std::fs::read(&path) {
            Ok(bytes) if !bytes.is_empty() => {
                self.stats.hit();
                touch(&path);
                Some(bytes)
            }
            _ => {
                self.stats.miss();
                None
            }
        }
    }

    /// Store freshly downloaded bytes for `url`.
    pub fn put(&self, url: &str, bytes: &[u8]) -> io::Result<()> {
        std::fs::write(self.path_for(url), bytes)?;
        if self.last_sweep.get().elapsed() >= SWEEP_INTERVAL {
            self.sweep();
        }
        Ok(())
    }

    /// Drop a cached entry, e.g. after it failed to decode.
    pub fn evict(&self, url: &str) {
        let _ = std::fs::remove_file(self.path_for(url));
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Remove entries whose mtime is more than `max_age` ago. Returns the
    /// number of files removed.
    pub fn prune(&self, max_age: Duration) -> io::Result<usize> {
        let now = SystemTime::now();
        let mut removed = 0;
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != ICON_EXTENSION) {
                continue;
            }
            let modified = std::fs::metadata(&path)?.modified()?;
            if now.duration_since(modified).is_ok_and(|age| age > max_age) {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn sweep(&self) {
        self.last_sweep.set(Instant::now());
        match self.prune(ICON_MAX_AGE) {
            Ok(0) => {}
            Ok(removed) => {
                tracing::info!(removed, dir = %self.dir.display(), "Pruned stale icons")
            }
            Err(e) => tracing::warn!(
                dir = %self.dir.display(),
                error = %e,
                "Failed to prune icon cache"
            ),
        }
    }
}

/// Bump the mtime so a used entry survives the sweep.
fn touch(path: &Path) {
    if let Ok(file) = File::options().write(true).open(path) {
        let _ = file.set_modified(SystemTime::now());
    }
}

/// Hit/miss counters for one process run.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: Cell<u32>,
    misses: Cell<u32>,
}

impl CacheStats {
    pub fn hit(&self) {
        self.hits.set(self.hits.get() + 1);
    }

    pub fn miss(&self) {
        self.misses.set(self.misses.get() + 1);
    }

    pub fn hits(&self) -> u32 {
        self.hits.get()
    }

    pub fn misses(&self) -> u32 {
        self.misses.get()
    }

    pub fn total(&self) -> u32 {
        self.hits() + self.misses()
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits() > 0 {
            write!(
                f,
                "{} cached, {} downloaded ({} total)",
                self.hits(),
                self.misses(),
                self.total()
            )
        } else {
            write!(f, "{} downloaded", self.misses())
        }
    }
}
