use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::Hasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use foldlog_types::RenderModel;

use crate::pipeline::{LogInput, Pipeline};

/// One cached render, filled in at most once
struct CacheEntry {
    fingerprint: u64,

    /// Lines the model is rendered from; the fingerprint only narrows the search
    lines: Vec<String>,

    model: Arc<OnceLock<Arc<RenderModel>>>,
}

impl CacheEntry {
    /// True when this entry was rendered from exactly the first `lines.len()` of `log`
    fn covers(&self, fingerprint: u64, log: &[&str]) -> bool {
        self.fingerprint == fingerprint
            && self.lines.len() <= log.len()
            && self.lines.iter().zip(log).all(|(cached, line)| cached.as_str() == *line)
    }
}

/// Fingerprint-keyed cache of render models for one pipeline.
///
/// Concurrent requests for the same log share a single computation. When a log grows
/// by appended lines, the longest cached prefix is extended instead of rendering from
/// scratch.
pub struct RenderCache {
    pipeline: Pipeline,

    /// Most recently used last
    entries: Mutex<VecDeque<CacheEntry>>,

    /// Maximum number of cached models
    capacity: usize,

    hits: AtomicU64,
    extends: AtomicU64,
    misses: AtomicU64,
}

/// Counters for cache effectiveness
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub extends: u64,
    pub misses: u64,
}

impl RenderCache {
    /// Create a cache holding at most `capacity` models
    pub fn new(pipeline: Pipeline, capacity: usize) -> Self {
        Self {
            pipeline,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            extends: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Render through the cache
    pub fn render<'a>(&self, log: impl Into<LogInput<'a>>) -> Arc<RenderModel> {
        let input = log.into();
        let lines = input.lines();
        let prefixes = prefix_fingerprints(&lines);
        let fingerprint = prefixes[lines.len()];

        let (slot, base) = {
            let mut entries = self.entries.lock();
            let position = entries
                .iter()
                .position(|e| e.lines.len() == lines.len() && e.covers(fingerprint, &lines));
            let cached = position.and_then(|pos| entries.remove(pos));

            match cached {
                Some(entry) => {
                    // Move to the back so eviction drops least recently used first
                    let slot = Arc::clone(&entry.model);
                    entries.push_back(entry);
                    (slot, None)
                }
                None => {
                    let base = longest_prefix(&entries, &prefixes, &lines);
                    if entries.len() >= self.capacity {
                        entries.pop_front();
                    }
                    let slot = Arc::new(OnceLock::new());
                    entries.push_back(CacheEntry {
                        fingerprint,
                        lines: lines.iter().map(|line| line.to_string()).collect(),
                        model: Arc::clone(&slot),
                    });
                    (slot, base)
                }
            }
        };

        let mut computed = false;
        let model = slot.get_or_init(|| {
            computed = true;
            let model = match &base {
                Some(previous) => self.pipeline.extend(previous, &lines[previous.line_count()..]),
                None => self.pipeline.render_lines(&lines),
            };
            Arc::new(model)
        });

        let counter = match (computed, base.is_some()) {
            (false, _) => &self.hits,
            (true, true) => &self.extends,
            (true, false) => &self.misses,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        Arc::clone(model)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            extends: self.extends.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// `result[k]` fingerprints the first `k` lines
fn prefix_fingerprints(lines: &[&str]) -> Vec<u64> {
    let mut hasher = DefaultHasher::new();
    let mut prefixes = Vec::with_capacity(lines.len() + 1);
    prefixes.push(hasher.finish());
    for line in lines {
        hasher.write(line.as_bytes());
        hasher.write_u8(0xff);
        prefixes.push(hasher.finish());
    }
    prefixes
}

/// Longest finished model whose lines are a strict prefix of the requested log
fn longest_prefix(
    entries: &VecDeque<CacheEntry>,
    prefixes: &[u64],
    lines: &[&str],
) -> Option<Arc<RenderModel>> {
    entries
        .iter()
        .filter(|e| e.lines.len() < lines.len() && e.covers(prefixes[e.lines.len()], lines))
        .filter_map(|e| e.model.get().cloned())
        .max_by_key(|model| model.line_count())
}
