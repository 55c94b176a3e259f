use std::{
    collections::HashMap,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    assets::decode::{ClipDecoder, FfmpegDecoder},
    foundation::{error::SignflowResult, frame::Frame},
};

struct CacheEntry {
    frames: Arc<Vec<Frame>>,
    last_used: u64,
}

/// Memoizing frame-sequence cache keyed by clip path.
///
/// Each distinct path is decoded at most once while resident; repeat loads
/// return the cached `Arc` with no re-decode. The cache is an explicit
/// object owned by the playback session rather than process-global state,
/// and an optional capacity bounds it with least-recently-used eviction
/// (unbounded when no capacity is set, matching the original behavior of
/// keeping every decoded clip for the process lifetime).
pub struct FrameCache {
    decoder: Box<dyn ClipDecoder>,
    capacity: Option<NonZeroUsize>,
    entries: HashMap<PathBuf, CacheEntry>,
    decode_counts: HashMap<PathBuf, u32>,
    tick: u64,
}

impl Default for FrameCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCache {
    /// Unbounded cache over the default ffmpeg decoder.
    pub fn new() -> Self {
        Self::with_decoder(Box::new(FfmpegDecoder))
    }

    /// Cache over a caller-supplied decoder. Tests use this to substitute
    /// a stub that produces synthetic frames.
    pub fn with_decoder(decoder: Box<dyn ClipDecoder>) -> Self {
        Self {
            decoder,
            capacity: None,
            entries: HashMap::new(),
            decode_counts: HashMap::new(),
            tick: 0,
        }
    }

    /// Bound the cache to `capacity` resident clips, evicting the least
    /// recently used entry on overflow.
    pub fn with_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Number of clip sequences currently resident.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no sequences are resident.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many times `path` has been decoded (not served from cache).
    /// Instrumentation for cache-hit tests.
    pub fn decode_count(&self, path: &Path) -> u32 {
        self.decode_counts.get(path).copied().unwrap_or(0)
    }

    /// Load the frame sequence for `path`, decoding on first use.
    ///
    /// A clip that decodes to zero frames is cached and returned as an
    /// empty sequence; callers treat that as "no content to play".
    pub fn load(&mut self, path: &Path) -> SignflowResult<Arc<Vec<Frame>>> {
        self.tick += 1;
        if let Some(entry) = self.entries.get_mut(path) {
            entry.last_used = self.tick;
            return Ok(Arc::clone(&entry.frames));
        }

        let frames = Arc::new(self.decoder.decode(path)?);
        *self.decode_counts.entry(path.to_path_buf()).or_insert(0) += 1;
        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                frames: Arc::clone(&frames),
                last_used: self.tick,
            },
        );
        self.evict_over_capacity();
        Ok(frames)
    }

    fn evict_over_capacity(&mut self) {
        let Some(cap) = self.capacity else {
            return;
        };
        while self.entries.len() > cap.get() {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(p, _)| p.clone())
            else {
                break;
            };
            tracing::debug!(path = %oldest.display(), "evicting least recently used clip");
            self.entries.remove(&oldest);
        }
    }
}
