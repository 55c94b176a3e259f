use std::path::{Path, PathBuf};

/// Clip container extensions probed by the store, in preference order.
pub const CLIP_EXTENSIONS: &[&str] = &["mov", "mp4"];

/// Content-addressed clip lookup over a flat directory.
///
/// The content root holds one file per word (`<WORD>.<ext>`) and one file
/// per letter (`<LETTER>.<ext>`). Lookup is a lazy, exact existence check —
/// no index is built up front and no fuzzy matching is attempted. Callers
/// normalize tokens to uppercase before lookup.
#[derive(Clone, Debug)]
pub struct ClipStore {
    root: PathBuf,
    idle_image: Option<PathBuf>,
}

impl ClipStore {
    /// Create a store over `root`. The directory is not scanned or
    /// validated up front; missing clips surface per-lookup.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            idle_image: None,
        }
    }

    /// Attach the idle still image shown when nothing is playing.
    pub fn with_idle_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.idle_image = Some(path.into());
        self
    }

    /// Content root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Idle still image, if configured and present on disk.
    pub fn idle_image(&self) -> Option<&Path> {
        self.idle_image.as_deref().filter(|p| p.is_file())
    }

    /// Locate the clip for a whole-word token, if one exists.
    pub fn locate_word(&self, token: &str) -> Option<PathBuf> {
        if token.is_empty() {
            return None;
        }
        self.locate_stem(token)
    }

    /// Locate the clip for a single spelled letter, if one exists.
    pub fn locate_letter(&self, ch: char) -> Option<PathBuf> {
        self.locate_stem(&ch.to_string())
    }

    fn locate_stem(&self, stem: &str) -> Option<PathBuf> {
        for ext in CLIP_EXTENSIONS {
            let candidate = self.root.join(format!("{stem}.{ext}"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }
}
