use std::path::PathBuf;

use crate::assets::store::ClipStore;

/// One schedulable element of a resolved sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayUnit {
    /// A whole-word clip.
    Word { token: String, path: PathBuf },
    /// A single spelled-letter clip.
    Letter { ch: char, path: PathBuf },
    /// A fixed pause between spelled-out words; renders the idle image.
    Pause,
}

/// Non-fatal conditions recorded while resolving. Also logged as warnings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveWarning {
    /// A spelled letter had no clip; the character was skipped.
    MissingLetter { token: String, ch: char },
}

impl std::fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingLetter { token, ch } => {
                write!(f, "no clip found for letter '{ch}' while spelling '{token}'")
            }
        }
    }
}

/// Outcome of resolving one input string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Ordered playable units.
    pub units: Vec<PlayUnit>,
    /// Warnings for skipped content. Playback proceeds regardless.
    pub warnings: Vec<ResolveWarning>,
}

impl Resolution {
    /// True when the input produced nothing to play (idle).
    pub fn is_idle(&self) -> bool {
        self.units.is_empty()
    }
}

/// Resolve input text into an ordered list of playable units.
///
/// The text is upper-cased and split on whitespace. Each token resolves to
/// its whole-word clip when one exists; otherwise the token is spelled out
/// letter by letter (alphabetic characters only, missing letters skipped
/// with a warning) followed by a pause marker. A token with neither a word
/// clip nor any letter clips degrades to the lone pause marker. Empty
/// input resolves to an empty list.
pub fn resolve(text: &str, store: &ClipStore) -> Resolution {
    let mut out = Resolution::default();

    for token in text.to_uppercase().split_whitespace() {
        if let Some(path) = store.locate_word(token) {
            out.units.push(PlayUnit::Word {
                token: token.to_string(),
                path,
            });
            continue;
        }

        for ch in token.chars() {
            if !ch.is_alphabetic() {
                continue;
            }
            match store.locate_letter(ch) {
                Some(path) => out.units.push(PlayUnit::Letter { ch, path }),
                None => {
                    tracing::warn!(token, letter = %ch, "no clip for spelled letter, skipping");
                    out.warnings.push(ResolveWarning::MissingLetter {
                        token: token.to_string(),
                        ch,
                    });
                }
            }
        }
        out.units.push(PlayUnit::Pause);
    }

    out
}
