/// Convenience result type used across Signflow.
pub type SignflowResult<T> = Result<T, SignflowError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Missing clips and empty decodes are deliberately *not* errors: playback
/// degrades to skip-and-warn for those. `SignflowError` covers genuinely
/// broken invocations (bad config, subprocess failure, sink IO).
#[derive(thiserror::Error, Debug)]
pub enum SignflowError {
    /// Invalid user-provided configuration or parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while decoding clip or image data.
    #[error("decode error: {0}")]
    Decode(String),

    /// Errors while driving playback or writing to a display surface.
    #[error("playback error: {0}")]
    Playback(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SignflowError {
    /// Build a [`SignflowError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SignflowError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`SignflowError::Playback`] value.
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            SignflowError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(SignflowError::decode("x").to_string().contains("decode error:"));
        assert!(
            SignflowError::playback("x")
                .to_string()
                .contains("playback error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = SignflowError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
