use crate::{foundation::frame::Frame, playback::config::PlaybackConfig};

/// Mutable per-run playback state: the active configuration plus the last
/// rendered frame, which seeds the bridge into the next unit.
#[derive(Clone, Debug, Default)]
pub struct PlaybackSession {
    config: PlaybackConfig,
    last_frame: Option<Frame>,
}

impl PlaybackSession {
    /// Start a session with the given configuration.
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            config,
            last_frame: None,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Last frame pushed to the display surface, if any.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    /// Record a newly rendered frame.
    pub fn set_last_frame(&mut self, frame: Frame) {
        self.last_frame = Some(frame);
    }

    /// Drop the pending last frame. The next clip then starts without a
    /// bridge. Configuration is untouched.
    pub fn reset(&mut self) {
        self.last_frame = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_last_frame_only() {
        let mut cfg = PlaybackConfig::default();
        cfg.speed_factor = 2.5;
        let mut session = PlaybackSession::new(cfg);
        session.set_last_frame(Frame::filled(2, 2, [1, 2, 3]).unwrap());
        assert!(session.last_frame().is_some());

        session.reset();
        assert!(session.last_frame().is_none());
        assert_eq!(session.config().speed_factor, 2.5);
    }
}
