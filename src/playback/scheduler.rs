use std::time::Duration;

use crate::{
    assets::{cache::FrameCache, store::ClipStore},
    foundation::error::SignflowResult,
    playback::{
        clock::Clock, config::PlaybackConfig, session::PlaybackSession, surface::DisplaySurface,
    },
    resolve::{PlayUnit, Resolution, resolve},
    transition,
};

/// Pacing between frames of a clip at speed factor 1.0.
pub const BASE_FRAME_INTERVAL: Duration = Duration::from_millis(20);
/// Pacing between bridge frames; shorter so transitions feel snappy.
pub const TRANSITION_FRAME_INTERVAL: Duration = Duration::from_millis(10);
/// Pause after a spelled-out word.
pub const SPELL_PAUSE: Duration = Duration::from_millis(500);

/// Observable scheduler phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchedulerState {
    /// Nothing queued; idle image (if any) is showing.
    #[default]
    Idle,
    /// Rendering a unit's own frames.
    PlayingUnit,
    /// Rendering bridge frames into the next unit.
    Transitioning,
}

/// Sequential playback driver.
///
/// Walks a resolved unit list, pulls frame sequences through the cache,
/// synthesizes bridge frames between consecutive units, and paces output
/// through the [`Clock`] seam. Single-threaded and cooperative: pacing
/// sleeps are the only suspension points, and a started unit always runs
/// to completion ([`Scheduler::reset`] between plays is the cancellation
/// granularity).
pub struct Scheduler {
    store: ClipStore,
    cache: FrameCache,
    session: PlaybackSession,
    state: SchedulerState,
}

impl Scheduler {
    /// Build a scheduler over a clip store and cache with an explicit,
    /// validated configuration.
    pub fn new(store: ClipStore, cache: FrameCache, config: PlaybackConfig) -> SignflowResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            cache,
            session: PlaybackSession::new(config),
            state: SchedulerState::Idle,
        })
    }

    /// Current phase.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Session state (configuration and last rendered frame).
    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    /// Frame cache, for instrumentation.
    pub fn cache(&self) -> &FrameCache {
        &self.cache
    }

    /// Drop pending session state and return to idle.
    pub fn reset(&mut self) {
        self.session.reset();
        self.state = SchedulerState::Idle;
    }

    /// Resolve `text` and play the resulting sequence. Returns the
    /// resolution so callers can surface its warnings.
    #[tracing::instrument(skip(self, surface, clock))]
    pub fn play_text(
        &mut self,
        text: &str,
        surface: &mut dyn DisplaySurface,
        clock: &mut dyn Clock,
    ) -> SignflowResult<Resolution> {
        let resolution = resolve(text, &self.store);
        self.play_units(&resolution.units, surface, clock)?;
        Ok(resolution)
    }

    /// Play an already-resolved sequence of units.
    ///
    /// An empty sequence renders the idle image and stays idle. Missing
    /// content (clips that fail to decode or decode to zero frames) is
    /// skipped with a warning; the previous last frame is preserved so the
    /// next playable clip still gets its bridge.
    pub fn play_units(
        &mut self,
        units: &[PlayUnit],
        surface: &mut dyn DisplaySurface,
        clock: &mut dyn Clock,
    ) -> SignflowResult<()> {
        if units.is_empty() {
            self.render_idle(surface)?;
            self.state = SchedulerState::Idle;
            return Ok(());
        }

        for unit in units {
            match unit {
                PlayUnit::Word { path, .. } | PlayUnit::Letter { path, .. } => {
                    self.play_clip(path.as_path(), surface, clock)?;
                }
                PlayUnit::Pause => {
                    self.render_idle(surface)?;
                    clock.sleep(SPELL_PAUSE);
                }
            }
        }

        self.render_idle(surface)?;
        self.state = SchedulerState::Idle;
        Ok(())
    }

    fn play_clip(
        &mut self,
        path: &std::path::Path,
        surface: &mut dyn DisplaySurface,
        clock: &mut dyn Clock,
    ) -> SignflowResult<()> {
        let frames = match self.cache.load(path) {
            Ok(frames) => frames,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "clip decode failed, skipping");
                return Ok(());
            }
        };
        if frames.is_empty() {
            tracing::warn!(path = %path.display(), "clip has no frames, skipping");
            return Ok(());
        }

        let config = *self.session.config();
        if let Some(mode) = config.transition {
            let bridge = transition::bridge(
                self.session.last_frame(),
                frames.first(),
                config.transition_steps,
                mode,
                &config.flow,
            )?;
            if !bridge.is_empty() {
                self.state = SchedulerState::Transitioning;
                let interval = scale_interval(TRANSITION_FRAME_INTERVAL, config.speed_factor);
                for frame in &bridge {
                    surface.render(frame)?;
                    self.session.set_last_frame(frame.clone());
                    clock.sleep(interval);
                }
            }
        }

        self.state = SchedulerState::PlayingUnit;
        let interval = scale_interval(BASE_FRAME_INTERVAL, config.speed_factor);
        for frame in frames.iter() {
            surface.render(frame)?;
            self.session.set_last_frame(frame.clone());
            clock.sleep(interval);
        }
        Ok(())
    }

    fn render_idle(&mut self, surface: &mut dyn DisplaySurface) -> SignflowResult<()> {
        if let Some(idle) = self.store.idle_image() {
            surface.render_still(idle)?;
        }
        Ok(())
    }
}

fn scale_interval(base: Duration, speed_factor: f32) -> Duration {
    // speed_factor is validated finite and > 0 at construction.
    Duration::from_secs_f64(base.as_secs_f64() / f64::from(speed_factor))
}
