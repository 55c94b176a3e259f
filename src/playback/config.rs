use crate::{
    foundation::error::{SignflowError, SignflowResult},
    motion::flow::FlowParams,
    transition::{DEFAULT_TRANSITION_STEPS, TransitionMode},
};

/// Explicit playback configuration passed to the scheduler at construction.
///
/// There is no ambient state: speed and morph settings travel as a value,
/// and whatever UI sits on top re-creates the scheduler (or a session) when
/// the user changes them.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Playback speed multiplier; frame intervals divide by this.
    pub speed_factor: f32,
    /// Bridge strategy between consecutive clips; `None` disables
    /// transitions entirely (hard cuts).
    pub transition: Option<TransitionMode>,
    /// Number of bridge frames per transition.
    pub transition_steps: u32,
    /// Tuning for the dense-flow estimator used by the morph strategies.
    pub flow: FlowParams,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed_factor: 1.0,
            transition: Some(TransitionMode::default()),
            transition_steps: DEFAULT_TRANSITION_STEPS,
            flow: FlowParams::default(),
        }
    }
}

impl PlaybackConfig {
    /// Validate configuration ranges.
    pub fn validate(&self) -> SignflowResult<()> {
        if !self.speed_factor.is_finite() || self.speed_factor <= 0.0 {
            return Err(SignflowError::validation(
                "speed_factor must be finite and > 0",
            ));
        }
        if self.transition.is_some() && self.transition_steps == 0 {
            return Err(SignflowError::validation(
                "transition_steps must be >= 1 when a transition is enabled",
            ));
        }
        self.flow.validate()
    }
}
