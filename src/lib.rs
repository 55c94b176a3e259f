//! Signflow renders sequences of pre-recorded sign-language clips for input
//! text and synthesizes smooth transitions between consecutive clips.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: input text -> ordered [`PlayUnit`] list (whole-word clips,
//!    spelled letters with pause markers, or nothing when idle)
//! 2. **Load**: clip path -> cached frame sequence ([`FrameCache`], decoded
//!    once per path via the system `ffmpeg` binary)
//! 3. **Bridge**: last frame of one clip + first frame of the next ->
//!    `steps` interpolated frames ([`transition`], cross-dissolve or
//!    dense-flow morph)
//! 4. **Schedule**: walk the units, push frames to a [`DisplaySurface`],
//!    pace through a [`Clock`]
//!
//! Key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Skip-and-warn**: missing clips and empty decodes never abort a
//!   sequence; playback continues with the next unit.
//! - **Explicit seams**: display surface, pacing clock, clip decoder, and
//!   configuration are injected, never ambient.
#![forbid(unsafe_code)]

mod assets;
mod encode;
mod foundation;
mod motion;
mod playback;
mod resolve;

/// Transition synthesis between consecutive clips.
pub mod transition;

pub use assets::cache::FrameCache;
pub use assets::decode::{ClipDecoder, FfmpegDecoder, decode_still, probe_clip_dimensions};
pub use assets::store::{CLIP_EXTENSIONS, ClipStore};
pub use encode::{EncodeConfig, FfmpegEncoder, Mp4Surface, ensure_parent_dir, is_ffmpeg_on_path};
pub use foundation::error::{SignflowError, SignflowResult};
pub use foundation::frame::Frame;
pub use motion::field::MotionField;
pub use motion::flow::{FlowParams, estimate_flow};
pub use motion::warp::remap_scaled;
pub use playback::clock::{Clock, NullClock, SystemClock};
pub use playback::config::PlaybackConfig;
pub use playback::scheduler::{
    BASE_FRAME_INTERVAL, SPELL_PAUSE, Scheduler, SchedulerState, TRANSITION_FRAME_INTERVAL,
};
pub use playback::session::PlaybackSession;
pub use playback::surface::DisplaySurface;
pub use resolve::{PlayUnit, Resolution, ResolveWarning, resolve};
pub use transition::{DEFAULT_TRANSITION_STEPS, TransitionMode};
