use std::{
    collections::HashMap,
    io::Cursor,
    path::{Path, PathBuf},
    time::Duration,
};

use signflow::{
    BASE_FRAME_INTERVAL, ClipDecoder, Clock, DisplaySurface, Frame, FrameCache, PlayUnit,
    PlaybackConfig, SPELL_PAUSE, Scheduler, SchedulerState, SignflowResult, ClipStore,
    TRANSITION_FRAME_INTERVAL, TransitionMode,
};

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "signflow_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Decoder serving canned frame sequences; no ffmpeg, no real clip files.
struct StubDecoder {
    clips: HashMap<PathBuf, Vec<Frame>>,
}

impl StubDecoder {
    fn new() -> Self {
        Self {
            clips: HashMap::new(),
        }
    }

    fn with_clip(mut self, path: impl Into<PathBuf>, frames: Vec<Frame>) -> Self {
        self.clips.insert(path.into(), frames);
        self
    }
}

impl ClipDecoder for StubDecoder {
    fn decode(&self, path: &Path) -> SignflowResult<Vec<Frame>> {
        Ok(self.clips.get(path).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
struct RecordingSurface {
    frames: Vec<Frame>,
    stills: Vec<PathBuf>,
}

impl DisplaySurface for RecordingSurface {
    fn render(&mut self, frame: &Frame) -> SignflowResult<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn render_still(&mut self, path: &Path) -> SignflowResult<()> {
        self.stills.push(path.to_path_buf());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingClock {
    sleeps: Vec<Duration>,
}

impl Clock for RecordingClock {
    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
    }
}

fn solid_clip(len: usize, shade: u8) -> Vec<Frame> {
    (0..len)
        .map(|i| Frame::filled(8, 8, [shade, shade.wrapping_add(i as u8), 0]).unwrap())
        .collect()
}

fn word(path: &str) -> PlayUnit {
    PlayUnit::Word {
        token: path.trim_end_matches(".mov").to_string(),
        path: PathBuf::from(path),
    }
}

fn scheduler_with(decoder: StubDecoder, config: PlaybackConfig) -> Scheduler {
    let cache = FrameCache::with_decoder(Box::new(decoder));
    Scheduler::new(ClipStore::new("."), cache, config).unwrap()
}

#[test]
fn single_clip_without_transitions_renders_every_decoded_frame() {
    let decoder = StubDecoder::new().with_clip("HELLO.mov", solid_clip(5, 10));
    let mut config = PlaybackConfig::default();
    config.transition = None;
    let mut scheduler = scheduler_with(decoder, config);

    let mut surface = RecordingSurface::default();
    let mut clock = RecordingClock::default();
    scheduler
        .play_units(&[word("HELLO.mov")], &mut surface, &mut clock)
        .unwrap();

    assert_eq!(surface.frames.len(), 5);
    assert_eq!(surface.stills.len(), 0);
    assert_eq!(clock.sleeps, vec![BASE_FRAME_INTERVAL; 5]);
    assert_eq!(scheduler.state(), SchedulerState::Idle);
    assert_eq!(
        scheduler.session().last_frame(),
        Some(&solid_clip(5, 10)[4])
    );
}

#[test]
fn consecutive_clips_get_exactly_steps_bridge_frames() {
    let decoder = StubDecoder::new()
        .with_clip("A.mov", solid_clip(3, 0))
        .with_clip("B.mov", solid_clip(2, 200));
    let mut config = PlaybackConfig::default();
    config.transition = Some(TransitionMode::CrossDissolve);
    config.transition_steps = 4;
    let mut scheduler = scheduler_with(decoder, config);

    let mut surface = RecordingSurface::default();
    let mut clock = RecordingClock::default();
    scheduler
        .play_units(&[word("A.mov"), word("B.mov")], &mut surface, &mut clock)
        .unwrap();

    // 3 clip frames + 4 bridge frames + 2 clip frames.
    assert_eq!(surface.frames.len(), 9);
    // The first bridge frame is the last frame of clip A exactly.
    assert_eq!(surface.frames[3], solid_clip(3, 0)[2]);

    let expected: Vec<Duration> = std::iter::repeat_n(BASE_FRAME_INTERVAL, 3)
        .chain(std::iter::repeat_n(TRANSITION_FRAME_INTERVAL, 4))
        .chain(std::iter::repeat_n(BASE_FRAME_INTERVAL, 2))
        .collect();
    assert_eq!(clock.sleeps, expected);
}

#[test]
fn speed_factor_divides_frame_intervals() {
    let decoder = StubDecoder::new().with_clip("A.mov", solid_clip(2, 50));
    let mut config = PlaybackConfig::default();
    config.transition = None;
    config.speed_factor = 2.0;
    let mut scheduler = scheduler_with(decoder, config);

    let mut surface = RecordingSurface::default();
    let mut clock = RecordingClock::default();
    scheduler
        .play_units(&[word("A.mov")], &mut surface, &mut clock)
        .unwrap();

    assert_eq!(clock.sleeps, vec![BASE_FRAME_INTERVAL / 2; 2]);
}

#[test]
fn empty_decode_is_skipped_and_preserves_last_frame() {
    let decoder = StubDecoder::new()
        .with_clip("A.mov", solid_clip(2, 30))
        .with_clip("B.mov", solid_clip(2, 90));
    // "GONE.mov" has no entry: the stub decodes it to zero frames.
    let mut config = PlaybackConfig::default();
    config.transition = Some(TransitionMode::CrossDissolve);
    config.transition_steps = 3;
    let mut scheduler = scheduler_with(decoder, config);

    let mut surface = RecordingSurface::default();
    let mut clock = RecordingClock::default();
    scheduler
        .play_units(
            &[word("A.mov"), word("GONE.mov"), word("B.mov")],
            &mut surface,
            &mut clock,
        )
        .unwrap();

    // A plays cold (no prior frame, no bridge), GONE is skipped, and the
    // preserved last frame of A still bridges into B.
    assert_eq!(surface.frames.len(), 2 + 3 + 2);
    assert_eq!(surface.frames[2], solid_clip(2, 30)[1]);
}

#[test]
fn pause_units_render_idle_and_sleep_without_cache_lookups() {
    let root = temp_dir("sched_pause");
    let idle = root.join("idle.png");
    let img = image::RgbImage::from_raw(4, 4, vec![128u8; 48]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(&idle, &buf).unwrap();

    let cache = FrameCache::with_decoder(Box::new(StubDecoder::new()));
    let store = ClipStore::new(&root).with_idle_image(&idle);
    let mut config = PlaybackConfig::default();
    config.transition = None;
    let mut scheduler = Scheduler::new(store, cache, config).unwrap();

    let mut surface = RecordingSurface::default();
    let mut clock = RecordingClock::default();
    scheduler
        .play_units(&[PlayUnit::Pause], &mut surface, &mut clock)
        .unwrap();

    // Idle still shows for the pause and again when the sequence ends.
    assert_eq!(surface.stills, vec![idle.clone(), idle.clone()]);
    assert_eq!(clock.sleeps, vec![SPELL_PAUSE]);
    assert!(surface.frames.is_empty());
    assert!(scheduler.cache().is_empty());

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn empty_sequence_stays_idle() {
    let mut config = PlaybackConfig::default();
    config.transition = None;
    let mut scheduler = scheduler_with(StubDecoder::new(), config);

    let mut surface = RecordingSurface::default();
    let mut clock = RecordingClock::default();
    scheduler.play_units(&[], &mut surface, &mut clock).unwrap();

    assert!(surface.frames.is_empty());
    assert!(clock.sleeps.is_empty());
    assert_eq!(scheduler.state(), SchedulerState::Idle);
}

#[test]
fn repeat_plays_hit_the_cache() {
    let decoder = StubDecoder::new().with_clip("A.mov", solid_clip(2, 10));
    let mut config = PlaybackConfig::default();
    config.transition = None;
    let mut scheduler = scheduler_with(decoder, config);

    let mut surface = RecordingSurface::default();
    let mut clock = RecordingClock::default();
    for _ in 0..3 {
        scheduler
            .play_units(&[word("A.mov")], &mut surface, &mut clock)
            .unwrap();
    }

    assert_eq!(surface.frames.len(), 6);
    assert_eq!(scheduler.cache().decode_count(Path::new("A.mov")), 1);
}

#[test]
fn reset_drops_last_frame_so_next_clip_plays_cold() {
    let decoder = StubDecoder::new()
        .with_clip("A.mov", solid_clip(2, 20))
        .with_clip("B.mov", solid_clip(2, 220));
    let mut config = PlaybackConfig::default();
    config.transition = Some(TransitionMode::CrossDissolve);
    config.transition_steps = 5;
    let mut scheduler = scheduler_with(decoder, config);

    let mut surface = RecordingSurface::default();
    let mut clock = RecordingClock::default();
    scheduler
        .play_units(&[word("A.mov")], &mut surface, &mut clock)
        .unwrap();
    assert!(scheduler.session().last_frame().is_some());

    scheduler.reset();
    assert!(scheduler.session().last_frame().is_none());

    scheduler
        .play_units(&[word("B.mov")], &mut surface, &mut clock)
        .unwrap();
    // No bridge frames after the reset: 2 + 2 clip frames only.
    assert_eq!(surface.frames.len(), 4);
}

#[test]
fn play_text_resolves_against_the_store() {
    let root = temp_dir("sched_play_text");
    std::fs::write(root.join("HELLO.mov"), b"x").unwrap();

    let decoder =
        StubDecoder::new().with_clip(root.join("HELLO.mov"), solid_clip(4, 100));
    let cache = FrameCache::with_decoder(Box::new(decoder));
    let store = ClipStore::new(&root);
    let mut config = PlaybackConfig::default();
    config.transition = None;
    let mut scheduler = Scheduler::new(store, cache, config).unwrap();

    let mut surface = RecordingSurface::default();
    let mut clock = RecordingClock::default();
    let resolution = scheduler
        .play_text("hello", &mut surface, &mut clock)
        .unwrap();

    assert_eq!(resolution.units.len(), 1);
    assert!(resolution.warnings.is_empty());
    assert_eq!(surface.frames.len(), 4);

    std::fs::remove_dir_all(&root).ok();
}
