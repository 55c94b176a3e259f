use std::{
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::{
    assets::decode::decode_still,
    foundation::{
        error::{SignflowError, SignflowResult},
        frame::Frame,
    },
    playback::surface::DisplaySurface,
};

/// Settings for MP4 capture of a playback run.
#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
}

impl EncodeConfig {
    pub fn validate(&self) -> SignflowResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SignflowError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if self.fps == 0 {
            return Err(SignflowError::validation("encode fps must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // With the default settings we target yuv420p output for maximum compatibility.
            return Err(SignflowError::validation(
                "encode width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> SignflowResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Streams raw RGB24 frames into a system `ffmpeg` process producing MP4.
///
/// We intentionally use the system `ffmpeg` binary rather than linking
/// FFmpeg to avoid native dev header/lib requirements.
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    child: Child,
    stdin: Option<ChildStdin>,
}

impl FfmpegEncoder {
    pub fn new(cfg: EncodeConfig) -> SignflowResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(SignflowError::validation(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(SignflowError::playback(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if cfg.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&cfg.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            SignflowError::playback(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SignflowError::playback("failed to open ffmpeg stdin (unexpected)"))?;

        Ok(Self {
            cfg,
            child,
            stdin: Some(stdin),
        })
    }

    pub fn encode_frame(&mut self, frame: &Frame) -> SignflowResult<()> {
        if frame.dimensions() != (self.cfg.width, self.cfg.height) {
            return Err(SignflowError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                self.cfg.width,
                self.cfg.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(SignflowError::playback("ffmpeg encoder is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(frame.data()).map_err(|e| {
            SignflowError::playback(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    pub fn finish(mut self) -> SignflowResult<()> {
        drop(self.stdin.take());

        let output = self.child.wait_with_output().map_err(|e| {
            SignflowError::playback(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SignflowError::playback(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// [`DisplaySurface`] that captures a playback run as an MP4 file.
///
/// The encoder starts lazily on the first rendered frame, locking output
/// dimensions to that frame's size rounded down to even; later frames and
/// stills of other sizes are resized to match.
pub struct Mp4Surface {
    out_path: PathBuf,
    fps: u32,
    overwrite: bool,
    encoder: Option<FfmpegEncoder>,
    frames_written: u64,
}

impl Mp4Surface {
    pub fn new(out_path: impl Into<PathBuf>, fps: u32, overwrite: bool) -> Self {
        Self {
            out_path: out_path.into(),
            fps,
            overwrite,
            encoder: None,
            frames_written: 0,
        }
    }

    /// Frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Flush and close the encoder. Errors if nothing was ever rendered.
    pub fn finish(self) -> SignflowResult<()> {
        let Some(encoder) = self.encoder else {
            return Err(SignflowError::playback(
                "no frames were rendered, nothing to encode",
            ));
        };
        encoder.finish()
    }

    fn write(&mut self, frame: &Frame) -> SignflowResult<()> {
        if self.encoder.is_none() {
            let width = (frame.width() & !1).max(2);
            let height = (frame.height() & !1).max(2);
            self.encoder = Some(FfmpegEncoder::new(EncodeConfig {
                width,
                height,
                fps: self.fps,
                out_path: self.out_path.clone(),
                overwrite: self.overwrite,
            })?);
        }

        let Some(encoder) = self.encoder.as_mut() else {
            return Err(SignflowError::playback("encoder not initialized (unexpected)"));
        };
        let (w, h) = (encoder.cfg.width, encoder.cfg.height);
        if frame.dimensions() == (w, h) {
            encoder.encode_frame(frame)?;
        } else {
            encoder.encode_frame(&frame.resize_bilinear(w, h)?)?;
        }
        self.frames_written += 1;
        Ok(())
    }
}

impl DisplaySurface for Mp4Surface {
    fn render(&mut self, frame: &Frame) -> SignflowResult<()> {
        self.write(frame)
    }

    fn render_still(&mut self, path: &Path) -> SignflowResult<()> {
        let frame = decode_still(path)?;
        self.write(&frame)
    }
}
