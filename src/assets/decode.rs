use std::path::Path;

use anyhow::Context;

use crate::foundation::{
    error::{SignflowError, SignflowResult},
    frame::Frame,
};

/// Decodes one clip file into its full ordered frame sequence.
///
/// This is the seam the [`FrameCache`](crate::assets::cache::FrameCache)
/// memoizes over; tests substitute a stub decoder so cache and scheduler
/// behavior can be exercised without ffmpeg or fixture videos.
pub trait ClipDecoder {
    /// Decode every frame of the clip at `path`, in order.
    ///
    /// A present-but-empty clip yields `Ok(vec![])`; callers treat that as
    /// "no content to play", not as an error.
    fn decode(&self, path: &Path) -> SignflowResult<Vec<Frame>>;
}

/// Clip decoder backed by the system `ffmpeg`/`ffprobe` binaries.
///
/// We intentionally shell out rather than link FFmpeg to avoid native dev
/// header/lib requirements. Frames are decoded sequentially to raw RGB24
/// over a pipe.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegDecoder;

impl ClipDecoder for FfmpegDecoder {
    #[tracing::instrument(skip(self))]
    fn decode(&self, path: &Path) -> SignflowResult<Vec<Frame>> {
        let (width, height) = probe_clip_dimensions(path)?;
        decode_clip_frames_rgb8(path, width, height)
    }
}

/// Probe a clip's pixel dimensions via `ffprobe`.
pub fn probe_clip_dimensions(path: &Path) -> SignflowResult<(u32, u32)> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
    }

    let out = std::process::Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_streams"])
        .arg(path)
        .output()
        .map_err(|e| SignflowError::decode(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(SignflowError::decode(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| SignflowError::decode(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            SignflowError::decode(format!("no video stream in '{}'", path.display()))
        })?;
    let width = video_stream
        .width
        .ok_or_else(|| SignflowError::decode("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| SignflowError::decode("missing video height from ffprobe"))?;
    Ok((width, height))
}

fn decode_clip_frames_rgb8(path: &Path, width: u32, height: u32) -> SignflowResult<Vec<Frame>> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
        .output()
        .map_err(|e| SignflowError::decode(format!("failed to run ffmpeg for clip decode: {e}")))?;

    if !out.status.success() {
        return Err(SignflowError::decode(format!(
            "ffmpeg clip decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let frame_len = width as usize * height as usize * 3;
    if frame_len == 0 {
        return Err(SignflowError::decode(
            "decoded frame size is zero (invalid source dimensions)",
        ));
    }
    if !out.stdout.len().is_multiple_of(frame_len) {
        return Err(SignflowError::decode(format!(
            "decoded clip has invalid size: got {} bytes, expected multiples of {frame_len}",
            out.stdout.len()
        )));
    }

    let count = out.stdout.len() / frame_len;
    let mut frames = Vec::with_capacity(count);
    for idx in 0..count {
        let off = idx * frame_len;
        frames.push(Frame::from_rgb8(
            width,
            height,
            out.stdout[off..off + frame_len].to_vec(),
        )?);
    }
    tracing::debug!(path = %path.display(), frames = count, "decoded clip");
    Ok(frames)
}

/// Decode a still image (idle image) into a [`Frame`] via the `image` crate.
pub fn decode_still(path: &Path) -> SignflowResult<Frame> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read still image '{}'", path.display()))?;
    let dyn_img = image::load_from_memory(&bytes)
        .with_context(|| format!("decode still image '{}'", path.display()))?;
    let rgb = dyn_img.to_rgb8();
    let (width, height) = rgb.dimensions();
    Frame::from_rgb8(width, height, rgb.into_raw())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn decode_still_png_roundtrips_dimensions() {
        let img = image::RgbImage::from_raw(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();

        let tmp = std::env::temp_dir().join(format!(
            "signflow_decode_still_{}_{}.png",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::write(&tmp, &buf).unwrap();

        let frame = decode_still(&tmp).unwrap();
        assert_eq!(frame.dimensions(), (2, 1));
        assert_eq!(frame.data(), &[1, 2, 3, 4, 5, 6]);

        std::fs::remove_file(&tmp).ok();
    }

    #[test]
    fn decode_still_missing_file_is_an_error() {
        let missing = std::env::temp_dir().join("signflow_no_such_image.png");
        assert!(decode_still(&missing).is_err());
    }
}
