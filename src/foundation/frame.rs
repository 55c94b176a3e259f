use crate::foundation::error::{SignflowError, SignflowResult};

/// One decoded video frame: a row-major RGB8 pixel grid.
///
/// Frames within a single decoded clip share dimensions; frames from
/// different clips may differ. A frame is immutable once it enters the
/// cache — all blend/warp operations allocate a new frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Construct a frame from raw row-major RGB8 bytes.
    pub fn from_rgb8(width: u32, height: u32, data: Vec<u8>) -> SignflowResult<Self> {
        let expected = width as usize * height as usize * 3;
        if width == 0 || height == 0 {
            return Err(SignflowError::validation("frame dimensions must be non-zero"));
        }
        if data.len() != expected {
            return Err(SignflowError::validation(format!(
                "frame data size mismatch: got {} bytes, expected {expected} for {width}x{height} rgb8",
                data.len()
            )));
        }
        Ok(Self { width, height, data })
    }

    /// Construct a solid-color frame. Mostly useful in tests and fixtures.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> SignflowResult<Self> {
        let px = width as usize * height as usize;
        let mut data = Vec::with_capacity(px * 3);
        for _ in 0..px {
            data.extend_from_slice(&rgb);
        }
        Self::from_rgb8(width, height, data)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// (width, height) pair.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw row-major RGB8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Pixel at integer coordinates, clamped to the frame edges.
    pub fn pixel_clamped(&self, x: i64, y: i64) -> [u8; 3] {
        let x = x.clamp(0, i64::from(self.width) - 1) as usize;
        let y = y.clamp(0, i64::from(self.height) - 1) as usize;
        let off = (y * self.width as usize + x) * 3;
        [self.data[off], self.data[off + 1], self.data[off + 2]]
    }

    /// Bilinear sample at fractional coordinates, replicating edge pixels
    /// for out-of-bounds lookups.
    pub fn sample_bilinear(&self, fx: f32, fy: f32) -> [f32; 3] {
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let x0 = x0 as i64;
        let y0 = y0 as i64;

        let p00 = self.pixel_clamped(x0, y0);
        let p10 = self.pixel_clamped(x0 + 1, y0);
        let p01 = self.pixel_clamped(x0, y0 + 1);
        let p11 = self.pixel_clamped(x0 + 1, y0 + 1);

        let mut out = [0.0f32; 3];
        for c in 0..3 {
            let top = f32::from(p00[c]) * (1.0 - tx) + f32::from(p10[c]) * tx;
            let bot = f32::from(p01[c]) * (1.0 - tx) + f32::from(p11[c]) * tx;
            out[c] = top * (1.0 - ty) + bot * ty;
        }
        out
    }

    /// Bilinear resize to the given dimensions.
    pub fn resize_bilinear(&self, width: u32, height: u32) -> SignflowResult<Self> {
        if width == 0 || height == 0 {
            return Err(SignflowError::validation("resize dimensions must be non-zero"));
        }
        if (width, height) == self.dimensions() {
            return Ok(self.clone());
        }

        let sx = self.width as f32 / width as f32;
        let sy = self.height as f32 / height as f32;
        let mut data = vec![0u8; width as usize * height as usize * 3];
        for y in 0..height as usize {
            let src_y = (y as f32 + 0.5) * sy - 0.5;
            for x in 0..width as usize {
                let src_x = (x as f32 + 0.5) * sx - 0.5;
                let px = self.sample_bilinear(src_x, src_y);
                let off = (y * width as usize + x) * 3;
                for c in 0..3 {
                    data[off + c] = px[c].round().clamp(0.0, 255.0) as u8;
                }
            }
        }
        Self::from_rgb8(width, height, data)
    }

    /// Luma plane as f32 (0..=255), row-major. Input to flow estimation.
    pub fn to_luma_f32(&self) -> Vec<f32> {
        self.data
            .chunks_exact(3)
            .map(|px| {
                0.299 * f32::from(px[0]) + 0.587 * f32::from(px[1]) + 0.114 * f32::from(px[2])
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgb8_validates_size() {
        assert!(Frame::from_rgb8(2, 2, vec![0u8; 12]).is_ok());
        assert!(Frame::from_rgb8(2, 2, vec![0u8; 11]).is_err());
        assert!(Frame::from_rgb8(0, 2, vec![]).is_err());
    }

    #[test]
    fn sample_bilinear_replicates_edges() {
        let f = Frame::from_rgb8(2, 1, vec![10, 20, 30, 200, 210, 220]).unwrap();
        assert_eq!(f.sample_bilinear(-5.0, 0.0), [10.0, 20.0, 30.0]);
        assert_eq!(f.sample_bilinear(7.5, 3.0), [200.0, 210.0, 220.0]);
    }

    #[test]
    fn sample_bilinear_interpolates_midpoint() {
        let f = Frame::from_rgb8(2, 1, vec![0, 0, 0, 100, 100, 100]).unwrap();
        assert_eq!(f.sample_bilinear(0.5, 0.0), [50.0, 50.0, 50.0]);
    }

    #[test]
    fn resize_same_dims_is_identity() {
        let f = Frame::filled(3, 2, [9, 9, 9]).unwrap();
        assert_eq!(f.resize_bilinear(3, 2).unwrap(), f);
    }

    #[test]
    fn resize_solid_color_stays_solid() {
        let f = Frame::filled(4, 4, [120, 60, 30]).unwrap();
        let r = f.resize_bilinear(7, 3).unwrap();
        assert_eq!(r.dimensions(), (7, 3));
        assert!(r.data().chunks_exact(3).all(|px| px == [120, 60, 30]));
    }

    #[test]
    fn luma_of_white_is_255() {
        let f = Frame::filled(2, 2, [255, 255, 255]).unwrap();
        for v in f.to_luma_f32() {
            assert!((v - 255.0).abs() < 0.5);
        }
    }
}
