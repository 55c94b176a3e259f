use rayon::prelude::*;

use crate::{
    foundation::{
        error::{SignflowError, SignflowResult},
        frame::Frame,
    },
    motion::field::MotionField,
};

/// Resample `frame` along a scaled motion field.
///
/// Output pixel `(x, y)` is sampled bilinearly from
/// `(x + coeff * dx, y + coeff * dy)`, replicating edge pixels for
/// out-of-bounds lookups. A negative `coeff` warps backward along the
/// field, a positive one forward; `coeff = 0` is the identity.
pub fn remap_scaled(frame: &Frame, field: &MotionField, coeff: f32) -> SignflowResult<Frame> {
    if (field.width(), field.height()) != frame.dimensions() {
        return Err(SignflowError::validation(format!(
            "warp field dimensions {}x{} do not match frame {}x{}",
            field.width(),
            field.height(),
            frame.width(),
            frame.height()
        )));
    }

    let (w, h) = frame.dimensions();
    let row_len = w as usize * 3;
    let mut data = vec![0u8; row_len * h as usize];
    data.par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..w as usize {
                let (dx, dy) = field.get(x as u32, y as u32);
                let px = frame.sample_bilinear(x as f32 + coeff * dx, y as f32 + coeff * dy);
                let off = x * 3;
                for c in 0..3 {
                    row[off + c] = px[c].round().clamp(0.0, 255.0) as u8;
                }
            }
        });

    Frame::from_rgb8(w, h, data)
}
