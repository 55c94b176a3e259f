use rayon::prelude::*;

use crate::{
    foundation::{
        error::{SignflowError, SignflowResult},
        frame::Frame,
    },
    motion::field::MotionField,
};

/// Tuning for the pyramidal dense-flow estimator.
///
/// Defaults mirror the correspondence parameters the transition was tuned
/// with: 3 pyramid levels, a 15-pixel window, 3 refinement iterations per
/// level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FlowParams {
    /// Number of pyramid levels (>= 1). Level 0 is full resolution.
    pub levels: u32,
    /// Half-width of the correspondence window (window = 2r + 1).
    pub win_radius: u32,
    /// Refinement iterations per pyramid level.
    pub iterations: u32,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            levels: 3,
            win_radius: 7,
            iterations: 3,
        }
    }
}

impl FlowParams {
    /// Validate parameter ranges.
    pub fn validate(&self) -> SignflowResult<()> {
        if self.levels == 0 {
            return Err(SignflowError::validation("flow levels must be >= 1"));
        }
        if self.win_radius == 0 {
            return Err(SignflowError::validation("flow win_radius must be >= 1"));
        }
        if self.iterations == 0 {
            return Err(SignflowError::validation("flow iterations must be >= 1"));
        }
        Ok(())
    }
}

/// Estimate a dense motion field from `prev` to `next`.
///
/// Coarse-to-fine: both frames are reduced to grayscale pyramids; at each
/// level the field inherited from the coarser level is refined by a few
/// iterations of windowed least-squares matching (Lucas-Kanade normal
/// equations over a box window), then upsampled to the next level. Both
/// frames must share dimensions; the transition layer resizes beforehand.
#[tracing::instrument(skip(prev, next))]
pub fn estimate_flow(
    prev: &Frame,
    next: &Frame,
    params: &FlowParams,
) -> SignflowResult<MotionField> {
    params.validate()?;
    if prev.dimensions() != next.dimensions() {
        return Err(SignflowError::validation(format!(
            "flow endpoints must share dimensions: {}x{} vs {}x{}",
            prev.width(),
            prev.height(),
            next.width(),
            next.height()
        )));
    }

    let g_prev = Gray::from_frame(prev);
    let g_next = Gray::from_frame(next);

    // Coarsest first after the build loop below.
    let mut pyr_prev = vec![g_prev];
    let mut pyr_next = vec![g_next];
    for _ in 1..params.levels {
        let last = &pyr_prev[pyr_prev.len() - 1];
        if last.width.min(last.height) < 16 {
            break;
        }
        let down_prev = last.downsample_half();
        let down_next = pyr_next[pyr_next.len() - 1].downsample_half();
        pyr_prev.push(down_prev);
        pyr_next.push(down_next);
    }

    let coarsest = &pyr_prev[pyr_prev.len() - 1];
    let mut flow = MotionField::zeros(coarsest.width as u32, coarsest.height as u32)?;

    for level in (0..pyr_prev.len()).rev() {
        let (gp, gn) = (&pyr_prev[level], &pyr_next[level]);
        if (flow.width() as usize, flow.height() as usize) != (gp.width, gp.height) {
            flow = flow.upsample_to(gp.width as u32, gp.height as u32)?;
        }
        for _ in 0..params.iterations {
            refine_level(gp, gn, &mut flow, params.win_radius as usize);
        }
    }

    Ok(flow)
}

/// One windowed least-squares refinement pass at a single pyramid level.
fn refine_level(prev: &Gray, next: &Gray, flow: &mut MotionField, win_radius: usize) {
    let (w, h) = (prev.width, prev.height);
    let n = w * h;

    // Per-pixel gradient/residual products, later summed over the window.
    let products: Vec<[f32; 5]> = (0..n)
        .into_par_iter()
        .map(|i| {
            let x = (i % w) as isize;
            let y = (i / w) as isize;
            let ix = 0.5 * (prev.at(x + 1, y) - prev.at(x - 1, y));
            let iy = 0.5 * (prev.at(x, y + 1) - prev.at(x, y - 1));
            let (u, v) = flow.get(x as u32, y as u32);
            let warped = next.sample(x as f32 + u, y as f32 + v);
            let it = warped - prev.at(x, y);
            [ix * ix, ix * iy, iy * iy, ix * it, iy * it]
        })
        .collect();

    let mut planes = [
        vec![0.0f32; n],
        vec![0.0f32; n],
        vec![0.0f32; n],
        vec![0.0f32; n],
        vec![0.0f32; n],
    ];
    for (i, p) in products.iter().enumerate() {
        for (k, plane) in planes.iter_mut().enumerate() {
            plane[i] = p[k];
        }
    }
    let sums: Vec<Vec<f32>> = planes
        .into_iter()
        .map(|plane| box_sum(&plane, w, h, win_radius))
        .collect();

    let max_step = win_radius as f32;
    let updates: Vec<(f32, f32)> = (0..n)
        .into_par_iter()
        .map(|i| {
            let (sxx, sxy, syy, sxt, syt) =
                (sums[0][i], sums[1][i], sums[2][i], sums[3][i], sums[4][i]);
            let det = sxx * syy - sxy * sxy;
            if det.abs() < 1e-3 {
                return (0.0, 0.0);
            }
            // Solve [sxx sxy; sxy syy] [du dv]^T = -[sxt syt]^T.
            let du = (sxy * syt - syy * sxt) / det;
            let dv = (sxy * sxt - sxx * syt) / det;
            // Step clamp keeps coarse levels stable on low-texture windows.
            (du.clamp(-max_step, max_step), dv.clamp(-max_step, max_step))
        })
        .collect();

    for (i, (du, dv)) in updates.into_iter().enumerate() {
        flow.add((i % w) as u32, (i / w) as u32, du, dv);
    }
}

/// Separable box sum with clamped (shrinking) windows at the borders.
fn box_sum(src: &[f32], w: usize, h: usize, radius: usize) -> Vec<f32> {
    let mut horiz = vec![0.0f32; w * h];
    for y in 0..h {
        let row = &src[y * w..(y + 1) * w];
        let out = &mut horiz[y * w..(y + 1) * w];
        for x in 0..w {
            let lo = x.saturating_sub(radius);
            let hi = (x + radius).min(w - 1);
            if x == 0 {
                out[0] = row[lo..=hi].iter().sum();
            } else {
                let mut s = out[x - 1];
                if x > radius {
                    s -= row[x - 1 - radius];
                }
                if x + radius <= w - 1 {
                    s += row[x + radius];
                }
                out[x] = s;
            }
        }
    }

    let mut out = vec![0.0f32; w * h];
    for x in 0..w {
        for y in 0..h {
            let lo = y.saturating_sub(radius);
            let hi = (y + radius).min(h - 1);
            if y == 0 {
                out[x] = (lo..=hi).map(|yy| horiz[yy * w + x]).sum();
            } else {
                let mut s = out[(y - 1) * w + x];
                if y > radius {
                    s -= horiz[(y - 1 - radius) * w + x];
                }
                if y + radius <= h - 1 {
                    s += horiz[(y + radius) * w + x];
                }
                out[y * w + x] = s;
            }
        }
    }
    out
}

/// Grayscale f32 plane used for pyramid levels.
struct Gray {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Gray {
    fn from_frame(frame: &Frame) -> Self {
        Self {
            width: frame.width() as usize,
            height: frame.height() as usize,
            data: frame.to_luma_f32(),
        }
    }

    fn at(&self, x: isize, y: isize) -> f32 {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.data[y * self.width + x]
    }

    fn sample(&self, fx: f32, fy: f32) -> f32 {
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let (x0, y0) = (x0 as isize, y0 as isize);
        let top = self.at(x0, y0) * (1.0 - tx) + self.at(x0 + 1, y0) * tx;
        let bot = self.at(x0, y0 + 1) * (1.0 - tx) + self.at(x0 + 1, y0 + 1) * tx;
        top * (1.0 - ty) + bot * ty
    }

    fn downsample_half(&self) -> Self {
        let w2 = (self.width / 2).max(1);
        let h2 = (self.height / 2).max(1);
        let mut data = vec![0.0f32; w2 * h2];
        for y in 0..h2 {
            for x in 0..w2 {
                let (sx, sy) = (2 * x as isize, 2 * y as isize);
                data[y * w2 + x] = 0.25
                    * (self.at(sx, sy)
                        + self.at(sx + 1, sy)
                        + self.at(sx, sy + 1)
                        + self.at(sx + 1, sy + 1));
            }
        }
        Self {
            width: w2,
            height: h2,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob_frame(width: u32, height: u32, cx: f32, cy: f32, sigma: f32) -> Frame {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let d2 = (x as f32 - cx).powi(2) + (y as f32 - cy).powi(2);
                let v = (200.0 * (-d2 / (2.0 * sigma * sigma)).exp()).round() as u8;
                data.extend_from_slice(&[v, v, v]);
            }
        }
        Frame::from_rgb8(width, height, data).unwrap()
    }

    #[test]
    fn params_validate_rejects_zeros() {
        assert!(FlowParams { levels: 0, ..FlowParams::default() }.validate().is_err());
        assert!(FlowParams { win_radius: 0, ..FlowParams::default() }.validate().is_err());
        assert!(FlowParams { iterations: 0, ..FlowParams::default() }.validate().is_err());
        assert!(FlowParams::default().validate().is_ok());
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let a = Frame::filled(4, 4, [0, 0, 0]).unwrap();
        let b = Frame::filled(5, 4, [0, 0, 0]).unwrap();
        assert!(estimate_flow(&a, &b, &FlowParams::default()).is_err());
    }

    #[test]
    fn identical_frames_yield_zero_flow() {
        let f = blob_frame(24, 24, 12.0, 12.0, 4.0);
        let flow = estimate_flow(&f, &f, &FlowParams::default()).unwrap();
        for y in 0..flow.height() {
            for x in 0..flow.width() {
                let (dx, dy) = flow.get(x, y);
                assert_eq!((dx, dy), (0.0, 0.0));
            }
        }
    }

    #[test]
    fn translated_blob_recovers_horizontal_shift() {
        let prev = blob_frame(32, 32, 14.0, 16.0, 4.0);
        let next = blob_frame(32, 32, 16.0, 16.0, 4.0);
        let params = FlowParams {
            levels: 2,
            win_radius: 5,
            iterations: 3,
        };
        let flow = estimate_flow(&prev, &next, &params).unwrap();

        // Mean displacement over the blob core should point ~2px right.
        let mut sum_dx = 0.0;
        let mut sum_dy = 0.0;
        let mut count = 0.0;
        for y in 13..20u32 {
            for x in 11..18u32 {
                let (dx, dy) = flow.get(x, y);
                sum_dx += dx;
                sum_dy += dy;
                count += 1.0;
            }
        }
        let mean_dx = sum_dx / count;
        let mean_dy = sum_dy / count;
        assert!(mean_dx > 0.8 && mean_dx < 3.2, "mean_dx = {mean_dx}");
        assert!(mean_dy.abs() < 1.0, "mean_dy = {mean_dy}");
    }

    #[test]
    fn box_sum_matches_naive_small_case() {
        let src = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let sums = box_sum(&src, 3, 3, 1);
        // Center pixel sums the whole 3x3 grid.
        assert!((sums[4] - 45.0).abs() < 1e-5);
        // Corner sums its clamped 2x2 neighborhood.
        assert!((sums[0] - (1.0 + 2.0 + 4.0 + 5.0)).abs() < 1e-5);
    }
}
