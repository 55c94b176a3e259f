use crate::foundation::error::{SignflowError, SignflowResult};

/// Dense per-pixel displacement field between two equal-dimension frames.
///
/// For each pixel of the first frame, `(dx, dy)` estimates the offset to
/// its corresponding location in the second frame. Fields exist only
/// transiently during one transition computation.
#[derive(Clone, Debug)]
pub struct MotionField {
    width: u32,
    height: u32,
    dx: Vec<f32>,
    dy: Vec<f32>,
}

impl MotionField {
    /// All-zero field of the given dimensions.
    pub fn zeros(width: u32, height: u32) -> SignflowResult<Self> {
        if width == 0 || height == 0 {
            return Err(SignflowError::validation(
                "motion field dimensions must be non-zero",
            ));
        }
        let n = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            dx: vec![0.0; n],
            dy: vec![0.0; n],
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Displacement at integer coordinates.
    pub fn get(&self, x: u32, y: u32) -> (f32, f32) {
        let i = y as usize * self.width as usize + x as usize;
        (self.dx[i], self.dy[i])
    }

    /// Set displacement at integer coordinates.
    pub fn set(&mut self, x: u32, y: u32, dx: f32, dy: f32) {
        let i = y as usize * self.width as usize + x as usize;
        self.dx[i] = dx;
        self.dy[i] = dy;
    }

    /// Add to the displacement at integer coordinates.
    pub fn add(&mut self, x: u32, y: u32, du: f32, dv: f32) {
        let i = y as usize * self.width as usize + x as usize;
        self.dx[i] += du;
        self.dy[i] += dv;
    }

    /// Raw x-displacement plane, row-major.
    pub fn dx(&self) -> &[f32] {
        &self.dx
    }

    /// Raw y-displacement plane, row-major.
    pub fn dy(&self) -> &[f32] {
        &self.dy
    }

    /// Resample this field to new dimensions, scaling displacement values
    /// by the dimension ratio. Used when propagating flow from a coarse
    /// pyramid level to a finer one.
    pub fn upsample_to(&self, width: u32, height: u32) -> SignflowResult<Self> {
        let mut out = Self::zeros(width, height)?;
        let sx = self.width as f32 / width as f32;
        let sy = self.height as f32 / height as f32;
        let scale_x = width as f32 / self.width as f32;
        let scale_y = height as f32 / self.height as f32;

        for y in 0..height {
            let src_y = ((y as f32 + 0.5) * sy - 0.5)
                .clamp(0.0, self.height as f32 - 1.0);
            for x in 0..width {
                let src_x = ((x as f32 + 0.5) * sx - 0.5)
                    .clamp(0.0, self.width as f32 - 1.0);
                let (dx, dy) = self.sample_bilinear(src_x, src_y);
                out.set(x, y, dx * scale_x, dy * scale_y);
            }
        }
        Ok(out)
    }

    fn sample_bilinear(&self, fx: f32, fy: f32) -> (f32, f32) {
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let clamp_x = |x: f32| (x.max(0.0) as u32).min(self.width - 1);
        let clamp_y = |y: f32| (y.max(0.0) as u32).min(self.height - 1);
        let (x0c, x1c) = (clamp_x(x0), clamp_x(x0 + 1.0));
        let (y0c, y1c) = (clamp_y(y0), clamp_y(y0 + 1.0));

        let lerp2 = |p00: f32, p10: f32, p01: f32, p11: f32| {
            let top = p00 * (1.0 - tx) + p10 * tx;
            let bot = p01 * (1.0 - tx) + p11 * tx;
            top * (1.0 - ty) + bot * ty
        };

        let at = |x: u32, y: u32| y as usize * self.width as usize + x as usize;
        let dx = lerp2(
            self.dx[at(x0c, y0c)],
            self.dx[at(x1c, y0c)],
            self.dx[at(x0c, y1c)],
            self.dx[at(x1c, y1c)],
        );
        let dy = lerp2(
            self.dy[at(x0c, y0c)],
            self.dy[at(x1c, y0c)],
            self.dy[at(x0c, y1c)],
            self.dy[at(x1c, y1c)],
        );
        (dx, dy)
    }
}
