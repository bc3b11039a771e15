use glam::Vec2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl Rgb {
    pub(crate) const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub(crate) const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub(crate) const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub(crate) const fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Channel-wise multiply, truncating and saturating at 255.
    pub(crate) fn scale(self, k: f32) -> Rgb {
        let f = |c: u8| (c as f32 * k).clamp(0.0, 255.0) as u8;
        Rgb {
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
        }
    }

    pub(crate) fn mix(self, o: Rgb, t: f32) -> Rgb {
        Rgb {
            r: lerp_u8(self.r, o.r, t),
            g: lerp_u8(self.g, o.g, t),
            b: lerp_u8(self.b, o.b, t),
        }
    }

    pub(crate) fn luma(self) -> f32 {
        0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32
    }
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let aa = a as f32;
    let bb = b as f32;
    (aa + (bb - aa) * t).clamp(0.0, 255.0).round() as u8
}

/// Off-screen RGB frame buffer everything is painted onto before presenting.
pub(crate) struct Canvas {
    w: u32,
    h: u32,
    px: Vec<Rgb>,
}

impl Canvas {
    pub(crate) fn new(w: u32, h: u32) -> Self {
        Self {
            w,
            h,
            px: vec![Rgb::BLACK; (w as usize) * (h as usize)],
        }
    }

    fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    pub(crate) fn clear(&mut self, c: Rgb) {
        self.px.fill(c);
    }

    pub(crate) fn get(&self, x: i32, y: i32) -> Option<Rgb> {
        if x < 0 || y < 0 || x as u32 >= self.w || y as u32 >= self.h {
            return None;
        }
        Some(self.px[self.idx(x as u32, y as u32)])
    }

    fn blend_over(&mut self, x: i32, y: i32, src: Rgb, alpha: f32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.w || y >= self.h {
            return;
        }
        let i = self.idx(x, y);
        self.px[i] = if alpha >= 1.0 { src } else { self.px[i].mix(src, alpha) };
    }

    /// Solid disc. The centre snaps to the pixel grid the way integer
    /// drawing APIs do; radius < 1 draws nothing.
    pub(crate) fn fill_circle(&mut self, center: Vec2, radius: i32, c: Rgb) {
        self.fill_circle_alpha(center, radius, c, 1.0);
    }

    /// Disc composited over what is already there with constant `alpha`.
    pub(crate) fn fill_circle_alpha(&mut self, center: Vec2, radius: i32, c: Rgb, alpha: f32) {
        if radius < 1 || alpha <= 0.0 {
            return;
        }
        let cx = center.x.floor() as i32;
        let cy = center.y.floor() as i32;
        let r2 = radius * radius;
        for dy in -radius..=radius {
            let span = ((r2 - dy * dy) as f32).sqrt() as i32;
            for dx in -span..=span {
                self.blend_over(cx + dx, cy + dy, c, alpha);
            }
        }
    }
}
