use glam::Vec2;

pub(crate) const ZOOM_MIN: f32 = 0.96;
pub(crate) const ZOOM_MAX: f32 = 1.04;
const ZOOM_STEP: f32 = 0.0003;

/// Slow ping-pong zoom plus a sinusoidal pan, applied to the finished
/// canvas at presentation time.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Camera {
    zoom: f32,
    direction: f32,
    pan: Vec2,
}

impl Camera {
    pub(crate) fn new() -> Self {
        Self {
            zoom: 1.0,
            direction: 1.0,
            pan: Vec2::ZERO,
        }
    }

    pub(crate) fn zoom(&self) -> f32 {
        self.zoom
    }

    pub(crate) fn pan(&self) -> Vec2 {
        self.pan
    }

    pub(crate) fn advance(&mut self, time_ms: f64) {
        self.zoom += ZOOM_STEP * self.direction;
        if self.zoom >= ZOOM_MAX {
            self.zoom = ZOOM_MAX;
            self.direction = -1.0;
        } else if self.zoom <= ZOOM_MIN {
            self.zoom = ZOOM_MIN;
            self.direction = 1.0;
        }

        self.pan = Vec2::new(
            (time_ms * 0.0002).sin() as f32 * 30.0,
            (time_ms * 0.00015).cos() as f32 * 15.0,
        );
    }

    /// Top-left corner of the scaled canvas on a surface of `size`: recentres
    /// the zoomed image, then applies the pan.
    fn offset(&self, size: Vec2) -> Vec2 {
        self.pan - (size * self.zoom - size) * 0.5
    }

    pub(crate) fn to_surface(&self, canvas: Vec2, size: Vec2) -> Vec2 {
        canvas * self.zoom + self.offset(size)
    }

    pub(crate) fn to_canvas(&self, surface: Vec2, size: Vec2) -> Vec2 {
        (surface - self.offset(size)) / self.zoom
    }
}
