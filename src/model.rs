use crate::canvas::Rgb;
use crate::config::{MoonSpec, PlanetSpec};
use glam::Vec2;
use rand::Rng;
use std::collections::VecDeque;
use std::f32::consts::TAU;

/// Bounded history of positions, oldest first. Pushing past capacity
/// evicts the oldest entry.
#[derive(Clone, Debug)]
pub(crate) struct Trail {
    points: VecDeque<Vec2>,
    capacity: usize,
}

impl Trail {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn push(&mut self, p: Vec2) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(p);
    }

    pub(crate) fn len(&self) -> usize {
        self.points.len()
    }

    pub(crate) fn latest(&self) -> Option<Vec2> {
        self.points.back().copied()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.points.iter().copied()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StarLayer {
    /// static
    Foreground,
    /// drifts sideways for parallax
    Background,
}

#[derive(Clone, Debug)]
pub(crate) struct Star {
    pub(crate) pos: Vec2,
    pub(crate) base_brightness: u8,
    pub(crate) size: i32,
    pub(crate) layer: StarLayer,
    pub(crate) twinkle_speed: f32,
    pub(crate) twinkle_phase: f32,
    /// px per frame, zero on the foreground layer
    pub(crate) drift: f32,
}

impl Star {
    pub(crate) fn new<R: Rng>(layer: StarLayer, bounds: Vec2, rng: &mut R) -> Self {
        let x = rng.gen_range(0..=bounds.x as i32) as f32;
        let y = rng.gen_range(0..=bounds.y as i32) as f32;
        let (size, drift) = match layer {
            // one in four foreground stars is large
            StarLayer::Foreground => (if rng.gen_range(0..4) == 0 { 2 } else { 1 }, 0.0),
            StarLayer::Background => (1, rng.gen_range(0.01..0.03)),
        };
        Self {
            pos: Vec2::new(x, y),
            base_brightness: rng.gen_range(30..=255),
            size,
            layer,
            twinkle_speed: rng.gen_range(0.01..0.05),
            twinkle_phase: rng.gen_range(0.0..TAU),
            drift,
        }
    }

    /// Display brightness at `time_ms`; swings between 40% and 100% of base.
    pub(crate) fn brightness(&self, time_ms: f64) -> u8 {
        let phase = time_ms * self.twinkle_speed as f64 + self.twinkle_phase as f64;
        let twinkle = phase.sin() as f32 * 0.3 + 0.7;
        (self.base_brightness as f32 * twinkle) as u8
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Asteroid {
    pub(crate) distance: f32,
    pub(crate) angle: f32,
    pub(crate) speed: f32,
    pub(crate) size: i32,
    pub(crate) brightness: u8,
}

impl Asteroid {
    pub(crate) fn new<R: Rng>(band: (f32, f32), rng: &mut R) -> Self {
        Self {
            distance: rng.gen_range(band.0..band.1),
            angle: rng.gen_range(0.0..TAU),
            speed: rng.gen_range(0.002..0.008),
            size: if rng.gen_range(0..3) == 0 { 2 } else { 1 },
            brightness: rng.gen_range(100..=200),
        }
    }

    pub(crate) fn position(&self, sun: Vec2) -> Vec2 {
        sun + self.distance * Vec2::new(self.angle.cos(), self.angle.sin())
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Moon {
    pub(crate) distance: f32,
    pub(crate) radius: i32,
    pub(crate) color: Rgb,
    pub(crate) angle: f32,
    pub(crate) speed: f32,
    pub(crate) trail: Trail,
}

impl Moon {
    pub(crate) fn new<R: Rng>(spec: &MoonSpec, trail: usize, rng: &mut R) -> Self {
        Self {
            distance: spec.distance,
            radius: spec.radius,
            color: spec.color,
            angle: rng.gen_range(0.0..TAU),
            speed: rng.gen_range(0.05..0.15),
            trail: Trail::with_capacity(trail),
        }
    }

    /// World position for a given centre of the owning planet.
    pub(crate) fn position(&self, planet: Vec2) -> Vec2 {
        planet + self.distance * Vec2::new(self.angle.cos(), self.angle.sin())
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Planet {
    pub(crate) name: &'static str,
    pub(crate) radius: i32,
    pub(crate) color: Rgb,
    /// semi-major (x) axis
    pub(crate) a: f32,
    /// semi-minor (y) axis
    pub(crate) b: f32,
    pub(crate) speed: f32,
    pub(crate) angle: f32,
    pub(crate) trail: Trail,
    pub(crate) moons: Vec<Moon>,
    /// base colour first, brightest last
    pub(crate) gradient: [Rgb; 3],
}

/// Farther orbits are slower; a planet at 150 px moves at 1.0.
pub(crate) fn base_speed(distance: f32) -> f32 {
    1.0 / (distance / 150.0)
}

fn gradient_tiers(c: Rgb) -> [Rgb; 3] {
    let mut out = [c; 3];
    for (i, tier) in out.iter_mut().enumerate() {
        let factor = 1.0 - i as f32 * 0.15;
        *tier = c.scale(1.0 + (1.0 - factor) * 0.3);
    }
    out
}

impl Planet {
    pub(crate) fn new<R: Rng>(spec: &PlanetSpec, trail: usize, rng: &mut R) -> Self {
        Self {
            name: spec.name,
            radius: spec.radius,
            color: spec.color,
            a: spec.distance,
            b: spec.distance * spec.ellipse_factor,
            speed: base_speed(spec.distance) * (1.0 + spec.speed_variation),
            angle: rng.gen_range(0.0..TAU),
            trail: Trail::with_capacity(trail),
            moons: Vec::new(),
            gradient: gradient_tiers(spec.color),
        }
    }

    pub(crate) fn add_moon(&mut self, moon: Moon) {
        self.moons.push(moon);
    }

    /// Point on the orbit ellipse for the current angle.
    pub(crate) fn position(&self, sun: Vec2) -> Vec2 {
        sun + Vec2::new(self.a * self.angle.cos(), self.b * self.angle.sin())
    }
}
