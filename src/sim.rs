use crate::config::{SceneConfig, MOONS, PLANETS};
use crate::model::{Asteroid, Moon, Planet, Star, StarLayer};
use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

/// Speeds are small enough that one subtraction per frame keeps the angle
/// in `[0, TAU)`.
fn wrap_once(angle: f32) -> f32 {
    if angle >= TAU {
        angle - TAU
    } else {
        angle
    }
}

impl Planet {
    /// Advance one frame, record the new position and carry the moons along.
    /// Moons are placed around this frame's position, never the previous one.
    pub(crate) fn update(&mut self, time_ms: f64, sun: Vec2, step: f32) -> Vec2 {
        let wobble = (time_ms * 0.001 + self.angle as f64).sin() as f32 * 0.0001;
        self.angle = wrap_once(self.angle + (self.speed + wobble) * step);

        let pos = self.position(sun);
        self.trail.push(pos);

        for moon in self.moons.iter_mut() {
            moon.update(pos, step);
        }
        pos
    }
}

impl Moon {
    pub(crate) fn update(&mut self, planet: Vec2, step: f32) -> Vec2 {
        self.angle = wrap_once(self.angle + self.speed * step);
        let pos = self.position(planet);
        self.trail.push(pos);
        pos
    }
}

impl Star {
    /// Horizontal toroidal scroll for the background layer.
    pub(crate) fn scroll(&mut self, width: f32) {
        if self.layer != StarLayer::Background {
            return;
        }
        self.pos.x += self.drift;
        if self.pos.x > width {
            self.pos.x = 0.0;
        } else if self.pos.x < 0.0 {
            self.pos.x = width;
        }
    }
}

impl Asteroid {
    pub(crate) fn advance(&mut self) {
        self.angle = wrap_once(self.angle + self.speed);
    }
}

/// Every entity in the scene. Built once, mutated each frame, never resized.
pub(crate) struct SolarSystem {
    pub(crate) sun: Vec2,
    pub(crate) stars: Vec<Star>,
    pub(crate) asteroids: Vec<Asteroid>,
    pub(crate) planets: Vec<Planet>,
}

impl SolarSystem {
    pub(crate) fn new<R: Rng>(cfg: &SceneConfig, rng: &mut R) -> Self {
        let mut stars = Vec::with_capacity(cfg.foreground_stars + cfg.background_stars);
        for _ in 0..cfg.foreground_stars {
            stars.push(Star::new(StarLayer::Foreground, cfg.size, rng));
        }
        for _ in 0..cfg.background_stars {
            stars.push(Star::new(StarLayer::Background, cfg.size, rng));
        }

        let mut planets: Vec<Planet> = PLANETS
            .iter()
            .map(|spec| Planet::new(spec, cfg.planet_trail, rng))
            .collect();
        for spec in MOONS.iter() {
            let moon = Moon::new(spec, cfg.moon_trail, rng);
            planets[spec.planet].add_moon(moon);
        }

        let asteroids = (0..cfg.asteroids)
            .map(|_| Asteroid::new(cfg.belt, rng))
            .collect();

        Self {
            sun: cfg.sun,
            stars,
            asteroids,
            planets,
        }
    }

    pub(crate) fn update(&mut self, time_ms: f64, cfg: &SceneConfig) {
        for star in self.stars.iter_mut() {
            star.scroll(cfg.size.x);
        }
        for asteroid in self.asteroids.iter_mut() {
            asteroid.advance();
        }
        for planet in self.planets.iter_mut() {
            planet.update(time_ms, self.sun, cfg.orbit_step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Rgb;
    use crate::config::PlanetSpec;
    use crate::model::base_speed;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn system(seed: u64) -> (SolarSystem, SceneConfig) {
        let cfg = SceneConfig::default();
        let mut rng = StdRng::seed_from_u64(seed);
        (SolarSystem::new(&cfg, &mut rng), cfg)
    }

    #[test]
    fn scene_composition() {
        let (sys, _) = system(1);
        assert_eq!(sys.stars.len(), 125);
        let background = sys
            .stars
            .iter()
            .filter(|s| s.layer == StarLayer::Background)
            .count();
        assert_eq!(background, 50);
        assert_eq!(sys.asteroids.len(), 50);
        assert_eq!(sys.planets.len(), 8);
        assert_eq!(sys.planets[2].name, "Earth");
        assert_eq!(sys.planets[2].moons.len(), 1);
        assert_eq!(sys.planets[4].moons.len(), 2);
        let moonless: usize = sys.planets.iter().filter(|p| p.moons.is_empty()).count();
        assert_eq!(moonless, 6);
    }

    #[test]
    fn angles_stay_wrapped() {
        let (mut sys, cfg) = system(2);
        let mut t = 0.0;
        for _ in 0..20_000 {
            t += 16.0;
            sys.update(t, &cfg);
            for p in &sys.planets {
                assert!(
                    p.angle >= 0.0 && p.angle < TAU,
                    "{} angle {}",
                    p.name,
                    p.angle
                );
                for m in &p.moons {
                    assert!(m.angle >= 0.0 && m.angle < TAU);
                }
            }
            for a in &sys.asteroids {
                assert!(a.angle >= 0.0 && a.angle < TAU);
            }
        }
    }

    #[test]
    fn trails_bounded() {
        let (mut sys, cfg) = system(3);
        for f in 0..120 {
            sys.update(f as f64 * 16.0, &cfg);
            for p in &sys.planets {
                assert!(p.trail.len() <= 50);
                assert_eq!(p.trail.len(), (f + 1).min(50));
                for m in &p.moons {
                    assert!(m.trail.len() <= 15);
                }
            }
        }
    }

    #[test]
    fn moons_follow_current_planet_position() {
        let (mut sys, cfg) = system(4);
        for f in 0..30 {
            sys.update(f as f64 * 16.0, &cfg);
            for p in &sys.planets {
                let here = p.trail.latest().unwrap();
                assert_eq!(here, p.position(sys.sun));
                for m in &p.moons {
                    let moon = m.trail.latest().unwrap();
                    let expected = m.position(here);
                    assert_relative_eq!(moon.x, expected.x, epsilon = 1e-3);
                    assert_relative_eq!(moon.y, expected.y, epsilon = 1e-3);
                }
            }
        }
    }

    #[test]
    fn earth_like_planet_single_step() {
        let spec = PlanetSpec {
            name: "Earth",
            distance: 185.0,
            radius: 10,
            color: Rgb::new(100, 150, 255),
            speed_variation: 0.05,
            ellipse_factor: 1.0,
        };
        let mut rng = StdRng::seed_from_u64(9);
        let mut p = Planet::new(&spec, 50, &mut rng);
        p.angle = 1.0;

        let sun = Vec2::new(400.0, 300.0);
        let pos = p.update(0.0, sun, 0.01);

        let expected = base_speed(185.0) * 1.05 * 0.01;
        assert_relative_eq!(p.angle - 1.0, expected, epsilon = 2e-6);
        assert_relative_eq!(pos.distance(sun), 185.0, epsilon = 1e-3);
        assert_eq!(p.trail.len(), 1);
    }

    #[test]
    fn wraps_by_subtracting_once() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut p = Planet::new(&PLANETS[0], 50, &mut rng);
        p.angle = TAU - 1e-4;
        p.update(0.0, Vec2::ZERO, 0.01);
        assert!(p.angle < 0.05 && p.angle >= 0.0);
    }

    #[test]
    fn moon_keeps_its_distance() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut m = Moon::new(&MOONS[0], 15, &mut rng);
        let center = Vec2::new(450.0, 300.0);
        for _ in 0..100 {
            let pos = m.update(center, 0.01);
            assert_relative_eq!(pos.distance(center), 18.0, epsilon = 1e-3);
        }
        assert_eq!(m.trail.len(), 15);
    }

    #[test]
    fn background_stars_wrap_horizontally() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut s = Star::new(StarLayer::Background, Vec2::new(800.0, 600.0), &mut rng);
        s.pos.x = 799.99;
        s.drift = 0.03;
        s.scroll(800.0);
        assert_eq!(s.pos.x, 0.0);

        s.drift = -0.03;
        s.scroll(800.0);
        assert_eq!(s.pos.x, 800.0);

        let (mut sys, cfg) = system(14);
        for _ in 0..50_000 {
            sys.update(0.0, &cfg);
        }
        for s in &sys.stars {
            assert!(s.pos.x >= 0.0 && s.pos.x <= 800.0);
        }
    }

    #[test]
    fn foreground_stars_never_move() {
        let mut rng = StdRng::seed_from_u64(15);
        let mut s = Star::new(StarLayer::Foreground, Vec2::new(800.0, 600.0), &mut rng);
        let before = s.pos;
        for _ in 0..100 {
            s.scroll(800.0);
        }
        assert_eq!(s.pos, before);
    }

    #[test]
    fn asteroids_advance_by_their_speed() {
        let (mut sys, cfg) = system(16);
        let before: Vec<(f32, f32)> = sys.asteroids.iter().map(|a| (a.angle, a.speed)).collect();
        sys.update(0.0, &cfg);
        for (a, (angle, speed)) in sys.asteroids.iter().zip(before) {
            assert_relative_eq!(a.angle, wrap_once(angle + speed), epsilon = 1e-6);
        }
    }
}
