//! Paints one frame of the scene onto the off-screen canvas, back to front:
//! stars, asteroid belt, sun, then each planet with its trail and moons.
//! Text is not rasterized here; labels are collected and overlaid on the
//! terminal cells after the camera has been applied.

use crate::canvas::{Canvas, Rgb};
use crate::config::SceneConfig;
use crate::model::{Planet, Trail};
use crate::sim::SolarSystem;
use glam::Vec2;

const PLANET_GLOW: Rgb = Rgb::gray(50);
const SUN_LABEL_GLOW: Rgb = Rgb::new(100, 80, 30);
const LABEL_GAP: f32 = 15.0;
const SUN_LABEL_GAP: f32 = 20.0;

/// (extra radius, share of the pulse, alpha, colour), outermost first.
const SUN_GLOW: [(f32, f32, f32, Rgb); 5] = [
    (60.0, 1.0, 0.08, Rgb::new(255, 180, 50)),
    (45.0, 0.8, 0.12, Rgb::new(255, 200, 70)),
    (30.0, 0.6, 0.18, Rgb::new(255, 210, 85)),
    (20.0, 0.4, 0.25, Rgb::new(255, 215, 95)),
    (10.0, 0.2, 0.35, Rgb::new(255, 218, 98)),
];

/// (radius reduction, colour) of the solid core, largest first.
const SUN_CORE: [(i32, Rgb); 2] = [
    (5, Rgb::new(255, 230, 120)),
    (10, Rgb::new(255, 240, 140)),
];

/// Text anchored by its centre in canvas coordinates.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Label {
    pub(crate) text: &'static str,
    pub(crate) anchor: Vec2,
    pub(crate) fg: Rgb,
    pub(crate) glow: Rgb,
}

pub(crate) fn draw_scene(
    canvas: &mut Canvas,
    sys: &SolarSystem,
    cfg: &SceneConfig,
    time_ms: f64,
    labels: &mut Vec<Label>,
) {
    labels.clear();
    draw_stars(canvas, sys, time_ms);
    draw_asteroid_belt(canvas, sys);
    draw_sun(canvas, cfg, time_ms, labels);
    for planet in &sys.planets {
        draw_planet(canvas, planet, labels);
    }
}

fn draw_stars(canvas: &mut Canvas, sys: &SolarSystem, time_ms: f64) {
    for star in &sys.stars {
        let color = Rgb::gray(star.brightness(time_ms));
        canvas.fill_circle(star.pos, star.size, color);
    }
}

fn draw_asteroid_belt(canvas: &mut Canvas, sys: &SolarSystem) {
    for rock in &sys.asteroids {
        canvas.fill_circle(
            rock.position(sys.sun),
            rock.size,
            Rgb::gray(rock.brightness),
        );
    }
}

fn draw_sun(canvas: &mut Canvas, cfg: &SceneConfig, time_ms: f64, labels: &mut Vec<Label>) {
    let pulse = (time_ms * 0.003).sin() as f32 * 15.0;
    for (extra, share, alpha, color) in SUN_GLOW {
        let radius = (cfg.sun_radius + extra + pulse * share) as i32;
        canvas.fill_circle_alpha(cfg.sun, radius, color, alpha);
    }

    let core = cfg.sun_radius as i32;
    canvas.fill_circle(cfg.sun, core, cfg.sun_color);
    for (shrink, color) in SUN_CORE {
        canvas.fill_circle(cfg.sun, core - shrink, color);
    }

    labels.push(Label {
        text: "Sun",
        anchor: cfg.sun - Vec2::new(0.0, cfg.sun_radius + SUN_LABEL_GAP),
        fg: Rgb::WHITE,
        glow: SUN_LABEL_GLOW,
    });
}

/// Older points are dimmer and smaller; the newest point sits under the
/// body and is skipped.
fn draw_trail(
    canvas: &mut Canvas,
    trail: &Trail,
    color: Rgb,
    brightness: f32,
    radius: impl Fn(f32) -> i32,
) {
    let len = trail.len();
    for (i, p) in trail.iter().take(len.saturating_sub(1)).enumerate() {
        let t = i as f32 / len as f32;
        canvas.fill_circle_alpha(p, radius(t), color, t * brightness);
    }
}

fn draw_planet(canvas: &mut Canvas, planet: &Planet, labels: &mut Vec<Label>) {
    let Some(pos) = planet.trail.latest() else {
        return;
    };

    let r = planet.radius;
    draw_trail(canvas, &planet.trail, planet.color, 0.5, |t| {
        ((r as f32 * t * 0.7) as i32).max(1)
    });

    for (i, color) in planet.gradient.iter().enumerate() {
        let layer = r - i as i32 * 2;
        if layer > 0 {
            canvas.fill_circle(pos, layer, *color);
        }
    }

    for moon in &planet.moons {
        let Some(mpos) = moon.trail.latest() else {
            continue;
        };
        draw_trail(canvas, &moon.trail, moon.color, 0.3, |_| 1);
        canvas.fill_circle(mpos, moon.radius, moon.color);
    }

    labels.push(Label {
        text: planet.name,
        anchor: pos - Vec2::new(0.0, r as f32 + LABEL_GAP),
        fg: Rgb::WHITE,
        glow: PLANET_GLOW,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PLANETS;
    use rand::{rngs::StdRng, SeedableRng};

    fn frame(updates: usize) -> (Canvas, SolarSystem, SceneConfig, Vec<Label>) {
        let cfg = SceneConfig::default();
        let mut rng = StdRng::seed_from_u64(21);
        let mut sys = SolarSystem::new(&cfg, &mut rng);
        for f in 0..updates {
            sys.update(f as f64 * 16.0, &cfg);
        }
        let mut canvas = Canvas::new(cfg.size.x as u32, cfg.size.y as u32);
        let mut labels = Vec::new();
        draw_scene(&mut canvas, &sys, &cfg, updates as f64 * 16.0, &mut labels);
        (canvas, sys, cfg, labels)
    }

    #[test]
    fn sun_core_is_brightest_tier() {
        let (canvas, _, cfg, _) = frame(0);
        let c = canvas.get(cfg.sun.x as i32, cfg.sun.y as i32).unwrap();
        assert_eq!(c, Rgb::new(255, 240, 140));
        // between core tiers
        let ring = canvas.get(cfg.sun.x as i32 + 27, cfg.sun.y as i32).unwrap();
        assert_eq!(ring, cfg.sun_color);
    }

    #[test]
    fn glow_is_translucent_and_fades_outward() {
        let (canvas, _, cfg, _) = frame(0);
        let y = cfg.sun.y as i32;
        let near = canvas.get(cfg.sun.x as i32 + 35, y).unwrap();
        let far = canvas.get(cfg.sun.x as i32 + 80, y).unwrap();
        assert!(near.luma() > far.luma());
        assert!(far.r < 255 && far.r > 0);
    }

    #[test]
    fn labels_for_sun_and_every_planet() {
        let (_, sys, _, labels) = frame(3);
        assert_eq!(labels.len(), 1 + PLANETS.len());
        assert_eq!(labels[0].text, "Sun");
        assert_eq!(labels[0].anchor, Vec2::new(400.0, 250.0));
        assert_eq!(labels[0].glow, SUN_LABEL_GLOW);
        for (label, planet) in labels[1..].iter().zip(&sys.planets) {
            let pos = planet.trail.latest().unwrap();
            assert_eq!(label.text, planet.name);
            assert_eq!(label.anchor, pos - Vec2::new(0.0, planet.radius as f32 + 15.0));
        }
    }

    #[test]
    fn planets_not_drawn_before_first_update() {
        let (_, _, _, labels) = frame(0);
        assert_eq!(labels.len(), 1);
    }

    #[test]
    fn body_layers_brighten_towards_centre() {
        let cfg = SceneConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut jupiter = Planet::new(&PLANETS[4], 50, &mut rng);
        jupiter.angle = 0.0;
        let pos = jupiter.update(0.0, cfg.sun, 0.0);

        let mut canvas = Canvas::new(800, 600);
        let mut labels = Vec::new();
        draw_planet(&mut canvas, &jupiter, &mut labels);

        let (x, y) = (pos.x as i32, pos.y as i32);
        assert_eq!(canvas.get(x, y), Some(jupiter.gradient[2]));
        assert_eq!(canvas.get(x + 21, y), Some(jupiter.gradient[0]));
        assert_eq!(canvas.get(x + 19, y), Some(jupiter.gradient[1]));
    }

    #[test]
    fn trail_fades_with_age() {
        let mut trail = Trail::with_capacity(10);
        for i in 0..10 {
            trail.push(Vec2::new(10.0 + i as f32 * 10.0, 10.0));
        }
        let mut canvas = Canvas::new(120, 20);
        draw_trail(&mut canvas, &trail, Rgb::gray(200), 0.5, |_| 1);
        // oldest point has t = 0 and leaves no mark, newest is skipped
        assert_eq!(canvas.get(10, 10), Some(Rgb::BLACK));
        assert_eq!(canvas.get(100, 10), Some(Rgb::BLACK));
        let mid = canvas.get(50, 10).unwrap();
        let late = canvas.get(90, 10).unwrap();
        assert!(late.r > mid.r && mid.r > 0);
        assert_eq!(late, Rgb::gray(80));
    }
}
