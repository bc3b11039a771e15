use crate::canvas::Rgb;
use clap::{Parser, ValueEnum};
use glam::Vec2;

/// How the canvas is packed into terminal cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Encoding {
    /// upper half block, 1x2 pixels per cell, two colours per cell
    Blocks,
    /// braille dots, 2x4 pixels per cell, one colour per cell
    Braille,
}

#[derive(Parser, Debug)]
#[command(name = "solarsystem", about = "Cinematic solar system in the terminal. q / Esc quits.")]
pub(crate) struct Args {
    /// target frames per second
    #[arg(long, default_value_t = 60)]
    pub(crate) fps: u32,

    /// rng seed (0 = fresh seed every run)
    #[arg(long, default_value_t = 0)]
    pub(crate) seed: u64,

    /// cell encoding for the canvas
    #[arg(long, value_enum, default_value_t = Encoding::Blocks)]
    pub(crate) encoding: Encoding,

    /// show a status line
    #[arg(long)]
    pub(crate) hud: bool,
}

/// Scene-wide constants. Built once and shared read-only.
#[derive(Clone, Debug)]
pub(crate) struct SceneConfig {
    pub(crate) title: &'static str,
    pub(crate) size: Vec2,
    pub(crate) sun: Vec2,
    pub(crate) sun_radius: f32,
    pub(crate) sun_color: Rgb,
    pub(crate) foreground_stars: usize,
    pub(crate) background_stars: usize,
    pub(crate) asteroids: usize,
    pub(crate) belt: (f32, f32),
    /// Fixed per-frame scale applied to orbital speeds.
    pub(crate) orbit_step: f32,
    pub(crate) planet_trail: usize,
    pub(crate) moon_trail: usize,
    pub(crate) fps: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let size = Vec2::new(800.0, 600.0);
        Self {
            title: "Solar System - Cinematic",
            size,
            sun: size * 0.5,
            sun_radius: 30.0,
            sun_color: Rgb::new(255, 220, 100),
            foreground_stars: 75,
            background_stars: 50,
            asteroids: 50,
            belt: (260.0, 300.0),
            orbit_step: 0.01,
            planet_trail: 50,
            moon_trail: 15,
            fps: 60,
        }
    }
}

impl SceneConfig {
    pub(crate) fn from_args(args: &Args) -> Self {
        Self {
            fps: args.fps.clamp(1, 240),
            ..Self::default()
        }
    }
}

pub(crate) struct PlanetSpec {
    pub(crate) name: &'static str,
    pub(crate) distance: f32,
    pub(crate) radius: i32,
    pub(crate) color: Rgb,
    pub(crate) speed_variation: f32,
    pub(crate) ellipse_factor: f32,
}

pub(crate) struct MoonSpec {
    /// index into [`PLANETS`]
    pub(crate) planet: usize,
    pub(crate) distance: f32,
    pub(crate) radius: i32,
    pub(crate) color: Rgb,
}

pub(crate) const PLANETS: [PlanetSpec; 8] = [
    PlanetSpec {
        name: "Mercury",
        distance: 95.0,
        radius: 5,
        color: Rgb::new(180, 180, 180),
        speed_variation: 0.15,
        ellipse_factor: 0.96,
    },
    PlanetSpec {
        name: "Venus",
        distance: 135.0,
        radius: 9,
        color: Rgb::new(255, 220, 120),
        speed_variation: 0.08,
        ellipse_factor: 0.98,
    },
    PlanetSpec {
        name: "Earth",
        distance: 185.0,
        radius: 10,
        color: Rgb::new(100, 150, 255),
        speed_variation: 0.05,
        ellipse_factor: 1.0,
    },
    PlanetSpec {
        name: "Mars",
        distance: 235.0,
        radius: 8,
        color: Rgb::new(255, 120, 80),
        speed_variation: -0.03,
        ellipse_factor: 0.97,
    },
    PlanetSpec {
        name: "Jupiter",
        distance: 320.0,
        radius: 22,
        color: Rgb::new(255, 200, 140),
        speed_variation: 0.02,
        ellipse_factor: 1.05,
    },
    PlanetSpec {
        name: "Saturn",
        distance: 400.0,
        radius: 19,
        color: Rgb::new(230, 210, 160),
        speed_variation: -0.01,
        ellipse_factor: 1.08,
    },
    PlanetSpec {
        name: "Uranus",
        distance: 480.0,
        radius: 14,
        color: Rgb::new(160, 200, 255),
        speed_variation: 0.03,
        ellipse_factor: 1.02,
    },
    PlanetSpec {
        name: "Neptune",
        distance: 540.0,
        radius: 13,
        color: Rgb::new(80, 120, 255),
        speed_variation: -0.02,
        ellipse_factor: 1.01,
    },
];

pub(crate) const MOONS: [MoonSpec; 3] = [
    MoonSpec {
        planet: 2,
        distance: 18.0,
        radius: 3,
        color: Rgb::gray(200),
    },
    MoonSpec {
        planet: 4,
        distance: 30.0,
        radius: 4,
        color: Rgb::gray(220),
    },
    MoonSpec {
        planet: 4,
        distance: 40.0,
        radius: 3,
        color: Rgb::gray(180),
    },
];
