use crate::camera::Camera;
use crate::canvas::{Canvas, Rgb};
use crate::config::{Args, Encoding, SceneConfig};
use crate::draw::{draw_scene, Label};
use crate::render::{
    draw_text, encode_blocks, encode_braille, overlay_labels, pixel_size, Projection, Terminal,
};
use crate::sim::SolarSystem;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::Color;
use rand::{rngs::StdRng, SeedableRng};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoopState {
    Running,
    Stopped,
}

/// Caps the loop at a fixed rate. Slow frames are not made up for.
pub(crate) struct FrameClock {
    frame_dt: Duration,
    last_tick: Instant,
}

impl FrameClock {
    pub(crate) fn new(fps: u32) -> Self {
        Self {
            frame_dt: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            last_tick: Instant::now(),
        }
    }

    /// How long to wait so that a frame started at `last` ends no earlier
    /// than `frame_dt` later.
    fn remaining(&self, now: Instant) -> Duration {
        (self.last_tick + self.frame_dt).saturating_duration_since(now)
    }

    /// Blocks until the next frame is due and returns the real length of the
    /// frame that just ended, in milliseconds.
    pub(crate) fn tick(&mut self) -> f64 {
        let now = Instant::now();
        spin_sleep(self.remaining(now), now);
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        elapsed.as_secs_f64() * 1000.0
    }
}

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}

/// Close requests. Raw mode swallows SIGINT, so Ctrl-C arrives as a key.
fn is_quit(ev: &Event) -> bool {
    match ev {
        Event::Key(k) if k.kind != KeyEventKind::Release => match k.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
            KeyCode::Char('c') => k.modifiers.contains(KeyModifiers::CONTROL),
            _ => false,
        },
        _ => false,
    }
}

pub(crate) struct App {
    cfg: SceneConfig,
    encoding: Encoding,
    hud: bool,
    system: SolarSystem,
    camera: Camera,
    canvas: Canvas,
    labels: Vec<Label>,
    term: Terminal,
    state: LoopState,
    /// total elapsed ms, summed from real frame lengths
    time_ms: f64,
    frames: u64,
    fps_smooth: f64,
}

impl App {
    fn init(args: &Args) -> anyhow::Result<Self> {
        let cfg = SceneConfig::from_args(args);

        let seed = if args.seed != 0 {
            args.seed
        } else {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0x9E37_79B9_7F4A_7C15)
        };
        let mut rng = StdRng::seed_from_u64(seed);
        let system = SolarSystem::new(&cfg, &mut rng);
        info!(
            seed,
            stars = system.stars.len(),
            asteroids = system.asteroids.len(),
            planets = system.planets.len(),
            fps = cfg.fps,
            encoding = ?args.encoding,
            "scene built"
        );

        let term = Terminal::begin(cfg.title)?;
        let canvas = Canvas::new(cfg.size.x as u32, cfg.size.y as u32);

        Ok(Self {
            cfg,
            encoding: args.encoding,
            hud: args.hud,
            system,
            camera: Camera::new(),
            canvas,
            labels: Vec::new(),
            term,
            state: LoopState::Running,
            time_ms: 0.0,
            frames: 0,
            fps_smooth: 0.0,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let mut clock = FrameClock::new(self.cfg.fps);
        let mut frame_ms = 0.0;

        while self.state == LoopState::Running {
            while event::poll(Duration::ZERO)? {
                if is_quit(&event::read()?) {
                    self.state = LoopState::Stopped;
                }
            }
            if self.state == LoopState::Stopped {
                break;
            }

            if self.term.resize_if_needed()? {
                debug!(
                    cols = self.term.cols,
                    rows = self.term.rows,
                    "terminal resized"
                );
            }

            self.time_ms += frame_ms;
            self.frame();
            self.term.present()?;

            frame_ms = clock.tick();
            self.frames += 1;
            if frame_ms > 0.0 {
                let inst = 1000.0 / frame_ms;
                self.fps_smooth = if self.fps_smooth == 0.0 {
                    inst
                } else {
                    self.fps_smooth * 0.9 + inst * 0.1
                };
            }
        }

        info!(frames = self.frames, seconds = self.time_ms / 1000.0, "stopped");
        Ok(())
    }

    /// camera, update, draw, then encode into the terminal's cell buffer
    fn frame(&mut self) {
        self.camera.advance(self.time_ms);
        self.canvas.clear(Rgb::BLACK);

        self.system.update(self.time_ms, &self.cfg);
        draw_scene(
            &mut self.canvas,
            &self.system,
            &self.cfg,
            self.time_ms,
            &mut self.labels,
        );

        let pixels = pixel_size(self.term.cols, self.term.rows, self.encoding);
        let proj = Projection::fit(self.cfg.size, pixels, self.camera);
        match self.encoding {
            Encoding::Blocks => encode_blocks(&self.canvas, &proj, &mut self.term.cur),
            Encoding::Braille => encode_braille(&self.canvas, &proj, &mut self.term.cur),
        }
        overlay_labels(&mut self.term.cur, &self.labels, &proj, self.encoding);

        if self.hud {
            let pan = self.camera.pan();
            let line = format!(
                " fps:{:.0}  zoom:{:.3}  pan:{:+.0},{:+.0}  t:{:.1}s  (q quit) ",
                self.fps_smooth,
                self.camera.zoom(),
                pan.x,
                pan.y,
                self.time_ms / 1000.0
            );
            draw_text(&mut self.term.cur, 0, 0, &line, Color::DarkGrey, Color::Black);
        }
    }
}

pub(crate) fn run(args: Args) -> anyhow::Result<()> {
    let mut app = App::init(&args)?;
    let res = app.run();
    let end = app.term.end();
    res.and(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new_with_kind(code, modifiers, KeyEventKind::Press))
    }

    #[test]
    fn only_close_requests_quit() {
        assert!(is_quit(&key(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit(&key(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit(&key(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_quit(&key(KeyCode::Char(' '), KeyModifiers::NONE)));
        assert!(!is_quit(&Event::Resize(80, 24)));
        assert!(!is_quit(&Event::FocusLost));
    }

    #[test]
    fn clock_waits_out_the_frame() {
        let clock = FrameClock::new(60);
        let start = clock.last_tick;
        let r = clock.remaining(start);
        assert!(r > Duration::from_millis(16) && r <= Duration::from_millis(17));
        assert_eq!(clock.remaining(start + Duration::from_millis(40)), Duration::ZERO);
    }

    #[test]
    fn tick_reports_at_least_one_frame() {
        let mut clock = FrameClock::new(200);
        let ms = clock.tick();
        assert!(ms >= 4.9, "{ms}");
        let ms = clock.tick();
        assert!(ms >= 4.9, "{ms}");
    }
}
