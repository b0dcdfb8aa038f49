//! Flappy Nose Bird: a Flappy Bird clone you control by jerking your nose
//! upward in front of the webcam. The mirrored camera feed is the game
//! background, rendered in the terminal with half-block pixels.
//!
//! A cascade classifier model for the nose (`nose.xml` by default) must be
//! available at startup. Diagnostics go through `RUST_LOG`; redirect stderr
//! to a file while the game owns the terminal, e.g.
//! `RUST_LOG=debug flappy-nose 2>flappy.log`.

mod audio;
mod game;
mod gesture;
mod render;
mod vision;

use std::io::{Stdout, Write, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyModifiers},
    execute, terminal,
};
use log::{debug, info, warn};
use opencv::core::Mat;

use audio::Sounds;
use game::{Game, State};
use gesture::FlapDetector;
use render::PixelBuf;
use vision::{Camera, NoseFinder};

const FRAME: Duration = Duration::from_millis(33); // ~30 fps

#[derive(Parser)]
#[command(version, about = "Flappy Bird, played with your nose via the webcam")]
struct Args {
    /// Webcam device index.
    #[arg(long, default_value_t = 0)]
    camera: i32,

    /// Path to the nose cascade classifier model.
    #[arg(long, default_value = "nose.xml")]
    cascade: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Both external resources are startup dependencies: fail loudly before
    // touching the terminal.
    let finder = NoseFinder::load(&args.cascade)?;
    let camera = Camera::open(args.camera)?;

    terminal::enable_raw_mode()?;
    let mut out = stdout();
    execute!(
        out,
        terminal::EnterAlternateScreen,
        terminal::SetTitle("Flappy Nose Bird"),
        cursor::Hide,
        terminal::DisableLineWrap,
    )?;

    let result = run(&mut out, camera, finder);
    restore_terminal(&mut out)?;
    result
}

fn restore_terminal(out: &mut Stdout) -> Result<()> {
    execute!(
        out,
        terminal::LeaveAlternateScreen,
        cursor::Show,
        terminal::EnableLineWrap,
    )?;
    terminal::disable_raw_mode()?;
    Ok(())
}

fn run(out: &mut Stdout, mut camera: Camera, mut finder: NoseFinder) -> Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut buf = PixelBuf::new(cols as usize, rows as usize * 2);
    let mut game = Game::new(Instant::now());
    let mut tracker = FlapDetector::new();
    let mut rng = rand::thread_rng();
    let sounds = match Sounds::new() {
        Ok(sounds) => Some(sounds),
        Err(e) => {
            warn!("audio disabled: {e}");
            None
        }
    };
    let mut frame = Mat::default();

    info!("entering game loop");
    loop {
        let frame_start = Instant::now();

        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => {
                    let ctrl_c = key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL);
                    if ctrl_c || matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                        camera.release()?;
                        info!("quit requested");
                        return Ok(());
                    }
                }
                Event::Resize(c, r) => buf.resize(c as usize, r as usize * 2),
                _ => {}
            }
        }

        // A dropped frame skips the whole tick: no state update, no render.
        if !camera.grab(&mut frame)? {
            debug!("dropped camera frame");
            continue;
        }

        let nose = finder.detect(&frame)?;
        if let Some(nose) = nose {
            vision::draw_nose_box(&mut frame, nose)?;
        }
        let flap = tracker.observe(nose.map(vision::nose_center_y));

        let state_before = game.state;
        game.step(flap, Instant::now(), &mut rng);
        if let Some(sounds) = &sounds {
            if flap {
                sounds.flap();
            }
            if state_before == State::Playing && game.state == State::GameOver {
                sounds.death();
            }
        }

        vision::background_into(&frame, &mut buf)?;
        render::draw_scene(&mut buf, &game);
        buf.render(out)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}
