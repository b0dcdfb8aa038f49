//! Game session state: bird physics, wall obstacles, collision, restart.
//!
//! All coordinates live in a fixed 640×480 logical space; the renderer scales
//! them to whatever the terminal provides.

use std::time::{Duration, Instant};

use rand::Rng;

pub const WIDTH: f64 = 640.0;
pub const HEIGHT: f64 = 480.0;

pub const BIRD_X: f64 = 100.0;
pub const BIRD_RADIUS: f64 = 20.0;
const BIRD_START_Y: f64 = HEIGHT / 2.0;

const GRAVITY: f64 = 0.25;
const FLAP_IMPULSE: f64 = -6.0;

pub const WALL_WIDTH: f64 = 60.0;
pub const GAP_HEIGHT: f64 = 160.0;
const WALL_SPEED: f64 = 4.0;
const WALL_INTERVAL: Duration = Duration::from_millis(2700);
// Gap offset stays at least this far from the top, and the gap's bottom this
// far from the bottom, so a passage always exists on screen.
const GAP_MARGIN: f64 = 100.0;

/// Axis-aligned rectangle in logical coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    /// Strict overlap: rectangles that only share an edge do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

/// A top/bottom wall pair sharing one horizontal position. The gap spans
/// `[gap_y, gap_y + GAP_HEIGHT)` vertically.
#[derive(Clone, Copy, Debug)]
pub struct WallPair {
    pub x: f64,
    pub gap_y: f64,
    scored: bool,
}

impl WallPair {
    pub fn new(x: f64, gap_y: f64) -> Self {
        Self {
            x,
            gap_y,
            scored: false,
        }
    }

    pub fn top(&self) -> Rect {
        Rect {
            x: self.x,
            y: 0.0,
            w: WALL_WIDTH,
            h: self.gap_y,
        }
    }

    pub fn bottom(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.gap_y + GAP_HEIGHT,
            w: WALL_WIDTH,
            h: HEIGHT - self.gap_y - GAP_HEIGHT,
        }
    }

    fn right(&self) -> f64 {
        self.x + WALL_WIDTH
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Playing,
    GameOver,
}

pub struct Game {
    pub bird_y: f64,
    pub bird_vy: f64,
    pub walls: Vec<WallPair>,
    pub state: State,
    pub score: u32,
    pub best: u32,
    last_wall: Instant,
}

impl Game {
    pub fn new(now: Instant) -> Self {
        Game {
            bird_y: BIRD_START_Y,
            bird_vy: 0.0,
            walls: Vec::new(),
            state: State::Playing,
            score: 0,
            best: 0,
            last_wall: now,
        }
    }

    fn reset(&mut self, now: Instant) {
        *self = Game {
            best: self.best,
            ..Game::new(now)
        };
    }

    /// Advance the session by one tick. `flap` is this frame's gesture
    /// signal, `now` drives the wall spawn clock.
    pub fn step<R: Rng>(&mut self, flap: bool, now: Instant, rng: &mut R) {
        if self.state == State::GameOver {
            // Frozen: the only thing a dead bird can do is restart.
            if flap {
                self.reset(now);
            }
            return;
        }

        if flap {
            self.bird_vy = FLAP_IMPULSE;
        }
        self.bird_vy += GRAVITY;
        self.bird_y += self.bird_vy;

        if now.duration_since(self.last_wall) > WALL_INTERVAL {
            let gap_y = rng.gen_range(GAP_MARGIN..=HEIGHT - GAP_MARGIN - GAP_HEIGHT);
            self.walls.push(WallPair::new(WIDTH, gap_y));
            self.last_wall = now;
        }

        for wall in &mut self.walls {
            wall.x -= WALL_SPEED;
            if !wall.scored && wall.right() < BIRD_X {
                wall.scored = true;
                self.score += 1;
            }
        }
        self.walls.retain(|w| w.right() > 0.0);

        if self.hit() {
            self.state = State::GameOver;
            self.best = self.best.max(self.score);
        }
    }

    pub fn bird_rect(&self) -> Rect {
        Rect {
            x: BIRD_X - BIRD_RADIUS,
            y: self.bird_y - BIRD_RADIUS,
            w: BIRD_RADIUS * 2.0,
            h: BIRD_RADIUS * 2.0,
        }
    }

    /// True when the bird's bounding square intersects any wall rectangle or
    /// its center has left the vertical screen bounds.
    pub fn hit(&self) -> bool {
        if self.bird_y < 0.0 || self.bird_y > HEIGHT {
            return true;
        }
        let bird = self.bird_rect();
        self.walls
            .iter()
            .any(|w| bird.overlaps(&w.top()) || bird.overlaps(&w.bottom()))
    }
}
