//! Terminal renderer: an RGB pixel buffer drawn with Unicode half-blocks.

use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};

use crate::game::{self, Game, State};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb(pub u8, pub u8, pub u8);

const BLACK: Rgb = Rgb(0, 0, 0);
const SHADOW: Rgb = Rgb(30, 30, 30);
pub const BIRD: Rgb = Rgb(255, 255, 0);
pub const WALL: Rgb = Rgb(0, 255, 0);
pub const HUD: Rgb = Rgb(255, 255, 255);
pub const GAME_OVER: Rgb = Rgb(255, 0, 0);

// ── Pixel buffer with half-block rendering ──────────────────────────────────

pub struct PixelBuf {
    pub w: usize,
    pub h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![BLACK; w * h],
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, BLACK);
    }

    pub fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    /// Raw row-major pixel access; the camera background is copied in here.
    pub fn pixels_mut(&mut self) -> &mut [Rgb] {
        &mut self.px
    }

    /// Flush the buffer to the terminal, two pixels per character cell via
    /// the upper-half block, changing colors only when a run ends.
    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut prev_fg = BLACK;
        let mut prev_bg = BLACK;
        let mut need_fg = true;
        let mut need_bg = true;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    if need_bg || prev_bg != top {
                        queue!(
                            out,
                            style::SetBackgroundColor(CColor::Rgb {
                                r: top.0,
                                g: top.1,
                                b: top.2
                            })
                        )?;
                        prev_bg = top;
                        need_bg = false;
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if need_fg || prev_fg != top {
                        queue!(
                            out,
                            style::SetForegroundColor(CColor::Rgb {
                                r: top.0,
                                g: top.1,
                                b: top.2
                            })
                        )?;
                        prev_fg = top;
                        need_fg = false;
                    }
                    if need_bg || prev_bg != bot {
                        queue!(
                            out,
                            style::SetBackgroundColor(CColor::Rgb {
                                r: bot.0,
                                g: bot.1,
                                b: bot.2
                            })
                        )?;
                        prev_bg = bot;
                        need_bg = false;
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row < rows - 1 {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                need_fg = true;
                need_bg = true;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

// ── 3x5 bitmap glyphs ───────────────────────────────────────────────────────

#[rustfmt::skip]
fn glyph(ch: char) -> Option<[u8; 15]> {
    Some(match ch {
        '0' => [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1],
        '1' => [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1],
        '2' => [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1],
        '3' => [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1],
        '4' => [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1],
        '5' => [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1],
        '6' => [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1],
        '7' => [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0],
        '8' => [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1],
        '9' => [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1],
        'A' => [0,1,0, 1,0,1, 1,1,1, 1,0,1, 1,0,1],
        'E' => [1,1,1, 1,0,0, 1,1,1, 1,0,0, 1,1,1],
        'F' => [1,1,1, 1,0,0, 1,1,1, 1,0,0, 1,0,0],
        'G' => [1,1,1, 1,0,0, 1,0,1, 1,0,1, 1,1,1],
        'L' => [1,0,0, 1,0,0, 1,0,0, 1,0,0, 1,1,1],
        'M' => [1,0,1, 1,1,1, 1,0,1, 1,0,1, 1,0,1],
        'O' => [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1],
        'P' => [1,1,1, 1,0,1, 1,1,1, 1,0,0, 1,0,0],
        'R' => [1,1,0, 1,0,1, 1,1,0, 1,0,1, 1,0,1],
        'S' => [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1],
        'T' => [1,1,1, 0,1,0, 0,1,0, 0,1,0, 0,1,0],
        'V' => [1,0,1, 1,0,1, 1,0,1, 1,0,1, 0,1,0],
        _ => return None,
    })
}

fn draw_glyph(buf: &mut PixelBuf, x: i32, y: i32, g: &[u8; 15], fg: Rgb) {
    for row in 0..5 {
        for col in 0..3 {
            if g[row * 3 + col] == 1 {
                let px = x + col as i32;
                let py = y + row as i32;
                buf.set(px + 1, py + 1, SHADOW);
                buf.set(px, py, fg);
            }
        }
    }
}

/// Draw `text` centered on `cx`. 3px glyphs with 1px spacing; characters
/// without a glyph (spaces) advance the cursor and draw nothing.
pub fn draw_text(buf: &mut PixelBuf, cx: i32, y: i32, text: &str, fg: Rgb) {
    let total_w = text.len() as i32 * 4 - 1;
    let start_x = cx - total_w / 2;
    for (i, ch) in text.chars().enumerate() {
        if let Some(g) = glyph(ch) {
            draw_glyph(buf, start_x + i as i32 * 4, y, &g, fg);
        }
    }
}

// ── Scene ───────────────────────────────────────────────────────────────────

/// Map a logical-space rectangle to buffer pixels, rounding outward so thin
/// walls never disappear at small terminal sizes.
fn to_buf(buf: &PixelBuf, r: game::Rect) -> (i32, i32, i32, i32) {
    let sx = buf.w as f64 / game::WIDTH;
    let sy = buf.h as f64 / game::HEIGHT;
    let x0 = (r.x * sx).floor() as i32;
    let y0 = (r.y * sy).floor() as i32;
    let x1 = (r.right() * sx).ceil() as i32;
    let y1 = ((r.y + r.h) * sy).ceil() as i32;
    (x0, y0, x1 - x0, y1 - y0)
}

/// Draw the game over the already-present camera background: bird, walls,
/// score, and the restart prompt when the session has ended.
pub fn draw_scene(buf: &mut PixelBuf, game: &Game) {
    draw_bird(buf, game);
    draw_walls(buf, game);
    draw_score(buf, game);
    if game.state == State::GameOver {
        draw_game_over(buf);
    }
}

fn draw_bird(buf: &mut PixelBuf, game: &Game) {
    let sx = buf.w as f64 / game::WIDTH;
    let sy = buf.h as f64 / game::HEIGHT;
    let cx = (game::BIRD_X * sx).round() as i32;
    let cy = (game.bird_y * sy).round() as i32;
    let rx = (game::BIRD_RADIUS * sx).round().max(1.0);
    let ry = (game::BIRD_RADIUS * sy).round().max(1.0);

    for dy in -(ry as i32)..=(ry as i32) {
        for dx in -(rx as i32)..=(rx as i32) {
            let fx = dx as f64 / rx;
            let fy = dy as f64 / ry;
            if fx * fx + fy * fy <= 1.0 {
                buf.set(cx + dx, cy + dy, BIRD);
            }
        }
    }
}

fn draw_walls(buf: &mut PixelBuf, game: &Game) {
    for wall in &game.walls {
        for rect in [wall.top(), wall.bottom()] {
            let (x, y, w, h) = to_buf(buf, rect);
            buf.fill_rect(x, y, w, h, WALL);
        }
    }
}

fn draw_score(buf: &mut PixelBuf, game: &Game) {
    draw_text(buf, buf.w as i32 / 2, 2, &game.score.to_string(), HUD);
    if game.best > 0 {
        draw_text(buf, buf.w as i32 - 8, 2, &game.best.to_string(), BIRD);
    }
}

fn draw_game_over(buf: &mut PixelBuf) {
    let cx = buf.w as i32 / 2;
    let cy = buf.h as i32 / 2;
    draw_text(buf, cx, cy - 7, "GAME OVER", GAME_OVER);
    draw_text(buf, cx, cy + 1, "FLAP TO RESTART", GAME_OVER);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::WallPair;
    use std::time::Instant;

    #[test]
    fn set_clips_out_of_bounds() {
        let mut buf = PixelBuf::new(4, 4);
        buf.set(-1, 0, BIRD);
        buf.set(0, -1, BIRD);
        buf.set(4, 0, BIRD);
        buf.set(0, 4, BIRD);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(buf.get(x, y), BLACK);
            }
        }
    }

    #[test]
    fn fill_rect_clips_at_edges() {
        let mut buf = PixelBuf::new(4, 4);
        buf.fill_rect(2, 2, 10, 10, WALL);
        assert_eq!(buf.get(3, 3), WALL);
        assert_eq!(buf.get(1, 1), BLACK);
    }

    #[test]
    fn resize_changes_capacity() {
        let mut buf = PixelBuf::new(2, 2);
        buf.resize(8, 6);
        assert_eq!(buf.w, 8);
        assert_eq!(buf.h, 6);
        buf.set(7, 5, BIRD);
        assert_eq!(buf.get(7, 5), BIRD);
    }

    #[test]
    fn glyphs_cover_everything_we_draw() {
        for ch in "GAME OVER FLAP TO RESTART 0123456789".chars() {
            if ch != ' ' {
                assert!(glyph(ch).is_some(), "missing glyph for {ch:?}");
            }
        }
    }

    #[test]
    fn bird_is_drawn_at_its_scaled_center() {
        let mut buf = PixelBuf::new(64, 48);
        let game = Game::new(Instant::now());
        draw_scene(&mut buf, &game);
        // 640x480 logical -> 64x48 buffer is a 1/10 scale: center (10, 24).
        assert_eq!(buf.get(10, 24), BIRD);
    }

    #[test]
    fn walls_are_drawn_scaled() {
        let mut buf = PixelBuf::new(64, 48);
        let mut game = Game::new(Instant::now());
        game.walls.push(WallPair::new(320.0, 160.0));
        draw_scene(&mut buf, &game);
        // Top wall spans x 320..380, y 0..160 logically: x 32..38, y 0..16.
        // Sample away from the score HUD in the top-center.
        assert_eq!(buf.get(36, 10), WALL);
        // Inside the gap band nothing is painted.
        assert_eq!(buf.get(36, 20), BLACK);
    }

    #[test]
    fn game_over_text_only_when_ended() {
        let mut alive = PixelBuf::new(80, 48);
        let mut dead = PixelBuf::new(80, 48);
        let mut game = Game::new(Instant::now());
        draw_scene(&mut alive, &game);
        game.state = State::GameOver;
        draw_scene(&mut dead, &game);

        let count = |buf: &PixelBuf| {
            (0..48)
                .flat_map(|y| (0..80).map(move |x| (x, y)))
                .filter(|&(x, y)| buf.get(x, y) == GAME_OVER)
                .count()
        };
        assert_eq!(count(&alive), 0);
        assert!(count(&dead) > 0);
    }

    #[test]
    fn text_is_centered() {
        let mut buf = PixelBuf::new(40, 10);
        draw_text(&mut buf, 20, 2, "0", HUD);
        // A single glyph is 3 wide, centered on x=20: columns 19..=21.
        assert_eq!(buf.get(19, 2), HUD);
        assert_eq!(buf.get(21, 2), HUD);
    }
}
