/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Screen layout:
///   row 0       HUD: score, lives, coins left, timer, gesture label,
///               hold bar with seconds to go
///   row 2..     maze, two terminal columns per tile
///   below maze  status line, key help
/// Intro / Won / Lost draw a centered panel over the maze.

use std::io::{self, BufWriter, Write};
use std::time::Instant;

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Direction, Pos};
use crate::domain::tile::Tile;
use crate::sim::game::Game;
use crate::sim::world::{GameState, Phase};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Differs from any real cell, so every position gets diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell { ch, fg, bg });
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let len = s.chars().count();
        let x = self.width.saturating_sub(len) / 2;
        self.put_str(x, y, s, fg, bg);
    }
}

// ── Renderer ──

/// Each maze tile = 2 terminal columns.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const BAR_W: usize = 10;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        self.sync_size(true)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    fn sync_size(&mut self, force: bool) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if force || tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }
        Ok(())
    }

    pub fn render(&mut self, game: &Game, now: Instant) -> io::Result<()> {
        self.sync_size(false)?;

        let state = &game.state;
        if self.last_phase != Some(state.phase) {
            self.back.cells.fill(Cell::INVALID);
            self.last_phase = Some(state.phase);
        }

        self.front.clear();
        self.compose_hud(game, now);
        self.compose_maze(state);
        self.compose_footer(state);
        match state.phase {
            Phase::Intro => self.compose_intro(state),
            Phase::Won => self.compose_result(state, "YOU ESCAPED!", Color::Green),
            Phase::Lost => self.compose_result(state, "GAME OVER", Color::Red),
            Phase::Running => {}
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, game: &Game, now: Instant) {
        let s = &game.state;
        let hearts: String = "♥".repeat(s.lives as usize);
        let hud = format!(
            " Score:{:<5} Lives:{:<4} Coins:{:<3} Time:{:02}:{:02}  Gesture:{:<6}",
            s.score, hearts, s.maze.count(Tile::Coin), s.elapsed_secs / 60, s.elapsed_secs % 60,
            game.gesture_label().as_str(),
        );
        self.front.put_str(0, HUD_ROW, &hud, Color::White, Cell::BASE_BG);

        let progress = game.hold_progress(now);
        let filled = (progress * BAR_W as f32).round() as usize;
        let bar: String = (0..BAR_W).map(|i| if i < filled { '█' } else { '░' }).collect();
        let bar_color = if progress >= 1.0 { Color::Green } else { Color::Yellow };
        let x = hud.chars().count() + 1;
        self.front.put_str(x, HUD_ROW, &bar, bar_color, Cell::BASE_BG);

        let left = game.hold_seconds_left(now);
        let (countdown, fg) = if progress > 0.0 {
            (format!("{left}s"), Color::White)
        } else {
            (format!("Hold {left}s"), Color::DarkGrey)
        };
        self.front.put_str(x + BAR_W + 1, HUD_ROW, &countdown, fg, Cell::BASE_BG);
    }

    fn compose_maze(&mut self, s: &GameState) {
        for (gy, row) in s.maze.rows().iter().enumerate() {
            for (gx, tile) in row.iter().enumerate() {
                let pos = Pos::new(gx, gy);
                let (glyph, fg, bg) = if pos == s.enemy.pos {
                    ("Ω ", Color::Red, Cell::BASE_BG)
                } else if pos == s.player.pos {
                    (facing_glyph(s.player.facing), Color::Yellow, Cell::BASE_BG)
                } else {
                    tile_glyph(*tile)
                };
                let col = gx * CELL_W;
                self.front.put_str(col, MAP_ROW + gy, glyph, fg, bg);
            }
        }
    }

    fn compose_footer(&mut self, s: &GameState) {
        let row = MAP_ROW + s.maze.height() + 1;
        self.front.put_str(1, row, &s.status, Color::Cyan, Cell::BASE_BG);
        self.front.put_str(
            1,
            row + 1,
            "hold ↑/W ↓/S ←/A →/D  SPACE=fire   R=restart  ENTER=start  Q=quit",
            Color::DarkGrey,
            Cell::BASE_BG,
        );
    }

    fn panel_rows(&self, s: &GameState, lines: usize) -> usize {
        let mid = MAP_ROW + s.maze.height() / 2;
        mid.saturating_sub(lines / 2)
    }

    fn compose_intro(&mut self, s: &GameState) {
        let lines = [
            format!("  {}  ", s.level_name),
            String::new(),
            "  Reach the flag, dodge the hunter.  ".to_string(),
            "  Hold a gesture for 3 seconds to act.  ".to_string(),
            String::new(),
            "  index=UP  pinky=DOWN  fist=LEFT  index+middle=RIGHT  palm=FIRE  ".to_string(),
            String::new(),
            "  Hold FIRE or press ENTER to start  ".to_string(),
        ];
        self.compose_panel(s, &lines, Color::White);
    }

    fn compose_result(&mut self, s: &GameState, title: &str, color: Color) {
        let lines = [
            format!("  {title}  "),
            String::new(),
            format!(
                "  Time {:02}:{:02}   Score {}   Lives {}  ",
                s.elapsed_secs / 60, s.elapsed_secs % 60, s.score, s.lives
            ),
            String::new(),
            "  Hold FIRE or press R to play again  ".to_string(),
        ];
        self.compose_panel(s, &lines, color);
    }

    fn compose_panel(&mut self, s: &GameState, lines: &[String], title_color: Color) {
        let panel_bg = Color::Rgb { r: 40, g: 40, b: 70 };
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let top = self.panel_rows(s, lines.len());
        for (i, line) in lines.iter().enumerate() {
            let padded = format!("{line:^width$}");
            let fg = if i == 0 { title_color } else { Color::White };
            self.front.put_centered(top + i, &padded, fg, panel_bg);
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer::new()
    }
}

fn facing_glyph(dir: Direction) -> &'static str {
    match dir {
        Direction::Up => "▲ ",
        Direction::Down => "▼ ",
        Direction::Left => "◀ ",
        Direction::Right => "▶ ",
    }
}

fn tile_glyph(tile: Tile) -> (&'static str, Color, Color) {
    match tile {
        Tile::Wall => ("██", Color::Rgb { r: 90, g: 90, b: 120 }, Cell::BASE_BG),
        Tile::Destructible => ("▒▒", Color::Rgb { r: 200, g: 120, b: 50 }, Cell::BASE_BG),
        Tile::Coin => ("$ ", Color::Rgb { r: 255, g: 215, b: 0 }, Cell::BASE_BG),
        Tile::Goal => ("⚑ ", Color::Green, Cell::BASE_BG),
        Tile::Empty | Tile::StartMarker => ("· ", Color::Rgb { r: 50, g: 50, b: 70 }, Cell::BASE_BG),
    }
}
