//! Diffing encoder: turn canvas changes into minimal ANSI sequences.
//!
//! 1. Compare the presented canvas with the next one
//! 2. Emit cursor moves only when the next changed cell is not adjacent
//! 3. Track the last emitted colors to avoid redundant SGR sequences
//!
//! All output is accumulated in one byte buffer so the backend can flush it
//! with a single write.

use super::{Canvas, Cell, Rgb};
use std::io::Write;

/// Terminal state as last left by the encoder.
#[derive(Debug, Clone)]
pub struct DiffState {
    cursor_x: u16,
    cursor_y: u16,
    fg: Option<Rgb>,
    bg: Option<Rgb>,
}

impl Default for DiffState {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffState {
    /// State with the cursor at home and unknown colors.
    pub const fn new() -> Self {
        Self {
            cursor_x: 0,
            cursor_y: 0,
            fg: None,
            bg: None,
        }
    }

    /// Forget everything (e.g., after a full redraw).
    pub const fn reset(&mut self) {
        self.fg = None;
        self.bg = None;
        // Force cursor move on next write
        self.cursor_x = u16::MAX;
        self.cursor_y = u16::MAX;
    }
}

/// Statistics of one diff pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Number of cells that were different.
    pub cells_changed: usize,
    /// Number of cursor move sequences emitted.
    pub cursor_moves: usize,
    /// Number of color change sequences emitted.
    pub color_changes: usize,
}

/// Encode the cells of `next` that differ from `current`.
///
/// Both canvases must have the same size.
pub fn render_diff(
    current: &Canvas,
    next: &Canvas,
    output: &mut Vec<u8>,
    state: &mut DiffState,
) -> DiffResult {
    debug_assert_eq!(current.width(), next.width());
    debug_assert_eq!(current.height(), next.height());

    let mut result = DiffResult::default();
    let width = next.width();

    for (idx, (old, new)) in current.cells().iter().zip(next.cells()).enumerate() {
        if old == new {
            continue;
        }

        #[allow(clippy::cast_possible_truncation)]
        let (x, y) = ((idx % width as usize) as u16, (idx / width as usize) as u16);
        result.cells_changed += 1;

        if state.cursor_y != y || state.cursor_x != x {
            emit_cursor_move(output, x, y);
            state.cursor_x = x;
            state.cursor_y = y;
            result.cursor_moves += 1;
        }

        if state.fg != Some(new.fg()) {
            emit_fg_color(output, new.fg());
            state.fg = Some(new.fg());
            result.color_changes += 1;
        }
        if state.bg != Some(new.bg()) {
            emit_bg_color(output, new.bg());
            state.bg = Some(new.bg());
            result.color_changes += 1;
        }

        emit_glyph(output, new);
        state.cursor_x = state.cursor_x.saturating_add(1);
    }

    result
}

/// Encode the whole canvas, for the first frame or after a resize.
pub fn render_full(canvas: &Canvas, output: &mut Vec<u8>) {
    let mut last_fg: Option<Rgb> = None;
    let mut last_bg: Option<Rgb> = None;

    for (y, row) in (0..canvas.height()).zip(canvas.rows()) {
        emit_cursor_move(output, 0, y);
        for cell in row {
            if last_fg != Some(cell.fg()) {
                emit_fg_color(output, cell.fg());
                last_fg = Some(cell.fg());
            }
            if last_bg != Some(cell.bg()) {
                emit_bg_color(output, cell.bg());
                last_bg = Some(cell.bg());
            }
            emit_glyph(output, cell);
        }
    }

    output.extend_from_slice(b"\x1b[0m");
}

/// Emit a cursor move, using the short forms for home and column 1.
#[inline]
fn emit_cursor_move(output: &mut Vec<u8>, x: u16, y: u16) {
    // ANSI uses 1-indexed positions
    let row = u32::from(y) + 1;
    let col = u32::from(x) + 1;

    if row == 1 && col == 1 {
        output.extend_from_slice(b"\x1b[H");
    } else if col == 1 {
        let _ = write!(output, "\x1b[{row}H");
    } else {
        let _ = write!(output, "\x1b[{row};{col}H");
    }
}

#[inline]
fn emit_fg_color(output: &mut Vec<u8>, color: Rgb) {
    let _ = write!(output, "\x1b[38;2;{};{};{}m", color.r, color.g, color.b);
}

#[inline]
fn emit_bg_color(output: &mut Vec<u8>, color: Rgb) {
    let _ = write!(output, "\x1b[48;2;{};{};{}m", color.r, color.g, color.b);
}

#[inline]
fn emit_glyph(output: &mut Vec<u8>, cell: &Cell) {
    output.push(cell.glyph_byte());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_identical_canvases() {
        let a = Canvas::new(10, 5);
        let b = Canvas::new(10, 5);
        let mut output = Vec::new();
        let mut state = DiffState::new();

        let result = render_diff(&a, &b, &mut output, &mut state);

        assert_eq!(result.cells_changed, 0);
        assert!(output.is_empty());
    }

    #[test]
    fn test_diff_single_cell_change() {
        let a = Canvas::new(10, 5);
        let mut b = Canvas::new(10, 5);
        b.set(5, 2, Cell::new('X'));

        let mut output = Vec::new();
        let mut state = DiffState::new();
        let result = render_diff(&a, &b, &mut output, &mut state);

        assert_eq!(result.cells_changed, 1);
        assert_eq!(result.cursor_moves, 1);
        let output_str = String::from_utf8_lossy(&output);
        assert!(output_str.starts_with("\x1b[3;6H"));
        assert!(output_str.ends_with('X'));
    }

    #[test]
    fn test_diff_adjacent_cells_no_cursor_move() {
        let a = Canvas::new(10, 5);
        let mut b = Canvas::new(10, 5);
        b.set(0, 0, Cell::new('A'));
        b.set(1, 0, Cell::new('B'));
        b.set(2, 0, Cell::new('C'));

        let mut output = Vec::new();
        let mut state = DiffState::new();
        let result = render_diff(&a, &b, &mut output, &mut state);

        assert_eq!(result.cells_changed, 3);
        // Cursor starts at (0,0) and cells are adjacent
        assert_eq!(result.cursor_moves, 0);
    }

    #[test]
    fn test_diff_color_tracking() {
        let a = Canvas::new(10, 5);
        let mut b = Canvas::new(10, 5);
        let red = Rgb::new(255, 0, 0);
        b.set(0, 0, Cell::new('A').with_fg(red));
        b.set(1, 0, Cell::new('B').with_fg(red));

        let mut output = Vec::new();
        let mut state = DiffState::new();
        let result = render_diff(&a, &b, &mut output, &mut state);

        // fg and bg for the first cell, nothing for the second
        assert_eq!(result.color_changes, 2);
    }

    #[test]
    fn test_reset_forces_cursor_move() {
        let a = Canvas::new(4, 1);
        let mut b = Canvas::new(4, 1);
        b.set(0, 0, Cell::new('A'));

        let mut state = DiffState::new();
        state.reset();
        let mut output = Vec::new();
        let result = render_diff(&a, &b, &mut output, &mut state);
        assert_eq!(result.cursor_moves, 1);
        assert!(output.starts_with(b"\x1b[H"));
    }

    #[test]
    fn test_cursor_move_forms() {
        let mut output = Vec::new();
        emit_cursor_move(&mut output, 0, 0);
        assert_eq!(&output, b"\x1b[H");

        output.clear();
        emit_cursor_move(&mut output, 0, 5);
        assert_eq!(&output, b"\x1b[6H");

        output.clear();
        emit_cursor_move(&mut output, 10, 5);
        assert_eq!(&output, b"\x1b[6;11H");
    }

    #[test]
    fn test_render_full() {
        let mut canvas = Canvas::new(3, 2);
        canvas.set(0, 0, Cell::new('A'));
        canvas.set(1, 0, Cell::new('B'));
        canvas.set(2, 1, Cell::new('C'));

        let mut output = Vec::new();
        render_full(&canvas, &mut output);

        let output_str = String::from_utf8_lossy(&output);
        assert!(output_str.starts_with("\x1b[H"));
        assert!(output_str.contains("AB "));
        assert!(output_str.contains("\x1b[2H"));
        assert!(output_str.ends_with("C\x1b[0m"));
    }
}
