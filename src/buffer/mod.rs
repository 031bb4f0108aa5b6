//! Cell buffer and drawing primitives.
//!
//! The [`Buffer`] is a 2D grid of [`Cell`]s representing what should appear
//! on the terminal. The render phase of the engine writes into it; how its
//! contents reach a TTY is the embedding application's concern.
//!
//! # Design Decisions
//!
//! - **Flat storage**: `Vec<Cell>` with row-major indexing for cache
//!   efficiency.
//! - **Clipping**: string and span writers take a `max_width` in cells and
//!   stop there; all writers ignore out-of-bounds coordinates.
//! - **Wide characters**: a wide glyph occupies its cell and leaves a
//!   continuation cell (`'\0'`) to its right so diffing stays cell-exact.

mod layer;

pub use layer::Layer;

use crate::text_measure::char_width;
use crate::types::{BorderStyle, Cell, Style};

// =============================================================================
// Span
// =============================================================================

/// A styled run of text, the unit rich text is made of.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

impl Span {
    pub fn new(text: impl Into<String>, style: Style) -> Span {
        Span {
            text: text.into(),
            style,
        }
    }

    /// A span with the default style.
    pub fn plain(text: impl Into<String>) -> Span {
        Span {
            text: text.into(),
            style: Style::new(),
        }
    }
}

// =============================================================================
// Buffer
// =============================================================================

/// A 2D buffer of terminal cells.
///
/// Uses flat storage with row-major indexing: `index = y * width + x`
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer {
    width: i16,
    height: i16,
    cells: Vec<Cell>,
}

impl Buffer {
    /// Create a new buffer filled with blank cells.
    pub fn new(width: i16, height: i16) -> Buffer {
        let width = width.max(0);
        let height = height.max(0);
        Buffer {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> i16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i16 {
        self.height
    }

    #[inline]
    fn index(&self, x: i16, y: i16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn in_bounds(&self, x: i16, y: i16) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Cell at (x, y), or `None` when out of bounds.
    #[inline]
    pub fn get(&self, x: i16, y: i16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            Some(&self.cells[idx])
        } else {
            None
        }
    }

    /// Set a single cell. Out-of-bounds writes are dropped.
    #[inline]
    pub fn set(&mut self, x: i16, y: i16, cell: Cell) {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            self.cells[idx] = cell;
        }
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Resize the buffer, clearing its content.
    pub fn resize(&mut self, width: i16, height: i16) {
        self.width = width.max(0);
        self.height = height.max(0);
        self.cells.clear();
        self.cells
            .resize(self.width as usize * self.height as usize, Cell::default());
    }

    // =========================================================================
    // Drawing Primitives
    // =========================================================================

    /// Write a string at (x, y), clipped to `max_width` display cells.
    ///
    /// Wide glyphs that would straddle the clip edge are dropped. Returns
    /// the number of cells written.
    pub fn write_str(&mut self, x: i16, y: i16, text: &str, style: Style, max_width: i16) -> i16 {
        if y < 0 || y >= self.height || max_width <= 0 {
            return 0;
        }

        let limit = (x as i32 + max_width as i32).min(self.width as i32) as i16;
        let mut col = x;

        for ch in text.chars() {
            let w = char_width(ch) as i16;
            if w == 0 {
                continue;
            }
            if col + w > limit {
                break;
            }

            self.set(col, y, Cell::new(ch, style));
            if w == 2 {
                // Continuation marker under the right half of a wide glyph.
                self.set(col + 1, y, Cell::new('\0', style));
            }
            col += w;
        }

        (col - x).max(0)
    }

    /// Write styled runs at (x, y), clipped to `max_width` display cells
    /// in total.
    pub fn write_spans(&mut self, x: i16, y: i16, spans: &[Span], max_width: i16) {
        let mut col = x;
        let mut budget = max_width;

        for span in spans {
            if budget <= 0 {
                break;
            }
            let written = self.write_str(col, y, &span.text, span.style, budget);
            col += written;
            budget -= written;
        }
    }

    /// Draw a progress bar: `ratio` of `width` cells filled.
    pub fn write_progress_bar(&mut self, x: i16, y: i16, width: i16, ratio: f32, style: Style) {
        if width <= 0 {
            return;
        }

        let ratio = ratio.clamp(0.0, 1.0);
        let filled = (ratio * width as f32).round() as i16;

        for col in 0..width {
            let ch = if col < filled { '█' } else { '░' };
            self.set(x + col, y, Cell::new(ch, style));
        }
    }

    /// Draw a border around the rectangle `(x, y, width, height)`.
    ///
    /// Degenerate rectangles (under 2x2) and [`BorderStyle::None`] draw
    /// nothing.
    pub fn draw_border(
        &mut self,
        x: i16,
        y: i16,
        width: i16,
        height: i16,
        border: BorderStyle,
        style: Style,
    ) {
        if width < 2 || height < 2 || border == BorderStyle::None {
            return;
        }

        let (horiz, vert, tl, tr, br, bl) = border.chars();
        let x2 = x + width - 1;
        let y2 = y + height - 1;

        self.set(x, y, Cell::new(tl, style));
        self.set(x2, y, Cell::new(tr, style));
        self.set(x2, y2, Cell::new(br, style));
        self.set(x, y2, Cell::new(bl, style));

        for col in (x + 1)..x2 {
            self.set(col, y, Cell::new(horiz, style));
            self.set(col, y2, Cell::new(horiz, style));
        }

        for row in (y + 1)..y2 {
            self.set(x, row, Cell::new(vert, style));
            self.set(x2, row, Cell::new(vert, style));
        }
    }

    /// Copy a rectangle of cells from `src`.
    ///
    /// Reads `w`x`h` cells starting at `(src_x, src_y)` and writes them at
    /// `(dest_x, dest_y)`, dropping anything out of bounds on either side.
    pub fn copy_rect(
        &mut self,
        src: &Buffer,
        src_x: i16,
        src_y: i16,
        dest_x: i16,
        dest_y: i16,
        w: i16,
        h: i16,
    ) {
        for row in 0..h {
            for col in 0..w {
                if let Some(cell) = src.get(src_x + col, src_y + row) {
                    self.set(dest_x + col, dest_y + row, *cell);
                }
            }
        }
    }
}
