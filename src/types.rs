//! Core types shared across the engine.
//!
//! The cell model is deliberately small: a [`Cell`] is one terminal cell
//! (a `char` plus a [`Style`]), a [`Style`] is foreground + background
//! [`Color`] plus an [`Attr`] bitfield. The layout side contributes
//! [`Rect`] and [`ChildSize`], used by custom layout closures.

// =============================================================================
// Color
// =============================================================================

/// A terminal color.
///
/// Covers the four addressing modes terminals actually support: the
/// terminal's own default, the basic 16 colors, the 256-color palette,
/// and 24-bit true color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    /// The terminal's configured default.
    #[default]
    Default,
    /// One of the 16 basic colors (0-7 normal, 8-15 bright).
    Basic(u8),
    /// One of the 256 palette colors.
    Indexed(u8),
    /// 24-bit true color.
    Rgb(u8, u8, u8),
}

impl Color {
    pub const BLACK: Color = Color::Basic(0);
    pub const RED: Color = Color::Basic(1);
    pub const GREEN: Color = Color::Basic(2);
    pub const YELLOW: Color = Color::Basic(3);
    pub const BLUE: Color = Color::Basic(4);
    pub const MAGENTA: Color = Color::Basic(5);
    pub const CYAN: Color = Color::Basic(6);
    pub const WHITE: Color = Color::Basic(7);

    pub const BRIGHT_BLACK: Color = Color::Basic(8);
    pub const BRIGHT_RED: Color = Color::Basic(9);
    pub const BRIGHT_GREEN: Color = Color::Basic(10);
    pub const BRIGHT_YELLOW: Color = Color::Basic(11);
    pub const BRIGHT_BLUE: Color = Color::Basic(12);
    pub const BRIGHT_MAGENTA: Color = Color::Basic(13);
    pub const BRIGHT_CYAN: Color = Color::Basic(14);
    pub const BRIGHT_WHITE: Color = Color::Basic(15);

    /// 24-bit color from a packed hex value (e.g. `0xFF5500`).
    pub const fn hex(hex: u32) -> Color {
        Color::Rgb(
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }
}

// =============================================================================
// Cell Attributes (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Text attributes as a bitfield for efficient storage and comparison.
    ///
    /// Combine with bitwise OR: `Attr::BOLD | Attr::ITALIC`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const BLINK = 1 << 4;
        const INVERSE = 1 << 5;
        const STRIKETHROUGH = 1 << 6;
    }
}

// =============================================================================
// Style
// =============================================================================

/// Foreground, background and attributes for a cell.
///
/// Constructors chain: `Style::default().fg(Color::CYAN).bold()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attr,
}

impl Style {
    pub const fn new() -> Style {
        Style {
            fg: Color::Default,
            bg: Color::Default,
            attrs: Attr::NONE,
        }
    }

    pub const fn fg(mut self, color: Color) -> Style {
        self.fg = color;
        self
    }

    pub const fn bg(mut self, color: Color) -> Style {
        self.bg = color;
        self
    }

    pub const fn attrs(mut self, attrs: Attr) -> Style {
        self.attrs = attrs;
        self
    }

    pub fn bold(mut self) -> Style {
        self.attrs |= Attr::BOLD;
        self
    }

    pub fn dim(mut self) -> Style {
        self.attrs |= Attr::DIM;
        self
    }

    pub fn italic(mut self) -> Style {
        self.attrs |= Attr::ITALIC;
        self
    }

    pub fn underline(mut self) -> Style {
        self.attrs |= Attr::UNDERLINE;
        self
    }

    pub fn inverse(mut self) -> Style {
        self.attrs |= Attr::INVERSE;
        self
    }

    pub fn strikethrough(mut self) -> Style {
        self.attrs |= Attr::STRIKETHROUGH;
        self
    }
}

// =============================================================================
// Cell - The atomic unit of terminal rendering
// =============================================================================

/// A single terminal cell.
///
/// This is what the buffer stores and what the render phase produces.
/// Nothing more complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Cell {
    pub const fn new(ch: char, style: Style) -> Cell {
        Cell { ch, style }
    }
}

impl Default for Cell {
    fn default() -> Cell {
        Cell {
            ch: ' ',
            style: Style::new(),
        }
    }
}

// =============================================================================
// BorderStyle
// =============================================================================

/// Box-drawing character set for container borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    None,
    /// ─ │ ┌ ┐ └ ┘
    Single,
    /// ═ ║ ╔ ╗ ╚ ╝
    Double,
    /// ─ │ ╭ ╮ ╰ ╯
    Rounded,
    /// ━ ┃ ┏ ┓ ┗ ┛
    Bold,
    /// - | + + + +
    Ascii,
}

impl BorderStyle {
    /// Border characters for this style.
    ///
    /// Returns: (horizontal, vertical, top_left, top_right, bottom_right, bottom_left)
    pub const fn chars(&self) -> (char, char, char, char, char, char) {
        match self {
            BorderStyle::None => (' ', ' ', ' ', ' ', ' ', ' '),
            BorderStyle::Single => ('─', '│', '┌', '┐', '┘', '└'),
            BorderStyle::Double => ('═', '║', '╔', '╗', '╝', '╚'),
            BorderStyle::Rounded => ('─', '│', '╭', '╮', '╯', '╰'),
            BorderStyle::Bold => ('━', '┃', '┏', '┓', '┛', '┗'),
            BorderStyle::Ascii => ('-', '|', '+', '+', '+', '+'),
        }
    }

    /// Cells of content-region inset a border claims on each axis.
    pub const fn inset(&self) -> i16 {
        match self {
            BorderStyle::None => 0,
            _ => 2,
        }
    }
}

// =============================================================================
// Layout rectangles
// =============================================================================

/// A positioned rectangle, local to the enclosing container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i16,
    pub y: i16,
    pub w: i16,
    pub h: i16,
}

impl Rect {
    pub const fn new(x: i16, y: i16, w: i16, h: i16) -> Rect {
        Rect { x, y, w, h }
    }
}

/// A child's computed minimum dimensions, handed to custom layout closures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildSize {
    pub min_w: i16,
    pub min_h: i16,
}
