//! # ember-tui
//!
//! Compiled declarative layout and render engine for terminal UIs.
//!
//! A UI is declared once as a tree of nodes and compiled into a
//! [`Template`]: a flat, depth-annotated instruction stream that is
//! re-executed every frame with minimal allocation, drawing into a
//! character-cell [`Buffer`].
//!
//! ## Pipeline
//!
//! ```text
//! Node tree ──build()──▶ Template ──execute()──▶ Buffer
//!                          │
//!                          ├─ 1. width distribution (top-down, row flex)
//!                          ├─ 2. layout (bottom-up, content heights)
//!                          ├─ 3. flex distribution (top-down, column flex)
//!                          └─ 4. render walk (top-down, absolute positions)
//! ```
//!
//! Dynamic values bind through [`Shared`] cells that are re-read every
//! frame - there is no change tracking, mutate the cell and the next frame
//! shows it. Iteration bodies compile once and rebind per element at frame
//! time (see [`Elem`]).
//!
//! ## Example
//!
//! ```
//! use ember_tui::{build, shared, Buffer, Col, Progress, Row, Text};
//!
//! let status = shared(String::from("indexing"));
//! let pct = shared(25_i32);
//!
//! let ui = Col::new()
//!     .child(Text::new("worker"))
//!     .child(Row::new().gap(1).child(Text::new(&status)).child(Progress::new(&pct)));
//!
//! let mut tmpl = build(ui).unwrap();
//! let mut buf = Buffer::new(60, 4);
//! tmpl.execute(&mut buf, 60, 4);
//!
//! *pct.borrow_mut() = 80;
//! buf.clear();
//! tmpl.execute(&mut buf, 60, 4); // next frame sees the new value
//! ```
//!
//! ## Modules
//!
//! - [`types`] - cells, styles, colors, borders, rectangles
//! - [`buffer`] - the cell buffer, spans, off-screen layers
//! - [`node`] - the declaration vocabulary
//! - [`template`] - compiled templates and the execute pipeline
//! - [`text_measure`] - display-cell width of text
//!
//! ## Scope
//!
//! The engine draws into buffers; terminal setup, raw mode, input and
//! flushing buffers to a TTY belong to the embedding application. One
//! template must be built and executed from a single thread (`Rc`-based
//! sharing makes this a compile-time guarantee).

pub mod buffer;
pub mod node;
pub mod template;
pub mod text_measure;
pub mod types;

mod error;

pub use buffer::{Buffer, Layer, Span};
pub use error::BuildError;
pub use node::{
    shared, when, when_true, BoxNode, Col, Component, Cond, Elem, ForEach, IntSource, LayerView,
    Node, Progress, Renderer, RichText, Row, SelectionList, Shared, SpanSource, StrSource, Switch,
    Text, When,
};
pub use template::{build, Template};
pub use types::{Attr, BorderStyle, Cell, ChildSize, Color, Rect, Style};
