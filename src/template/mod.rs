//! Compiled templates.
//!
//! A [`Template`] is the compiled form of a declarative UI: a flat,
//! depth-annotated array of ops, a parallel geometry array filled in at
//! runtime, and a depth index for the bottom-up layout pass. Compile does
//! all the expensive work once; [`Template::execute`] re-runs the three
//! layout phases and the render walk every frame with no allocation for a
//! stable UI.
//!
//! # Phases
//!
//! 1. **Width distribution** (top-down) - `width.rs`
//! 2. **Layout** (bottom-up) - `layout.rs`
//! 3. **Flex distribution** (top-down, columns) - `flex.rs`
//! 4. **Render** (top-down) - `render.rs`
//!
//! # Element rebinding
//!
//! Iteration bodies are compiled once and re-executed per element. The
//! current element travels through every phase as an explicit
//! `Option<&dyn Any>` parameter; it is live only while its iteration item
//! is being laid out or rendered. Sub-templates (conditional branches,
//! switch cases, iteration bodies) are self-contained `Template`s owned by
//! their op.

mod compile;
mod flex;
mod layout;
mod render;
mod width;

use std::rc::Rc;

use crate::buffer::{Buffer, Layer};
use crate::node::bind::{ElementSeq, IntSource, Shared, SpanSource, StrSource};
use crate::node::cond::CondSource;
use crate::node::switch::MatchFn;
use crate::node::{ArrangeFn, Node, Renderer};
use crate::types::{BorderStyle, Color};
use crate::BuildError;

/// Sentinel parent index for root ops.
pub(crate) const ROOT: i16 = -1;

/// Compile a declarative UI into a reusable [`Template`].
pub fn build(node: impl Into<Node>) -> Result<Template, BuildError> {
    Template::build(node.into())
}

// =============================================================================
// Geometry
// =============================================================================

/// Per-op runtime geometry, parallel to the op array.
///
/// `local_x`/`local_y` are offsets inside the parent's content region
/// (after border inset). `content_h` preserves the natural content height
/// before flex expansion overwrites `h`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Geom {
    pub w: i16,
    pub h: i16,
    pub local_x: i16,
    pub local_y: i16,
    pub content_h: i16,
}

// =============================================================================
// Ops
// =============================================================================

/// A single compiled instruction.
pub(crate) struct Op {
    pub kind: OpKind,
    pub depth: u8,
    /// Parent op index, [`ROOT`] for root ops.
    pub parent: i16,

    // Layout hints
    /// Explicit width; for progress ops, the bar width.
    pub width: i16,
    pub height: i16,
    pub percent_w: f32,
    pub flex_grow: f32,
    pub gap: i16,

    /// Child op range `[child_start, child_end)`. Empty for leaves.
    pub child_start: i16,
    pub child_end: i16,
}

impl Op {
    pub(crate) fn new(kind: OpKind, parent: i16) -> Op {
        Op {
            kind,
            depth: 0,
            parent,
            width: 0,
            height: 0,
            percent_w: 0.0,
            flex_grow: 0.0,
            gap: 0,
            child_start: 0,
            child_end: 0,
        }
    }

    /// Whether this op is a direct child of `parent_idx`.
    #[inline]
    pub(crate) fn is_child_of(&self, parent_idx: i16) -> bool {
        self.parent == parent_idx
    }
}

/// Discriminant and per-kind payload of an op.
pub(crate) enum OpKind {
    Text(StrSource),
    Progress(IntSource),
    RichText(SpanSource),
    Container(ContainerOp),
    If(IfOp),
    ForEach(ForEachOp),
    Switch(SwitchOp),
    Custom(Rc<dyn Renderer>),
    Layout(ArrangeFn),
    Layer(LayerOp),
    SelectionList(ListOp),
}

pub(crate) struct ContainerOp {
    pub is_row: bool,
    pub border: BorderStyle,
    pub border_fg: Option<Color>,
    pub title: String,
}

pub(crate) struct IfOp {
    pub cond: CondSource,
    pub then_tmpl: Option<Box<Template>>,
    pub else_tmpl: Option<Box<Template>>,
}

impl IfOp {
    /// The sub-template selected by the current condition value, if any.
    pub(crate) fn active_mut(&mut self, active: bool) -> Option<&mut Template> {
        if active {
            self.then_tmpl.as_deref_mut()
        } else {
            self.else_tmpl.as_deref_mut()
        }
    }

    pub(crate) fn active(&self, active: bool) -> Option<&Template> {
        if active {
            self.then_tmpl.as_deref()
        } else {
            self.else_tmpl.as_deref()
        }
    }
}

pub(crate) struct ForEachOp {
    pub items: Rc<dyn ElementSeq>,
    pub body: Box<Template>,
    /// Per-item geometry scratch, reused across frames. Its capacity only
    /// grows; shrinking sequences just truncate the view.
    pub item_geoms: Vec<Geom>,
}

pub(crate) struct SwitchOp {
    pub match_fn: MatchFn,
    pub cases: Vec<Template>,
    pub default_tmpl: Option<Box<Template>>,
}

impl SwitchOp {
    /// The matching case template, or the default.
    pub(crate) fn active_mut(&mut self) -> Option<&mut Template> {
        match (self.match_fn)() {
            Some(idx) if idx < self.cases.len() => self.cases.get_mut(idx),
            _ => self.default_tmpl.as_deref_mut(),
        }
    }

    pub(crate) fn active(&self) -> Option<&Template> {
        match (self.match_fn)() {
            Some(idx) if idx < self.cases.len() => self.cases.get(idx),
            _ => self.default_tmpl.as_deref(),
        }
    }
}

pub(crate) struct LayerOp {
    pub layer: Shared<Layer>,
    pub view_w: i16,
    pub view_h: i16,
}

pub(crate) struct ListOp {
    pub items: Rc<dyn ElementSeq>,
    pub body: Option<Box<Template>>,
    pub selected: Shared<usize>,
    pub offset: Shared<usize>,
    pub marker: String,
    /// Marker width in display cells, cached at compile time.
    pub marker_width: i16,
    pub max_visible: usize,
}

// =============================================================================
// Template
// =============================================================================

/// A compiled, reusable UI plan.
pub struct Template {
    pub(crate) ops: Vec<Op>,
    /// Runtime geometry, parallel to `ops`.
    pub(crate) geom: Vec<Geom>,
    /// Op indices grouped by tree depth, for the bottom-up layout pass.
    pub(crate) by_depth: Vec<Vec<i16>>,
}

impl std::fmt::Debug for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Template")
            .field("ops", &self.ops.len())
            .field("depths", &self.by_depth.len())
            .finish()
    }
}

impl Template {
    /// Run all three layout phases and render into the buffer.
    pub fn execute(&mut self, buf: &mut Buffer, screen_w: i16, screen_h: i16) {
        // Phase 1: width distribution (top-down)
        self.distribute_widths(screen_w, None);

        // Phase 2: layout (bottom-up) - computes content heights
        self.layout_pass(None);

        // Phase 2b: flex distribution (top-down) - expand column flex children
        self.distribute_flex(screen_h, None);

        // Phase 3: render (top-down)
        self.render(buf, 0, 0, screen_w, None);
    }

    /// Total height of the root ops. Meaningful after
    /// [`execute`](Template::execute).
    pub fn height(&self) -> i16 {
        self.ops
            .iter()
            .zip(&self.geom)
            .filter(|(op, _)| op.parent == ROOT)
            .map(|(_, g)| g.h)
            .sum()
    }

    /// Width of the first root op; sub-templates adopt it as their width.
    pub(crate) fn root_w(&self) -> i16 {
        self.geom.first().map(|g| g.w).unwrap_or(0)
    }

    /// Number of direct children of `idx`.
    pub(crate) fn child_count(&self, idx: i16) -> i16 {
        let op = &self.ops[idx as usize];
        let mut count = 0;
        for i in op.child_start..op.child_end {
            if self.ops[i as usize].is_child_of(idx) {
                count += 1;
            }
        }
        count
    }
}
