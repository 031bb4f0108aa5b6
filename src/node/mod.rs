//! Declaration vocabulary - the nodes a UI is described with.
//!
//! A UI is a tree of nodes: leaves ([`Text`], [`Progress`], [`RichText`],
//! custom [`Renderer`]s, [`LayerView`]s), containers ([`Row`], [`Col`],
//! [`BoxNode`]), and control flow ([`Cond`], [`Switch`], [`ForEach`],
//! [`SelectionList`]). The tree is handed to [`build`](crate::build) once;
//! after that only the bound [`Shared`] cells change.
//!
//! Everything here converts into [`Node`] via `Into`, so builders compose
//! without ceremony:
//!
//! ```
//! use ember_tui::{Col, Row, Text, Progress, shared};
//!
//! let pct = shared(40_i32);
//! let ui = Col::new()
//!     .child(Text::new("deploy"))
//!     .child(Row::new().gap(1).child(Text::new("copy")).child(Progress::new(&pct)));
//! ```

pub mod bind;
pub mod cond;
pub mod list;
pub mod switch;

pub use bind::{shared, Elem, IntSource, Shared, SpanSource, StrSource};
pub use cond::{when, when_true, Cond, When};
pub use list::{ForEach, SelectionList};
pub use switch::{Switch, SwitchNode};

use std::rc::Rc;

use crate::buffer::{Buffer, Layer};
use crate::types::{BorderStyle, ChildSize, Color, Rect};

// =============================================================================
// Extension traits
// =============================================================================

/// A component that draws itself.
///
/// Unlike [`Component`] (which expands to built-in nodes at compile time),
/// a `Renderer` writes to the buffer directly. Useful for charts,
/// sparklines and other custom widgets.
pub trait Renderer {
    /// Minimum dimensions needed by this component, queried during layout.
    fn min_size(&self) -> (i16, i16);

    /// Draw into the buffer. `w` and `h` are the allocated dimensions and
    /// may exceed [`min_size`](Renderer::min_size).
    fn render(&self, buf: &mut Buffer, x: i16, y: i16, w: i16, h: i16);
}

/// A component that expands to built-in nodes at compile time.
pub trait Component {
    fn build(&self) -> Node;
}

// =============================================================================
// Node
// =============================================================================

/// One node of a declarative UI tree.
pub enum Node {
    /// Produces no op; silently skipped by the compiler.
    Empty,
    Text(Text),
    Progress(Progress),
    Row(Row),
    Col(Col),
    If(Cond),
    Switch(SwitchNode),
    ForEach(ForEach),
    SelectionList(SelectionList),
    Box(BoxNode),
    Layer(LayerView),
    RichText(RichText),
    Renderer(Rc<dyn Renderer>),
    Component(Rc<dyn Component>),
}

impl Node {
    /// Wrap a custom [`Renderer`].
    pub fn renderer(r: impl Renderer + 'static) -> Node {
        Node::Renderer(Rc::new(r))
    }

    /// Wrap a [`Component`]; its `build()` output is compiled in place.
    pub fn component(c: impl Component + 'static) -> Node {
        Node::Component(Rc::new(c))
    }
}

// =============================================================================
// Leaves
// =============================================================================

/// A single row of text. Never wraps; clipped to the available width.
pub struct Text {
    pub(crate) content: StrSource,
}

impl Text {
    pub fn new(content: impl Into<StrSource>) -> Text {
        Text {
            content: content.into(),
        }
    }
}

/// A one-row progress bar over a 0-100 value.
pub struct Progress {
    pub(crate) value: IntSource,
    pub(crate) bar_width: i16,
}

impl Progress {
    pub fn new(value: impl Into<IntSource>) -> Progress {
        Progress {
            value: value.into(),
            bar_width: 0,
        }
    }

    /// Bar width in cells. Default 20.
    pub fn bar_width(mut self, width: i16) -> Progress {
        self.bar_width = width;
        self
    }
}

/// A single row of styled runs.
pub struct RichText {
    pub(crate) spans: SpanSource,
}

impl RichText {
    pub fn new(spans: impl Into<SpanSource>) -> RichText {
        RichText {
            spans: spans.into(),
        }
    }
}

/// A viewport onto an off-screen [`Layer`].
pub struct LayerView {
    pub(crate) layer: Shared<Layer>,
    pub(crate) view_w: i16,
    pub(crate) view_h: i16,
    pub(crate) flex_grow: f32,
}

impl LayerView {
    pub fn new(layer: &Shared<Layer>) -> LayerView {
        LayerView {
            layer: layer.clone(),
            view_w: 0,
            view_h: 0,
            flex_grow: 0.0,
        }
    }

    /// Explicit viewport width; 0 fills the available width.
    pub fn view_width(mut self, w: i16) -> LayerView {
        self.view_w = w;
        self
    }

    /// Explicit viewport height; 0 defers to flex or the layer's own
    /// viewport.
    pub fn view_height(mut self, h: i16) -> LayerView {
        self.view_h = h;
        self
    }

    /// Let the viewport absorb remaining column space.
    pub fn flex(mut self, grow: f32) -> LayerView {
        self.flex_grow = grow;
        self
    }
}

// =============================================================================
// Containers
// =============================================================================

/// Sizing hints shared by the container builders.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FlexHints {
    pub width: i16,
    pub height: i16,
    pub percent_w: f32,
    pub flex_grow: f32,
}

macro_rules! container_builder_methods {
    () => {
        pub fn child(mut self, node: impl Into<Node>) -> Self {
            self.children.push(node.into());
            self
        }

        pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
            self.children.extend(nodes);
            self
        }

        /// Gap in cells between consecutive children.
        pub fn gap(mut self, gap: i16) -> Self {
            self.gap = gap;
            self
        }

        /// Share of remaining space this container absorbs from a flex
        /// parent.
        pub fn flex(mut self, grow: f32) -> Self {
            self.hints.flex_grow = grow;
            self
        }

        /// Explicit width in cells.
        pub fn width(mut self, width: i16) -> Self {
            self.hints.width = width;
            self
        }

        /// Explicit height in cells.
        pub fn height(mut self, height: i16) -> Self {
            self.hints.height = height;
            self
        }

        /// Width as a fraction (0.0-1.0) of the available width.
        pub fn percent_width(mut self, percent: f32) -> Self {
            self.hints.percent_w = percent;
            self
        }

        pub fn border(mut self, style: BorderStyle) -> Self {
            self.border = style;
            self
        }

        pub fn border_fg(mut self, color: Color) -> Self {
            self.border_fg = Some(color);
            self
        }

        /// Title written into the top border.
        pub fn title(mut self, title: impl Into<String>) -> Self {
            self.title = title.into();
            self
        }
    };
}

/// A container laying children out left to right.
#[derive(Default)]
pub struct Row {
    pub(crate) children: Vec<Node>,
    pub(crate) gap: i16,
    pub(crate) hints: FlexHints,
    pub(crate) border: BorderStyle,
    pub(crate) border_fg: Option<Color>,
    pub(crate) title: String,
}

impl Row {
    pub fn new() -> Row {
        Row::default()
    }

    container_builder_methods!();
}

/// A container stacking children top to bottom.
#[derive(Default)]
pub struct Col {
    pub(crate) children: Vec<Node>,
    pub(crate) gap: i16,
    pub(crate) hints: FlexHints,
    pub(crate) border: BorderStyle,
    pub(crate) border_fg: Option<Color>,
    pub(crate) title: String,
}

impl Col {
    pub fn new() -> Col {
        Col::default()
    }

    container_builder_methods!();
}

/// Custom layout closure: positions children given their minimum sizes and
/// the available area.
pub type ArrangeFn = Rc<dyn Fn(&[ChildSize], i16, i16) -> Vec<Rect>>;

/// A container positioned by a caller-supplied closure.
///
/// Use this when [`Row`]/[`Col`] don't fit: the closure receives each
/// child's minimum size and the available area and returns one rectangle
/// per child.
pub struct BoxNode {
    pub(crate) arrange: ArrangeFn,
    pub(crate) children: Vec<Node>,
}

impl BoxNode {
    pub fn new(arrange: impl Fn(&[ChildSize], i16, i16) -> Vec<Rect> + 'static) -> BoxNode {
        BoxNode {
            arrange: Rc::new(arrange),
            children: Vec::new(),
        }
    }

    pub fn child(mut self, node: impl Into<Node>) -> BoxNode {
        self.children.push(node.into());
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> BoxNode {
        self.children.extend(nodes);
        self
    }
}

// =============================================================================
// Into<Node> conversions
// =============================================================================

impl From<Text> for Node {
    fn from(v: Text) -> Node {
        Node::Text(v)
    }
}

impl From<Progress> for Node {
    fn from(v: Progress) -> Node {
        Node::Progress(v)
    }
}

impl From<Row> for Node {
    fn from(v: Row) -> Node {
        Node::Row(v)
    }
}

impl From<Col> for Node {
    fn from(v: Col) -> Node {
        Node::Col(v)
    }
}

impl From<Cond> for Node {
    fn from(v: Cond) -> Node {
        Node::If(v)
    }
}

impl From<ForEach> for Node {
    fn from(v: ForEach) -> Node {
        Node::ForEach(v)
    }
}

impl From<SelectionList> for Node {
    fn from(v: SelectionList) -> Node {
        Node::SelectionList(v)
    }
}

impl From<BoxNode> for Node {
    fn from(v: BoxNode) -> Node {
        Node::Box(v)
    }
}

impl From<LayerView> for Node {
    fn from(v: LayerView) -> Node {
        Node::Layer(v)
    }
}

impl From<RichText> for Node {
    fn from(v: RichText) -> Node {
        Node::RichText(v)
    }
}
