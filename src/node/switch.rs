//! Switch nodes: render one of several cases by matching a bound value.
//!
//! ```
//! use ember_tui::{shared, Switch, Text};
//!
//! let tab = shared(0_usize);
//! let body = Switch::on(&tab)
//!     .case(0, Text::new("files"))
//!     .case(1, Text::new("search"))
//!     .default_(Text::new("?"));
//! ```
//!
//! The bound value is re-read every frame; the first case whose value
//! compares equal wins, the default renders when none match.

use std::rc::Rc;

use super::bind::Shared;
use super::Node;

/// Closure resolving the matching case index each frame.
pub(crate) type MatchFn = Rc<dyn Fn() -> Option<usize>>;

/// Builder for a switch over a [`Shared`] value.
pub struct Switch<T: PartialEq + Clone + 'static> {
    read: Rc<dyn Fn() -> T>,
    case_values: Vec<T>,
    case_nodes: Vec<Node>,
    default_node: Option<Box<Node>>,
}

impl<T: PartialEq + Clone + 'static> Switch<T> {
    /// Start a switch matching against `value`.
    pub fn on(value: &Shared<T>) -> Switch<T> {
        let cell = value.clone();
        Switch {
            read: Rc::new(move || cell.borrow().clone()),
            case_values: Vec::new(),
            case_nodes: Vec::new(),
            default_node: None,
        }
    }

    /// Add a case rendered when the bound value equals `value`.
    pub fn case(mut self, value: T, node: impl Into<Node>) -> Switch<T> {
        self.case_values.push(value);
        self.case_nodes.push(node.into());
        self
    }

    /// The node rendered when no case matches.
    pub fn default_(mut self, node: impl Into<Node>) -> Switch<T> {
        self.default_node = Some(Box::new(node.into()));
        self
    }
}

/// A switch with its match logic erased, ready for compilation.
pub struct SwitchNode {
    pub(crate) match_fn: MatchFn,
    pub(crate) cases: Vec<Node>,
    pub(crate) default_node: Option<Box<Node>>,
}

impl<T: PartialEq + Clone + 'static> From<Switch<T>> for Node {
    fn from(sw: Switch<T>) -> Node {
        let read = sw.read;
        let values = sw.case_values;
        let match_fn: MatchFn = Rc::new(move || {
            let current = read();
            values.iter().position(|v| *v == current)
        });
        Node::Switch(SwitchNode {
            match_fn,
            cases: sw.case_nodes,
            default_node: sw.default_node,
        })
    }
}
