//! Condition builders for conditional rendering.
//!
//! A condition compares a bound value against a constant and carries the
//! nodes to render for each outcome:
//!
//! ```
//! use ember_tui::{when, when_true, shared, Text};
//!
//! let count = shared(0_i32);
//! let empty_hint = when(&count).eq(0).then(Text::new("nothing here"));
//!
//! let busy = shared(false);
//! let spinner = when_true(&busy)
//!     .then(Text::new("working..."))
//!     .else_(Text::new("idle"));
//! ```
//!
//! Comparisons re-read the bound value every frame; flipping the cell
//! between frames flips the rendered branch.
//!
//! Ordering comparators (`gt`, `lt`, `ge`, `le`) are available whenever
//! the compared type is `PartialOrd`.

use std::any::Any;
use std::rc::Rc;

use super::bind::Shared;
use super::Node;

// =============================================================================
// Condition sources (compiled form)
// =============================================================================

/// Runtime form of a condition: a plain boolean cell or a comparator test.
#[derive(Clone)]
pub(crate) enum CondSource {
    /// A caller-owned boolean read directly.
    Flag(Shared<bool>),
    /// A comparator over a bound value.
    Test {
        test: Rc<dyn Fn(Option<&dyn Any>) -> bool>,
        element_bound: bool,
    },
}

impl CondSource {
    pub(crate) fn eval(&self, elem: Option<&dyn Any>) -> bool {
        match self {
            CondSource::Flag(cell) => *cell.borrow(),
            CondSource::Test { test, .. } => test(elem),
        }
    }

    pub(crate) fn element_bound(&self) -> bool {
        match self {
            CondSource::Flag(_) => false,
            CondSource::Test { element_bound, .. } => *element_bound,
        }
    }
}

// =============================================================================
// Builders
// =============================================================================

type ReadFn<T> = Rc<dyn Fn(Option<&dyn Any>) -> Option<T>>;

/// A bound value awaiting a comparator. Produced by [`when`] or
/// [`Elem::when`](super::Elem::when).
pub struct When<T> {
    read: ReadFn<T>,
    element_bound: bool,
}

/// Start a condition over a [`Shared`] cell.
pub fn when<T: Clone + 'static>(value: &Shared<T>) -> When<T> {
    let cell = value.clone();
    When {
        read: Rc::new(move |_| Some(cell.borrow().clone())),
        element_bound: false,
    }
}

/// A condition over a boolean cell, true when the cell is true.
pub fn when_true(flag: &Shared<bool>) -> Cond {
    Cond {
        source: CondSource::Flag(flag.clone()),
        then_node: None,
        else_node: None,
    }
}

impl<T: 'static> When<T> {
    pub(crate) fn from_read(read: ReadFn<T>, element_bound: bool) -> When<T> {
        When {
            read,
            element_bound,
        }
    }

    fn compare(self, cmp: impl Fn(&T) -> bool + 'static) -> Cond {
        let read = self.read;
        Cond {
            source: CondSource::Test {
                test: Rc::new(move |elem| read(elem).map_or(false, |v| cmp(&v))),
                element_bound: self.element_bound,
            },
            then_node: None,
            else_node: None,
        }
    }
}

impl<T: PartialEq + 'static> When<T> {
    /// True when the bound value equals `val`.
    pub fn eq(self, val: T) -> Cond {
        self.compare(move |v| *v == val)
    }

    /// True when the bound value differs from `val`.
    pub fn ne(self, val: T) -> Cond {
        self.compare(move |v| *v != val)
    }
}

impl<T: PartialOrd + 'static> When<T> {
    /// True when the bound value is greater than `val`.
    pub fn gt(self, val: T) -> Cond {
        self.compare(move |v| *v > val)
    }

    /// True when the bound value is less than `val`.
    pub fn lt(self, val: T) -> Cond {
        self.compare(move |v| *v < val)
    }

    /// True when the bound value is at least `val`.
    pub fn ge(self, val: T) -> Cond {
        self.compare(move |v| *v >= val)
    }

    /// True when the bound value is at most `val`.
    pub fn le(self, val: T) -> Cond {
        self.compare(move |v| *v <= val)
    }
}

impl<T: 'static> super::bind::Elem<T> {
    /// Start a condition over a field of the iteration element.
    ///
    /// Only valid inside a `ForEach` or `SelectionList` body; the compiler
    /// rejects element-bound conditions anywhere else.
    pub fn when<U, F>(&self, field: F) -> When<U>
    where
        U: Clone + 'static,
        F: Fn(&T) -> U + 'static,
    {
        When::from_read(
            Rc::new(move |elem: Option<&dyn Any>| {
                elem.and_then(|e| e.downcast_ref::<T>()).map(&field)
            }),
            true,
        )
    }
}

// =============================================================================
// Cond node
// =============================================================================

/// A conditional node: a condition plus then/else branches.
pub struct Cond {
    pub(crate) source: CondSource,
    pub(crate) then_node: Option<Box<Node>>,
    pub(crate) else_node: Option<Box<Node>>,
}

impl Cond {
    /// The node to render when the condition holds.
    pub fn then(mut self, node: impl Into<Node>) -> Cond {
        self.then_node = Some(Box::new(node.into()));
        self
    }

    /// The node to render when the condition does not hold.
    pub fn else_(mut self, node: impl Into<Node>) -> Cond {
        self.else_node = Some(Box::new(node.into()));
        self
    }
}
