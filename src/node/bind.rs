//! Value bindings.
//!
//! Every leaf value in a declaration (text content, progress value, rich
//! text spans) is sourced one of three ways, decided when the node is
//! constructed and frozen into the compiled op:
//!
//! - **Static** - the value is captured in the template.
//! - **Shared** - a caller-owned [`Shared`] cell, re-read every frame.
//!   Mutating the cell between frames changes the next frame; there is no
//!   caching and no change tracking.
//! - **Field** - a type-erased accessor into the current iteration
//!   element, manufactured from a typed closure by [`Elem`]. One compiled
//!   iteration body re-targets per-element state by rebinding the element
//!   reference at frame time.
//!
//! Field accessors erase the element type behind `&dyn Any`. The pairing
//! of accessor and sequence is established by the `ForEach` builder, so a
//! mismatched downcast cannot happen through the public API; if an
//! accessor is smuggled across iteration scopes anyway, it resolves to the
//! empty value.

use std::any::Any;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::buffer::Span;

// =============================================================================
// Shared cells
// =============================================================================

/// A caller-owned value the engine re-reads every frame.
pub type Shared<T> = Rc<RefCell<T>>;

/// Create a [`Shared`] cell.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

// =============================================================================
// Field accessors (type-erased element access)
// =============================================================================

pub(crate) type StrField = Rc<dyn for<'a> Fn(&'a dyn Any) -> &'a str>;
pub(crate) type SpanField = Rc<dyn for<'a> Fn(&'a dyn Any) -> &'a [Span]>;
pub(crate) type IntField = Rc<dyn Fn(&dyn Any) -> i32>;

// =============================================================================
// Value sources
// =============================================================================

/// Where a text leaf gets its content.
#[derive(Clone)]
pub enum StrSource {
    Static(String),
    Shared(Shared<String>),
    Field(StrField),
}

impl StrSource {
    /// Run `f` against the current content.
    ///
    /// `elem` is the current iteration element; `Field` sources outside an
    /// iteration resolve to the empty string (the compiler rejects that
    /// shape up front).
    pub(crate) fn with<R>(&self, elem: Option<&dyn Any>, f: impl FnOnce(&str) -> R) -> R {
        match self {
            StrSource::Static(s) => f(s),
            StrSource::Shared(cell) => f(&cell.borrow()),
            StrSource::Field(get) => match elem {
                Some(e) => f(get(e)),
                None => f(""),
            },
        }
    }

    pub(crate) fn element_bound(&self) -> bool {
        matches!(self, StrSource::Field(_))
    }
}

impl From<&str> for StrSource {
    fn from(s: &str) -> StrSource {
        StrSource::Static(s.to_owned())
    }
}

impl From<String> for StrSource {
    fn from(s: String) -> StrSource {
        StrSource::Static(s)
    }
}

impl From<&Shared<String>> for StrSource {
    fn from(cell: &Shared<String>) -> StrSource {
        StrSource::Shared(cell.clone())
    }
}

/// Where a progress leaf gets its value (0-100).
#[derive(Clone)]
pub enum IntSource {
    Static(i32),
    Shared(Shared<i32>),
    Field(IntField),
}

impl IntSource {
    pub(crate) fn get(&self, elem: Option<&dyn Any>) -> i32 {
        match self {
            IntSource::Static(v) => *v,
            IntSource::Shared(cell) => *cell.borrow(),
            IntSource::Field(get) => elem.map(|e| get(e)).unwrap_or(0),
        }
    }

    pub(crate) fn element_bound(&self) -> bool {
        matches!(self, IntSource::Field(_))
    }
}

impl From<i32> for IntSource {
    fn from(v: i32) -> IntSource {
        IntSource::Static(v)
    }
}

impl From<&Shared<i32>> for IntSource {
    fn from(cell: &Shared<i32>) -> IntSource {
        IntSource::Shared(cell.clone())
    }
}

/// Where a rich text leaf gets its styled runs.
#[derive(Clone)]
pub enum SpanSource {
    Static(Vec<Span>),
    Shared(Shared<Vec<Span>>),
    Field(SpanField),
}

impl SpanSource {
    pub(crate) fn with<R>(&self, elem: Option<&dyn Any>, f: impl FnOnce(&[Span]) -> R) -> R {
        match self {
            SpanSource::Static(spans) => f(spans),
            SpanSource::Shared(cell) => f(&cell.borrow()),
            SpanSource::Field(get) => match elem {
                Some(e) => f(get(e)),
                None => f(&[]),
            },
        }
    }

    pub(crate) fn element_bound(&self) -> bool {
        matches!(self, SpanSource::Field(_))
    }
}

impl From<Vec<Span>> for SpanSource {
    fn from(spans: Vec<Span>) -> SpanSource {
        SpanSource::Static(spans)
    }
}

impl From<&Shared<Vec<Span>>> for SpanSource {
    fn from(cell: &Shared<Vec<Span>>) -> SpanSource {
        SpanSource::Shared(cell.clone())
    }
}

// =============================================================================
// Elem - typed handle to the iteration element
// =============================================================================

/// Typed handle to the current iteration element.
///
/// `ForEach` and `SelectionList` bodies receive an `Elem<T>` and use it to
/// bind leaf values to element fields:
///
/// ```
/// use ember_tui::{ForEach, Text, shared};
///
/// struct Task {
///     name: String,
/// }
///
/// let tasks = shared(vec![Task { name: "build".into() }]);
/// let list = ForEach::new(&tasks, |task| Text::new(task.text(|t| &t.name)));
/// ```
///
/// The closure runs once per frame per element against the live element;
/// the body template itself is compiled only once.
pub struct Elem<T: 'static> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> Elem<T> {
    pub(crate) fn new() -> Elem<T> {
        Elem {
            _marker: PhantomData,
        }
    }

    /// Bind a string field of the element.
    pub fn text<F>(&self, field: F) -> StrSource
    where
        F: for<'e> Fn(&'e T) -> &'e str + 'static,
    {
        let get: StrField = Rc::new(move |elem: &dyn Any| match elem.downcast_ref::<T>() {
            Some(e) => field(e),
            None => "",
        });
        StrSource::Field(get)
    }

    /// Bind an integer field of the element.
    pub fn int<F>(&self, field: F) -> IntSource
    where
        F: Fn(&T) -> i32 + 'static,
    {
        let get: IntField = Rc::new(move |elem: &dyn Any| {
            elem.downcast_ref::<T>().map(&field).unwrap_or(0)
        });
        IntSource::Field(get)
    }

    /// Bind a span-list field of the element.
    pub fn spans<F>(&self, field: F) -> SpanSource
    where
        F: for<'e> Fn(&'e T) -> &'e [Span] + 'static,
    {
        let get: SpanField = Rc::new(move |elem: &dyn Any| match elem.downcast_ref::<T>() {
            Some(e) => field(e),
            None => &[],
        });
        SpanSource::Field(get)
    }
}

// =============================================================================
// Type-erased element sequences
// =============================================================================

/// A caller-owned sequence viewed with its element type erased.
///
/// The engine reads the length and visits elements as `&dyn Any`; field
/// accessors recover the concrete type.
pub(crate) trait ElementSeq {
    fn len(&self) -> usize;

    /// Call `f` with the element at `index`. No-op when out of range.
    fn with_elem(&self, index: usize, f: &mut dyn FnMut(&dyn Any));
}

impl<T: 'static> ElementSeq for RefCell<Vec<T>> {
    fn len(&self) -> usize {
        self.borrow().len()
    }

    fn with_elem(&self, index: usize, f: &mut dyn FnMut(&dyn Any)) {
        let items = self.borrow();
        if let Some(item) = items.get(index) {
            f(item);
        }
    }
}
