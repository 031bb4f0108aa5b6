//! Compile-time errors.
//!
//! Execution is infallible by design - the per-frame path never reports
//! errors. Everything that can go wrong is a misuse of the declaration
//! API and is caught when the template is built.

/// An error produced while compiling a declaration into a template.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// An element-bound value (an [`Elem`](crate::Elem) field accessor or
    /// element condition) appeared outside a `ForEach`/`SelectionList`
    /// body, where no element will ever be in scope.
    #[error("element-bound value used outside a ForEach or SelectionList body")]
    ElementBindingOutsideIteration,

    /// The declaration compiled to more ops than `i16` indexing allows.
    #[error("template too large: {0} ops exceed i16 indexing")]
    TooManyOps(usize),
}
