#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Traversal engine for selutils
//!
//! [`TraversalEngine`] walks the named roots depth first, pre-order, and for
//! every object decides which path (if any) is handed to the
//! [`ContextApplier`](selutils_platform::ContextApplier). Every failure is
//! recorded as an [`Outcome`](selutils_types::Outcome); nothing aborts the
//! run. [`ResultAggregator`] folds the outcome stream into diagnostics and
//! an exit status.

mod aggregate;
mod engine;
mod guard;

pub use aggregate::ResultAggregator;
pub use engine::{EngineOptions, TraversalEngine};
pub use guard::RootGuard;
