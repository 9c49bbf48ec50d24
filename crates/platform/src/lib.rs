#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Platform layer for selutils.
//!
//! This crate provides the two collaborators the traversal engine depends on:
//! - [`Filesystem`]: link-unaware classification, one-level symlink
//!   resolution, directory enumeration and object identity
//! - [`ContextApplier`]: setting the security label of exactly one object
//!
//! Host implementations live under [`implementations::host`]. Labels are
//! stored in an extended attribute and are only settable on Linux; other
//! Unix hosts get a clear per-object failure instead.

pub mod core;
pub mod filesystem;
pub mod implementations;
pub mod label;

pub use core::Platform;
pub use filesystem::{FileIdentity, Filesystem};
pub use implementations::host::{HostFilesystem, XattrContextApplier};
pub use label::{ContextApplier, LabelSource};
