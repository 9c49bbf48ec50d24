#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for selutils
//!
//! This crate provides the data model shared by the traversal engine, its
//! host collaborators and the command line front ends.

pub mod context;
pub mod object;
pub mod policy;

// Re-export commonly used types
pub use context::{ContextComponents, SecurityContext};
pub use object::{ObjectKind, Outcome};
pub use policy::{TraversalFlags, TraversalMode, TraversalPolicy};

use serde::{Deserialize, Serialize};

/// Log output format for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Plain,
    Json,
}

// Implement clap::ValueEnum for LogFormat
impl clap::ValueEnum for LogFormat {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Plain, Self::Json]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Plain => clap::builder::PossibleValue::new("plain"),
            Self::Json => clap::builder::PossibleValue::new("json"),
        })
    }
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::Plain
    }
}
