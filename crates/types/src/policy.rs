//! Traversal policy and the validation gate that produces it

use selutils_errors::PolicyError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How symlinks met during a recursive run are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TraversalMode {
    /// `-P`: never traverse a symlink.
    #[default]
    NoFollowLinks,
    /// `-H`: traverse symlinks to directories named as roots only.
    FollowLinksToDirsOnCommandLine,
    /// `-L`: traverse every symlink.
    FollowAllLinks,
}

impl TraversalMode {
    /// Map the traditional single-letter switch to a mode.
    #[must_use]
    pub fn from_flag(flag: char) -> Option<Self> {
        match flag {
            'P' => Some(Self::NoFollowLinks),
            'H' => Some(Self::FollowLinksToDirsOnCommandLine),
            'L' => Some(Self::FollowAllLinks),
            _ => None,
        }
    }

    /// The single-letter switch for this mode.
    #[must_use]
    pub fn flag(self) -> char {
        match self {
            Self::NoFollowLinks => 'P',
            Self::FollowLinksToDirsOnCommandLine => 'H',
            Self::FollowAllLinks => 'L',
        }
    }
}

impl fmt::Display for TraversalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-{}", self.flag())
    }
}

/// Raw switches as the front end collected them, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalFlags {
    pub recursive: bool,
    pub dereference: bool,
    pub mode: TraversalMode,
    pub preserve_root: bool,
}

impl Default for TraversalFlags {
    fn default() -> Self {
        Self {
            recursive: false,
            dereference: true,
            mode: TraversalMode::NoFollowLinks,
            preserve_root: false,
        }
    }
}

/// Resolved, immutable traversal policy.
///
/// The only way to obtain one is [`TraversalPolicy::resolve`], so a value of
/// this type always satisfies both invariants: a non-recursive policy has
/// mode `NoFollowLinks`, and a recursive `NoFollowLinks` policy never
/// dereferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TraversalPolicy {
    dereference: bool,
    mode: TraversalMode,
    recursive: bool,
    root_guard_enabled: bool,
}

impl TraversalPolicy {
    /// Validate raw flags into a policy.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::DereferenceWithoutTraversal`] for `-R
    /// --dereference -P` and [`PolicyError::TraversalWithoutDereference`] for
    /// `-R -h` combined with `-H` or `-L`.
    pub fn resolve(flags: TraversalFlags) -> Result<Self, PolicyError> {
        if !flags.recursive {
            return Ok(Self {
                dereference: flags.dereference,
                mode: TraversalMode::NoFollowLinks,
                recursive: false,
                root_guard_enabled: flags.preserve_root,
            });
        }

        match (flags.mode, flags.dereference) {
            (TraversalMode::NoFollowLinks, true) => Err(PolicyError::DereferenceWithoutTraversal),
            (
                TraversalMode::FollowLinksToDirsOnCommandLine | TraversalMode::FollowAllLinks,
                false,
            ) => Err(PolicyError::TraversalWithoutDereference),
            (mode, dereference) => Ok(Self {
                dereference,
                mode,
                recursive: true,
                root_guard_enabled: flags.preserve_root,
            }),
        }
    }

    #[must_use]
    pub fn dereference(&self) -> bool {
        self.dereference
    }

    #[must_use]
    pub fn mode(&self) -> TraversalMode {
        self.mode
    }

    #[must_use]
    pub fn recursive(&self) -> bool {
        self.recursive
    }

    #[must_use]
    pub fn root_guard_enabled(&self) -> bool {
        self.root_guard_enabled
    }
}
