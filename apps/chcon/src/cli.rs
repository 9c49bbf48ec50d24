//! Command line interface definition

use clap::{ArgAction, Parser};
use selutils_errors::PolicyError;
use selutils_platform::LabelSource;
use selutils_types::{
    ContextComponents, LogFormat, SecurityContext, TraversalFlags, TraversalMode,
};
use std::path::PathBuf;

/// chcon - change file security context
#[derive(Parser, Debug)]
#[command(name = "chcon")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Change the security context of each FILE to CONTEXT")]
#[command(override_usage = "chcon [OPTIONS] CONTEXT FILE...\n       \
    chcon [OPTIONS] [-u USER] [-r ROLE] [-l RANGE] [-t TYPE] FILE...\n       \
    chcon [OPTIONS] --reference=RFILE FILE...")]
#[command(disable_help_flag = true, args_override_self = true)]
pub struct Cli {
    /// Security context to apply, followed by the files to modify
    #[arg(value_name = "CONTEXT | FILE")]
    pub operands: Vec<PathBuf>,

    /// Affect the referent of each symbolic link (default)
    #[arg(long, overrides_with = "no_dereference")]
    pub dereference: bool,

    /// Affect symbolic links instead of any referenced file
    #[arg(short = 'h', long, overrides_with = "dereference")]
    pub no_dereference: bool,

    /// Set user USER in the target security context
    #[arg(short, long, value_name = "USER")]
    pub user: Option<String>,

    /// Set role ROLE in the target security context
    #[arg(short, long, value_name = "ROLE")]
    pub role: Option<String>,

    /// Set type TYPE in the target security context
    #[arg(short, long = "type", value_name = "TYPE")]
    pub type_: Option<String>,

    /// Set range RANGE in the target security context
    #[arg(short = 'l', long, value_name = "RANGE")]
    pub range: Option<String>,

    /// Use RFILE's security context rather than specifying a CONTEXT value
    #[arg(long, value_name = "RFILE")]
    pub reference: Option<PathBuf>,

    /// Fail to operate recursively on '/'
    #[arg(long, overrides_with = "no_preserve_root")]
    pub preserve_root: bool,

    /// Do not treat '/' specially (default)
    #[arg(long, overrides_with = "preserve_root")]
    pub no_preserve_root: bool,

    /// Operate on files and directories recursively
    #[arg(short = 'R', long)]
    pub recursive: bool,

    /// Output a diagnostic for every file processed
    #[arg(short, long)]
    pub verbose: bool,

    /// Traverse a command line argument that is a symbolic link to a directory
    #[arg(short = 'H', overrides_with_all = ["follow_all", "physical"])]
    pub follow_command_line: bool,

    /// Traverse every symbolic link to a directory encountered
    #[arg(short = 'L', overrides_with_all = ["follow_command_line", "physical"])]
    pub follow_all: bool,

    /// Do not traverse any symbolic links (default)
    #[arg(short = 'P', overrides_with_all = ["follow_command_line", "follow_all"])]
    pub physical: bool,

    /// Use alternate config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub debug: bool,

    /// Log line format
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

/// What to label, and with what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRequest {
    pub source: LabelSource,
    pub files: Vec<PathBuf>,
}

impl Cli {
    /// `-H`, `-L` or `-P`, whichever came last.
    pub fn traversal_mode(&self) -> TraversalMode {
        if self.follow_command_line {
            TraversalMode::FollowLinksToDirsOnCommandLine
        } else if self.follow_all {
            TraversalMode::FollowAllLinks
        } else {
            TraversalMode::NoFollowLinks
        }
    }

    /// Raw traversal flags. `preserve_root_default` applies when neither
    /// `--preserve-root` nor `--no-preserve-root` was given.
    pub fn traversal_flags(&self, preserve_root_default: bool) -> TraversalFlags {
        let preserve_root = if self.preserve_root {
            true
        } else if self.no_preserve_root {
            false
        } else {
            preserve_root_default
        };

        TraversalFlags {
            recursive: self.recursive,
            dereference: !self.no_dereference,
            mode: self.traversal_mode(),
            preserve_root,
        }
    }

    fn components(&self) -> ContextComponents {
        ContextComponents {
            user: self.user.clone(),
            role: self.role.clone(),
            type_: self.type_.clone(),
            range: self.range.clone(),
        }
    }

    /// Split the operands into a label source and the files to label.
    ///
    /// With `--reference` or any of `-u/-r/-t/-l` every operand is a file;
    /// otherwise the first operand is the context.
    pub fn label_request(&self) -> Result<LabelRequest, PolicyError> {
        let components = self.components();
        if components.any() && self.reference.is_some() {
            return Err(PolicyError::ConflictingContextSpecifiers);
        }

        let mut operands = self.operands.iter().cloned();
        let source = if let Some(reference) = &self.reference {
            LabelSource::Reference(reference.clone())
        } else if components.any() {
            LabelSource::Components(components)
        } else {
            let context = operands.next().ok_or(PolicyError::MissingOperand)?;
            let text = context.to_string_lossy().into_owned();
            if self.operands.len() < 2 {
                return Err(PolicyError::MissingFileOperand { operand: text });
            }
            let parsed = context
                .to_str()
                .ok_or_else(|| PolicyError::InvalidContext {
                    context: text.clone(),
                })
                .and_then(SecurityContext::parse)?;
            LabelSource::Context(parsed)
        };

        let files: Vec<PathBuf> = operands.collect();
        if files.is_empty() {
            return Err(PolicyError::MissingOperand);
        }

        Ok(LabelRequest { source, files })
    }
}
