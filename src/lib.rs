//! Shell-like argument expansion and command preparation.
//!
//! Turns a command-line string and an environment into the argument
//! list a process launcher expects: quote-aware, word-split, with
//! `$name` / `${name}` references resolved recursively and cycles
//! detected.
//!
//! # Quick start
//!
//! ## Expand a command string
//!
//! ```
//! use cmdexpand::{Environment, expand};
//!
//! let env: Environment = [("ARGS", "a b"), ("DIR", "$HOME/idir"), ("HOME", "/home/ci")]
//!     .into_iter()
//!     .collect();
//!
//! assert_eq!(expand("cov-build --dir $DIR $ARGS", &env).unwrap(),
//!            ["cov-build", "--dir", "/home/ci/idir", "a", "b"]);
//! assert_eq!(expand("echo \"$ARGS\" '$ARGS'", &env).unwrap(),
//!            ["echo", "a b", "$ARGS"]);
//! ```
//!
//! ## Prepare pre-split tokens
//!
//! ```
//! use cmdexpand::prepare_commands;
//!
//! let cmd = prepare_commands(&["make", "$target"], &["target=all", "bogus"], true);
//! assert_eq!(cmd, ["make", "all"]);
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod env;
pub mod expander;
pub mod prepare;
pub mod resolver;

pub use env::{DeclarationError, DeclarationErrorKind, Environment, parse_declaration};
pub use expander::{ExpandError, ExpandErrorKind, MAX_EXPANSION_BYTES, expand};
pub use prepare::{prepare_commands, substitute};
pub use resolver::{ResolutionChain, Unresolved, resolve};

/// Unified error type covering declaration parsing and expansion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A malformed `key=value` declaration.
    #[error("{0}")]
    Declaration(#[from] DeclarationError),
    /// An expansion error.
    #[error("{0}")]
    Expand(#[from] ExpandError),
}

/// Parse strict `key=value` declarations and expand `input` in one step.
pub fn expand_with_declarations<S: AsRef<str>>(
    input: &str,
    declarations: &[S],
) -> Result<Vec<String>, Error> {
    let env = Environment::try_from_declarations(declarations)?;
    Ok(expand(input, &env)?)
}
