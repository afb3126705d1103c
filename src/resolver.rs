use crate::env::Environment;

/// Names whose values are currently being expanded, outermost first.
///
/// Scoped to a single top-level substitution path; the expander pushes a
/// name when it splices the value in and pops it once the value has been
/// fully consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionChain {
    names: Vec<String>,
}

impl ResolutionChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn push(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.names.pop()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.names.len()
    }

    /// The chain as a path ending in `name`, e.g. `A -> B -> A`.
    #[must_use]
    pub fn path_to(&self, name: &str) -> Vec<String> {
        let mut path = self.names.clone();
        path.push(name.to_string());
        path
    }
}

/// Why a name could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    /// No entry for the name.
    Undefined,
    /// The name is already being expanded; `path` ends with it.
    Cycle { path: Vec<String> },
}

/// Look up the raw value of `name`.
///
/// The cycle check runs before the lookup so a self-referential name is
/// reported as a cycle even though it is defined.
///
/// # Errors
///
/// Returns `Unresolved::Cycle` if `name` is on `chain`, otherwise
/// `Unresolved::Undefined` if `env` has no entry for it.
pub fn resolve<'e>(
    name: &str,
    env: &'e Environment,
    chain: &ResolutionChain,
) -> Result<&'e str, Unresolved> {
    if chain.contains(name) {
        return Err(Unresolved::Cycle {
            path: chain.path_to(name),
        });
    }
    env.get(name).ok_or(Unresolved::Undefined)
}
