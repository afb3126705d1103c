use std::collections::HashMap;
use std::fmt;

/// Classifies a malformed `key=value` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationErrorKind {
    /// No `=` in the declaration.
    MissingSeparator,
    /// Nothing before the first `=`.
    EmptyKey,
}

impl fmt::Display for DeclarationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator => write!(f, "missing '='"),
            Self::EmptyKey => write!(f, "empty variable name"),
        }
    }
}

/// A `key=value` declaration that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid declaration '{declaration}': {kind}")]
pub struct DeclarationError {
    pub kind: DeclarationErrorKind,
    pub declaration: String,
}

/// Split a `key=value` declaration on its first `=`.
///
/// The value keeps any further `=` characters and may be empty.
///
/// # Errors
///
/// Returns `DeclarationError` when there is no `=` or the key is empty.
pub fn parse_declaration(declaration: &str) -> Result<(&str, &str), DeclarationError> {
    let Some((key, value)) = declaration.split_once('=') else {
        return Err(DeclarationError {
            kind: DeclarationErrorKind::MissingSeparator,
            declaration: declaration.to_string(),
        });
    };
    if key.is_empty() {
        return Err(DeclarationError {
            kind: DeclarationErrorKind::EmptyKey,
            declaration: declaration.to_string(),
        });
    }
    Ok((key, value))
}

/// Read-only mapping from variable name to raw value.
///
/// Names are case-sensitive. Values are stored unexpanded; references
/// inside them are resolved at expansion time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    #[must_use]
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    /// Build an environment from `key=value` declarations, dropping
    /// malformed entries.
    #[must_use]
    pub fn from_declarations<S: AsRef<str>>(declarations: &[S]) -> Self {
        let mut env = Self::new();
        for declaration in declarations {
            let declaration = declaration.as_ref();
            match parse_declaration(declaration) {
                Ok((key, value)) => env.insert(key, value),
                Err(e) => tracing::debug!("dropping {e}"),
            }
        }
        env
    }

    /// Like [`Environment::from_declarations`] but fails on the first
    /// malformed entry.
    ///
    /// # Errors
    ///
    /// Returns the `DeclarationError` of the first bad entry.
    pub fn try_from_declarations<S: AsRef<str>>(
        declarations: &[S],
    ) -> Result<Self, DeclarationError> {
        let mut env = Self::new();
        for declaration in declarations {
            let (key, value) = parse_declaration(declaration.as_ref())?;
            env.insert(key, value);
        }
        Ok(env)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl From<HashMap<String, String>> for Environment {
    fn from(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Environment {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.vars
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_equals() {
        let (k, v) = parse_declaration("key=value=with=equals").expect("should parse");
        assert_eq!(k, "key");
        assert_eq!(v, "value=with=equals");
    }

    #[test]
    fn empty_value_is_kept() {
        let (k, v) = parse_declaration("key=").expect("should parse");
        assert_eq!(k, "key");
        assert_eq!(v, "");
    }

    #[test]
    fn leading_equals_is_rejected() {
        let err = parse_declaration("=key=value").unwrap_err();
        assert_eq!(err.kind, DeclarationErrorKind::EmptyKey);
    }

    #[test]
    fn missing_separator_is_rejected() {
        let err = parse_declaration("novalue").unwrap_err();
        assert_eq!(err.kind, DeclarationErrorKind::MissingSeparator);
        assert_eq!(
            err.to_string(),
            "invalid declaration 'novalue': missing '='"
        );
    }

    #[test]
    fn from_declarations_drops_malformed() {
        let env = Environment::from_declarations(&["a=1", "=b=2", "c", "d="]);
        assert_eq!(env.len(), 2);
        assert_eq!(env.get("a"), Some("1"));
        assert_eq!(env.get("d"), Some(""));
        assert!(!env.contains("b"));
        assert!(!env.contains("c"));
    }

    #[test]
    fn later_declaration_wins() {
        let env = Environment::from_declarations(&["a=1", "a=2"]);
        assert_eq!(env.get("a"), Some("2"));
    }

    #[test]
    fn strict_declarations_fail() {
        assert!(Environment::try_from_declarations(&["a=1", "b"]).is_err());
        let env = Environment::try_from_declarations(&["a=1"]).expect("should parse");
        assert_eq!(env.get("a"), Some("1"));
    }
}
