use crate::env::Environment;
use crate::expander::{expand, is_name_char};

/// Prepare a command for launching from already-split tokens and
/// `key=value` declarations.
///
/// Declarations without `=` or with an empty key are dropped. With
/// `use_advanced_parser` each token goes through [`expand`], and a token
/// that fails to expand is omitted; otherwise [`substitute`] is used.
/// Empty results never produce an argument.
#[must_use]
pub fn prepare_commands<T, D>(
    tokens: &[T],
    declarations: &[D],
    use_advanced_parser: bool,
) -> Vec<String>
where
    T: AsRef<str>,
    D: AsRef<str>,
{
    let env = Environment::from_declarations(declarations);
    let mut commands = Vec::with_capacity(tokens.len());

    for token in tokens {
        let token = token.as_ref();
        if use_advanced_parser {
            match expand(token, &env) {
                Ok(words) => commands.extend(words.into_iter().filter(|w| !w.is_empty())),
                Err(e) => tracing::warn!(token, "omitting argument: {e}"),
            }
        } else {
            let value = substitute(token, &env);
            if !value.is_empty() {
                commands.push(value);
            }
        }
    }

    tracing::debug!(?commands, "prepared command");
    commands
}

/// Replace `$name` and `${name}` with their values in one pass.
///
/// Undefined references, and any `${` without a valid closing form, are
/// left in place. Values are inserted verbatim: no quoting, no
/// recursion, no word-splitting.
#[must_use]
pub fn substitute(token: &str, env: &Environment) -> String {
    let mut out = String::with_capacity(token.len());
    let mut rest = token;

    while let Some(idx) = rest.find('$') {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 1..];

        let (name, consumed) = reference_at(after);

        if let Some(value) = env.get(name).filter(|_| !name.is_empty()) {
            out.push_str(value);
            rest = &after[consumed..];
        } else {
            out.push('$');
            rest = after;
        }
    }

    out.push_str(rest);
    out
}

/// Name following a `$` and the bytes it spans. An empty name means the
/// `$` is not a usable reference.
fn reference_at(after: &str) -> (&str, usize) {
    after.strip_prefix('{').map_or_else(
        || {
            let end = after.find(|c| !is_name_char(c)).unwrap_or(after.len());
            (&after[..end], end)
        },
        |braced| match braced.find('}') {
            Some(end) if end > 0 && braced[..end].chars().all(is_name_char) => {
                (&braced[..end], end + 2)
            }
            _ => ("", 0),
        },
    )
}
