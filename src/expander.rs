use std::fmt;

use crate::env::Environment;
use crate::resolver::{ResolutionChain, Unresolved, resolve};

/// Classifies an expansion error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandErrorKind {
    /// Reference to a name with no entry in the environment.
    UndefinedVariable { name: String },
    /// A value refers back to a name already being expanded.
    CyclicReference { path: Vec<String> },
    /// Quote opened but never closed.
    UnterminatedQuote { quote: char },
    /// Malformed `${...}` reference.
    BadSubstitution { text: String },
    /// Substituted values together exceed the byte limit.
    ExpansionTooLarge { limit: usize },
}

impl fmt::Display for ExpandErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedVariable { name } => {
                write!(f, "undefined variable: {name}")
            }
            Self::CyclicReference { path } => {
                write!(f, "cyclic variable reference: {}", path.join(" -> "))
            }
            Self::UnterminatedQuote { quote: '\'' } => {
                write!(f, "unterminated single-quoted string")
            }
            Self::UnterminatedQuote { quote } => {
                write!(f, "unterminated quoted string, expected closing {quote}")
            }
            Self::BadSubstitution { text } => {
                write!(f, "bad substitution: {text}")
            }
            Self::ExpansionTooLarge { limit } => {
                write!(f, "expansion exceeds {limit} bytes")
            }
        }
    }
}

/// Error produced during expansion.
///
/// `offset` is a byte offset into the top-level input. Errors raised
/// while scanning a substituted value point at the outermost reference
/// that brought the value in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at offset {offset}")]
pub struct ExpandError {
    pub kind: ExpandErrorKind,
    pub offset: usize,
}

/// Expand a command-line string into its argument words.
///
/// `$name` and `${name}` references are replaced by their values and the
/// values are scanned again, so quotes and references inside them take
/// effect. Single quotes suppress substitution, double quotes suppress
/// word-splitting, and unquoted whitespace separates words.
///
/// A quoted span is part of a word even when empty: `""$X""` is just the
/// value of `X`, and a word consisting only of `""` or `''` is kept as an
/// empty argument, as POSIX shells do.
/// [`prepare_commands`](crate::prepare_commands) drops such empty words.
///
/// # Errors
///
/// Returns `ExpandError` on an undefined or cyclic reference, an
/// unterminated quote, a malformed `${...}`, or when the substituted
/// values add up to more than [`MAX_EXPANSION_BYTES`]. No partial output
/// is returned.
pub fn expand(input: &str, env: &Environment) -> Result<Vec<String>, ExpandError> {
    Expander::new(input, env).run()
}

/// Upper bound on the bytes spliced in by substitutions during one
/// `expand` call.
pub const MAX_EXPANSION_BYTES: usize = 1 << 20;

pub(crate) const fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

const fn is_blank(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    Unquoted,
    Single,
    Double,
}

/// A run of characters being scanned: the input itself at the bottom,
/// substituted values above it.
struct Frame<'a> {
    text: &'a str,
    pos: usize,
    origin: usize,
}

struct Expander<'a> {
    env: &'a Environment,
    frames: Vec<Frame<'a>>,
    chain: ResolutionChain,
    state: QuoteState,
    quote_offset: usize,
    spliced: usize,
    words: Vec<String>,
    current: String,
    in_word: bool,
}

impl<'a> Expander<'a> {
    fn new(input: &'a str, env: &'a Environment) -> Self {
        Self {
            env,
            frames: vec![Frame {
                text: input,
                pos: 0,
                origin: 0,
            }],
            chain: ResolutionChain::new(),
            state: QuoteState::Unquoted,
            quote_offset: 0,
            spliced: 0,
            words: Vec::new(),
            current: String::new(),
            in_word: false,
        }
    }

    fn run(mut self) -> Result<Vec<String>, ExpandError> {
        while let Some((at, ch)) = self.next_char() {
            match (self.state, ch) {
                (QuoteState::Unquoted, c) if is_blank(c) => self.finish_word(),
                (QuoteState::Unquoted, '\'') => self.open_quote(QuoteState::Single, at),
                (QuoteState::Unquoted, '"') => self.open_quote(QuoteState::Double, at),
                (QuoteState::Single, '\'') | (QuoteState::Double, '"') => {
                    self.state = QuoteState::Unquoted;
                }
                (QuoteState::Unquoted | QuoteState::Double, '$') => {
                    match self.read_reference(at)? {
                        Some(name) => self.substitute(name, at)?,
                        None => self.push('$'),
                    }
                }
                (_, c) => self.push(c),
            }
        }

        let quote = match self.state {
            QuoteState::Unquoted => None,
            QuoteState::Single => Some('\''),
            QuoteState::Double => Some('"'),
        };
        if let Some(quote) = quote {
            return Err(ExpandError {
                kind: ExpandErrorKind::UnterminatedQuote { quote },
                offset: self.quote_offset,
            });
        }

        self.finish_word();
        Ok(self.words)
    }

    /// Next character and the input offset it is attributed to.
    ///
    /// Exhausted value frames are popped here, and only here, so a name
    /// stays on the chain until everything its value produced is read.
    fn next_char(&mut self) -> Option<(usize, char)> {
        loop {
            let origin = self.frames.get(1).map(|f| f.origin);
            let frame = self.frames.last_mut()?;
            if let Some(ch) = frame.text[frame.pos..].chars().next() {
                let at = origin.unwrap_or(frame.pos);
                frame.pos += ch.len_utf8();
                return Some((at, ch));
            }
            if self.frames.len() == 1 {
                return None;
            }
            self.frames.pop();
            self.chain.pop();
        }
    }

    /// Peek within the frame the last character came from.
    fn peek(&self) -> Option<char> {
        let frame = self.frames.last()?;
        frame.text[frame.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            if let Some(ch) = frame.text[frame.pos..].chars().next() {
                frame.pos += ch.len_utf8();
            }
        }
    }

    /// Read the name after a `$`. Returns `None` when the `$` does not
    /// start a reference and is literal.
    fn read_reference(&mut self, at: usize) -> Result<Option<String>, ExpandError> {
        match self.peek() {
            Some('{') => {
                self.bump();
                let mut name = String::new();
                loop {
                    match self.peek() {
                        None => {
                            return Err(ExpandError {
                                kind: ExpandErrorKind::BadSubstitution {
                                    text: format!("${{{name}"),
                                },
                                offset: at,
                            });
                        }
                        Some('}') => {
                            self.bump();
                            break;
                        }
                        Some(c) => {
                            name.push(c);
                            self.bump();
                        }
                    }
                }
                if name.is_empty() || !name.chars().all(is_name_char) {
                    return Err(ExpandError {
                        kind: ExpandErrorKind::BadSubstitution {
                            text: format!("${{{name}}}"),
                        },
                        offset: at,
                    });
                }
                Ok(Some(name))
            }
            Some(c) if is_name_char(c) => {
                let mut name = String::new();
                while let Some(c) = self.peek().filter(|&c| is_name_char(c)) {
                    name.push(c);
                    self.bump();
                }
                Ok(Some(name))
            }
            _ => Ok(None),
        }
    }

    fn substitute(&mut self, name: String, at: usize) -> Result<(), ExpandError> {
        let value = resolve(&name, self.env, &self.chain).map_err(|e| ExpandError {
            kind: match e {
                Unresolved::Undefined => ExpandErrorKind::UndefinedVariable { name: name.clone() },
                Unresolved::Cycle { path } => ExpandErrorKind::CyclicReference { path },
            },
            offset: at,
        })?;

        // Empty values still count, so runaway reference fan-out is caught.
        self.spliced += value.len().max(1);
        if self.spliced > MAX_EXPANSION_BYTES {
            return Err(ExpandError {
                kind: ExpandErrorKind::ExpansionTooLarge {
                    limit: MAX_EXPANSION_BYTES,
                },
                offset: at,
            });
        }

        tracing::trace!(name = %name, depth = self.chain.depth(), "substituting variable");
        self.chain.push(name);
        self.frames.push(Frame {
            text: value,
            pos: 0,
            origin: at,
        });
        Ok(())
    }

    const fn open_quote(&mut self, state: QuoteState, at: usize) {
        self.state = state;
        self.quote_offset = at;
        self.in_word = true;
    }

    fn push(&mut self, ch: char) {
        self.current.push(ch);
        self.in_word = true;
    }

    fn finish_word(&mut self) {
        if self.in_word {
            self.words.push(std::mem::take(&mut self.current));
            self.in_word = false;
        }
    }
}
