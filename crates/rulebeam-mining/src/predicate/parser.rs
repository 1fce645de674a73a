//! Canonical predicate-name grammar.
//!
//! ```text
//! expr := term (AND term)+ | term (OR term)+ | term
//! term := TRUE | FALSE | UNDEFINED | NOT term | "(" expr ")" | atomic-name
//! ```
//!
//! Atomic names may contain spaces, brackets and parentheses, so they are
//! matched by longest-prefix lookahead against the known names before any
//! keyword or parenthesis is considered.

use rulebeam_core::errors::ParseError;
use rulebeam_core::types::collections::FxHashMap;

use super::{
    Junction, Predicate, AND_KEYWORD, FALSE_NAME, NOT_KEYWORD, OR_KEYWORD, TRUE_NAME,
    UNDEFINED_NAME,
};

/// Parser resolving atomic names against a fixed lookup.
pub struct PredicateParser<T> {
    by_name: FxHashMap<String, Predicate<T>>,
    /// Names sorted longest first for prefix lookahead.
    names: Vec<String>,
}

impl<T> PredicateParser<T> {
    /// Build a lookup from the atomics of `predicates`.
    pub fn new<'a, I>(predicates: I) -> Self
    where
        I: IntoIterator<Item = &'a Predicate<T>>,
        T: 'a,
    {
        let mut by_name = FxHashMap::default();
        for predicate in predicates {
            for atomic in predicate.atomics() {
                by_name.insert(atomic.name().to_string(), atomic);
            }
        }
        let mut names: Vec<String> = by_name.keys().cloned().collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Self { by_name, names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Option<&Predicate<T>> {
        self.by_name.get(name)
    }

    /// Parse a canonical name back into a predicate.
    pub fn parse(&self, input: &str) -> Result<Predicate<T>, ParseError> {
        let mut cursor = Cursor { input, pos: 0 };
        let expr = self.parse_expr(&mut cursor)?;
        cursor.skip_ws();
        if !cursor.at_end() {
            return Err(if cursor.rest().starts_with(')') {
                ParseError::UnbalancedParentheses {
                    input: input.to_string(),
                    offset: cursor.pos,
                }
            } else {
                ParseError::TrailingInput {
                    input: input.to_string(),
                    offset: cursor.pos,
                }
            });
        }
        Ok(expr)
    }

    fn parse_expr(&self, cursor: &mut Cursor<'_>) -> Result<Predicate<T>, ParseError> {
        let mut terms = vec![self.parse_term(cursor)?];
        let mut junction: Option<Junction> = None;
        loop {
            let save = cursor.pos;
            cursor.skip_ws();
            let next = if cursor.eat_keyword(AND_KEYWORD) {
                Junction::And
            } else if cursor.eat_keyword(OR_KEYWORD) {
                Junction::Or
            } else {
                cursor.pos = save;
                break;
            };
            match junction {
                Some(j) if j != next => {
                    return Err(ParseError::MixedOperators {
                        input: cursor.input.to_string(),
                        offset: save,
                    })
                }
                _ => junction = Some(next),
            }
            terms.push(self.parse_term(cursor)?);
        }
        Ok(match junction {
            Some(j) => Predicate::junction(j, terms),
            None => terms.swap_remove(0),
        })
    }

    fn parse_term(&self, cursor: &mut Cursor<'_>) -> Result<Predicate<T>, ParseError> {
        cursor.skip_ws();
        if cursor.at_end() {
            return Err(ParseError::UnexpectedEnd {
                input: cursor.input.to_string(),
            });
        }

        if let Some(atomic) = self.match_atomic(cursor) {
            return Ok(atomic);
        }
        if cursor.eat_keyword(TRUE_NAME) {
            return Ok(Predicate::always_true());
        }
        if cursor.eat_keyword(FALSE_NAME) {
            return Ok(Predicate::always_false());
        }
        if cursor.eat_keyword(UNDEFINED_NAME) {
            return Ok(Predicate::undefined());
        }
        if cursor.eat_keyword(NOT_KEYWORD) {
            let inner = self.parse_term(cursor)?;
            return inner.not().map_err(|source| ParseError::Predicate {
                input: cursor.input.to_string(),
                source,
            });
        }
        if cursor.rest().starts_with('(') {
            let open = cursor.pos;
            cursor.pos += 1;
            let inner = self.parse_expr(cursor)?;
            cursor.skip_ws();
            if !cursor.rest().starts_with(')') {
                return Err(ParseError::UnbalancedParentheses {
                    input: cursor.input.to_string(),
                    offset: open,
                });
            }
            cursor.pos += 1;
            return Ok(inner);
        }
        Err(ParseError::UnknownPredicate {
            input: cursor.input.to_string(),
            offset: cursor.pos,
        })
    }

    /// Longest known atomic name at the cursor that ends on a token boundary.
    fn match_atomic(&self, cursor: &mut Cursor<'_>) -> Option<Predicate<T>> {
        let rest = cursor.rest();
        let name = self.names.iter().find(|name| {
            rest.starts_with(name.as_str()) && is_boundary(&rest[name.len()..], true)
        })?;
        cursor.pos += name.len();
        self.by_name.get(name).cloned()
    }
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let rest = self.rest();
        if rest.starts_with(keyword) && is_boundary(&rest[keyword.len()..], false) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }
}

/// A token ends at end of input, whitespace, or a closing parenthesis.
/// Keywords may also be followed directly by an opening parenthesis.
fn is_boundary(after: &str, atomic: bool) -> bool {
    match after.chars().next() {
        None => true,
        Some(c) if c.is_whitespace() || c == ')' => true,
        Some('(') => !atomic,
        Some(_) => false,
    }
}
