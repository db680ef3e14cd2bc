//! Terms, atoms and flat unification
//!
//! Atoms are `Predicate(arg, ...)` or a bare `name` for propositional facts.
//! Arguments are constants or variables written with a leading `?`. There are
//! no function symbols, so unification never needs an occurs check.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// Variable name without the `?` prefix.
    Variable(String),
    Constant(String),
}

impl Term {
    pub fn var(name: impl Into<String>) -> Self {
        Term::Variable(name.into())
    }

    pub fn constant(name: impl Into<String>) -> Self {
        Term::Constant(name.into())
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(name) => write!(f, "?{name}"),
            Term::Constant(name) => f.write_str(name),
        }
    }
}

/// Written in the same `?x` / `c` form atoms print their arguments in.
impl Serialize for Term {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Variable bindings, keyed by variable name.
pub type Bindings = BTreeMap<String, Term>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Atom {
    pub predicate: String,
    pub args: Vec<Term>,
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}

impl Atom {
    pub fn new(predicate: impl Into<String>, args: Vec<Term>) -> Self {
        Self {
            predicate: predicate.into(),
            args,
        }
    }

    /// A zero-arity atom such as `feeling_tired`.
    pub fn proposition(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn is_ground(&self) -> bool {
        !self.args.iter().any(Term::is_variable)
    }

    /// Variable names in order of first appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for arg in &self.args {
            if let Term::Variable(name) = arg
                && !seen.contains(&name.as_str())
            {
                seen.push(name.as_str());
            }
        }
        seen
    }

    /// Apply `bindings`, following variable-to-variable chains.
    pub fn substitute(&self, bindings: &Bindings) -> Atom {
        Atom {
            predicate: self.predicate.clone(),
            args: self.args.iter().map(|t| resolve(t, bindings)).collect(),
        }
    }

    /// The atom with variables renamed to `_0`, `_1`, ... in order of
    /// appearance, so variants of the same atom compare equal.
    pub fn canonical(&self) -> Atom {
        let names = self.variables();
        let args = self
            .args
            .iter()
            .map(|t| match t {
                Term::Variable(v) => {
                    let index = names.iter().position(|n| n == v).unwrap_or_default();
                    Term::Variable(format!("_{index}"))
                }
                constant => constant.clone(),
            })
            .collect();
        Atom::new(self.predicate.clone(), args)
    }
}

/// Follow variable bindings until reaching a constant or an unbound variable.
pub fn resolve(term: &Term, bindings: &Bindings) -> Term {
    let mut current = term;
    // Bindings never map a variable to itself, and chains are at most as long
    // as the map.
    for _ in 0..=bindings.len() {
        match current {
            Term::Variable(name) => match bindings.get(name) {
                Some(next) => current = next,
                None => break,
            },
            Term::Constant(_) => break,
        }
    }
    current.clone()
}

/// One-directional match of `pattern` against a ground `fact`: only variables
/// in the pattern are bound.
pub fn match_atom(pattern: &Atom, fact: &Atom, bindings: &Bindings) -> Option<Bindings> {
    if pattern.predicate != fact.predicate || pattern.args.len() != fact.args.len() {
        return None;
    }
    let mut bindings = bindings.clone();
    for (p, f) in pattern.args.iter().zip(&fact.args) {
        match resolve(p, &bindings) {
            Term::Variable(name) => {
                bindings.insert(name, f.clone());
            }
            constant if constant == *f => {}
            Term::Constant(_) => return None,
        }
    }
    Some(bindings)
}

/// Unify two flat atoms, binding variables on either side.
pub fn unify(a: &Atom, b: &Atom, bindings: &Bindings) -> Option<Bindings> {
    if a.predicate != b.predicate || a.args.len() != b.args.len() {
        return None;
    }
    let mut bindings = bindings.clone();
    for (x, y) in a.args.iter().zip(&b.args) {
        let (x, y) = (resolve(x, &bindings), resolve(y, &bindings));
        if x == y {
            continue;
        }
        match (x, y) {
            (Term::Variable(name), other) | (other, Term::Variable(name)) => {
                bindings.insert(name, other);
            }
            _ => return None,
        }
    }
    Some(bindings)
}

/// Split on commas that are not inside parentheses.
pub(crate) fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts
}

impl FromStr for Atom {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let malformed = |reason: &str| Error::MalformedAtom {
            atom: s.to_string(),
            reason: reason.to_string(),
        };

        let Some(open) = text.find('(') else {
            if !is_identifier(text) {
                return Err(malformed("expected an identifier"));
            }
            return Ok(Atom::proposition(text));
        };
        let inner = text[open + 1..]
            .strip_suffix(')')
            .ok_or_else(|| malformed("missing closing parenthesis"))?;
        let predicate = text[..open].trim();
        if !is_identifier(predicate) {
            return Err(malformed("invalid predicate name"));
        }
        if inner.contains(['(', ')']) {
            return Err(malformed("nested terms are not supported"));
        }

        let mut args = Vec::new();
        if !inner.trim().is_empty() {
            for raw in inner.split(',').map(str::trim) {
                let term = match raw.strip_prefix('?') {
                    Some(name) if is_identifier(name) => Term::var(name),
                    None if is_identifier(raw) => Term::constant(raw),
                    _ => return Err(malformed("invalid argument")),
                };
                args.push(term);
            }
        }
        Ok(Atom::new(predicate, args))
    }
}

impl TryFrom<String> for Atom {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Atom> for String {
    fn from(atom: Atom) -> Self {
        atom.to_string()
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.predicate)?;
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(Term::to_string).collect();
            write!(f, "({})", args.join(", "))?;
        }
        Ok(())
    }
}
