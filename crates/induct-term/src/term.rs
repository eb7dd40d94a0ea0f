//! Term representation
//!
//! A term is a closed tree of three node kinds: variables, constants and symbol
//! applications. Terms are never mutated in place; every rewrite builds a new
//! tree, so a term can be shared freely between claims, rules and proof nodes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Label of the rewrite node `lhs => rhs` inside a claim or rule body
pub const REWRITE: &str = "#Rewrite";
/// Boolean conjunction
pub const AND_BOOL: &str = "_andBool_";
/// Boolean negation
pub const NOT_BOOL: &str = "notBool_";

/// The sort of a variable or constant
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sort(String);

impl Sort {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn int() -> Self {
        Self::new("Int")
    }

    pub fn bool() -> Self {
        Self::new("Bool")
    }

    pub fn string() -> Self {
        Self::new("String")
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A logical term
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum Term {
    /// A named variable, optionally annotated with its sort
    Variable {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sort: Option<Sort>,
    },
    /// A literal token of a given sort (`0`, `true`, `"n"`)
    Constant { token: String, sort: Sort },
    /// A symbol applied to zero or more arguments
    Application {
        symbol: String,
        #[serde(default)]
        args: Vec<Term>,
    },
}

impl Term {
    /// Unsorted variable
    pub fn var(name: impl Into<String>) -> Self {
        Term::Variable {
            name: name.into(),
            sort: None,
        }
    }

    pub fn sorted_var(name: impl Into<String>, sort: Sort) -> Self {
        Term::Variable {
            name: name.into(),
            sort: Some(sort),
        }
    }

    pub fn constant(token: impl Into<String>, sort: Sort) -> Self {
        Term::Constant {
            token: token.into(),
            sort,
        }
    }

    /// Integer literal (accepts anything that prints as an integer, e.g. `i64` or `BigInt`)
    pub fn int(value: impl fmt::Display) -> Self {
        Self::constant(value.to_string(), Sort::int())
    }

    pub fn bool(value: bool) -> Self {
        Self::constant(if value { "true" } else { "false" }, Sort::bool())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::constant(value, Sort::string())
    }

    /// The literal `true`
    pub fn truth() -> Self {
        Self::bool(true)
    }

    pub fn apply(symbol: impl Into<String>, args: impl IntoIterator<Item = Term>) -> Self {
        Term::Application {
            symbol: symbol.into(),
            args: args.into_iter().collect(),
        }
    }

    /// A 0-ary application, e.g. an opaque witness `symboln()`
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::apply(name, [])
    }

    /// `lhs => rhs`
    pub fn rewrite(lhs: Term, rhs: Term) -> Self {
        Self::apply(REWRITE, [lhs, rhs])
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable { .. })
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Term::Constant { token, sort } if token == "true" && *sort == Sort::bool())
    }

    pub fn variable_name(&self) -> Option<&str> {
        match self {
            Term::Variable { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn symbol_name(&self) -> Option<&str> {
        match self {
            Term::Application { symbol, .. } => Some(symbol),
            _ => None,
        }
    }

    /// Arguments of an application; empty for leaves
    pub fn args(&self) -> &[Term] {
        match self {
            Term::Application { args, .. } => args,
            _ => &[],
        }
    }

    pub fn arity(&self) -> usize {
        self.args().len()
    }

    /// Rebuild the tree children-first, handing every rebuilt node to `f`.
    ///
    /// `f` sees a node only after all of its children have been transformed,
    /// and whatever `f` returns is not traversed again.
    pub fn bottom_up<F>(&self, f: &mut F) -> Term
    where
        F: FnMut(Term) -> Term,
    {
        let rebuilt = match self {
            Term::Application { symbol, args } => {
                let mut new_args = Vec::with_capacity(args.len());
                for arg in args {
                    new_args.push(arg.bottom_up(f));
                }
                Term::Application {
                    symbol: symbol.clone(),
                    args: new_args,
                }
            }
            leaf => leaf.clone(),
        };
        f(rebuilt)
    }

    /// First node, in children-first order, satisfying `pred`
    pub fn find_first<P>(&self, pred: &P) -> Option<&Term>
    where
        P: Fn(&Term) -> bool,
    {
        for arg in self.args() {
            if let Some(found) = arg.find_first(pred) {
                return Some(found);
            }
        }
        if pred(self) {
            Some(self)
        } else {
            None
        }
    }

    /// Every node satisfying `pred`, in children-first order
    pub fn find_all<P>(&self, pred: &P) -> Vec<&Term>
    where
        P: Fn(&Term) -> bool,
    {
        let mut found = Vec::new();
        self.collect_matching(pred, &mut found);
        found
    }

    fn collect_matching<'a, P>(&'a self, pred: &P, found: &mut Vec<&'a Term>)
    where
        P: Fn(&Term) -> bool,
    {
        for arg in self.args() {
            arg.collect_matching(pred, found);
        }
        if pred(self) {
            found.push(self);
        }
    }

    /// Replace every variable named `name` with `replacement`.
    ///
    /// Arity and every other node are preserved. Sorts are not checked.
    pub fn substitute(&self, name: &str, replacement: &Term) -> Term {
        self.bottom_up(&mut |node| match node {
            Term::Variable { name: ref n, .. } if n == name => replacement.clone(),
            other => other,
        })
    }

    /// Whether a variable named `name` occurs anywhere in the term
    pub fn occurs(&self, name: &str) -> bool {
        self.find_first(&|t: &Term| t.variable_name() == Some(name))
            .is_some()
    }

    pub fn free_variables(&self) -> BTreeSet<String> {
        self.find_all(&Term::is_variable)
            .into_iter()
            .filter_map(|t| t.variable_name().map(str::to_string))
            .collect()
    }

    /// Sort annotation of every occurrence of variable `name`
    pub fn variable_sorts(&self, name: &str) -> Vec<Option<Sort>> {
        self.find_all(&|t: &Term| t.variable_name() == Some(name))
            .into_iter()
            .map(|t| match t {
                Term::Variable { sort, .. } => sort.clone(),
                _ => None,
            })
            .collect()
    }

    pub fn contains_rewrite(&self) -> bool {
        self.find_first(&|t: &Term| t.symbol_name() == Some(REWRITE))
            .is_some()
    }

    /// Left-hand side: every `l => r` replaced by `l`
    pub fn extract_lhs(&self) -> Term {
        self.project_rewrite(0)
    }

    /// Right-hand side: every `l => r` replaced by `r`
    pub fn extract_rhs(&self) -> Term {
        self.project_rewrite(1)
    }

    fn project_rewrite(&self, side: usize) -> Term {
        self.bottom_up(&mut |node| match node {
            Term::Application { ref symbol, ref args } if symbol == REWRITE && args.len() == 2 => {
                args[side].clone()
            }
            other => other,
        })
    }
}

/// Left-folded conjunction. An empty conjunction is `true`.
pub fn and_bool(terms: impl IntoIterator<Item = Term>) -> Term {
    let mut iter = terms.into_iter();
    let Some(first) = iter.next() else {
        return Term::truth();
    };
    iter.fold(first, |acc, t| Term::apply(AND_BOOL, [acc, t]))
}

pub fn not_bool(term: Term) -> Term {
    Term::apply(NOT_BOOL, [term])
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable { name, sort: None } => write!(f, "{name}"),
            Term::Variable {
                name,
                sort: Some(sort),
            } => write!(f, "{name}:{sort}"),
            Term::Constant { token, sort } if sort.name() == "String" => write!(f, "{token:?}"),
            Term::Constant { token, .. } => write!(f, "{token}"),
            Term::Application { symbol, args } if symbol == REWRITE && args.len() == 2 => {
                write!(f, "({} => {})", args[0], args[1])
            }
            Term::Application { symbol, args } => {
                write!(f, "{symbol}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}
