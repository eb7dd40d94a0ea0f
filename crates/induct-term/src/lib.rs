//! Term model for induct
//!
//! This crate holds the data every other induct crate works on:
//!
//! - [`Term`]: immutable variable / constant / application trees with a
//!   children-first rewrite traversal ([`Term::bottom_up`]), search
//!   ([`Term::find_first`]) and substitution ([`Term::substitute`])
//! - [`Claim`] and [`Rule`]: reachability obligations and the rewrites derived from them
//! - [`Decreases`]: the `"<var>, <measure>, <floor>"` induction annotation
//! - [`SymbolicState`]: a configuration plus its path condition
//! - [`Module`] / [`Definition`]: the bundle handed to the semantics compiler
//!
//! The crate does not sort-check anything. Rejecting ill-sorted output is the
//! compiler's job.

mod claim;
mod error;
mod module;
mod state;
mod term;

pub use claim::{Claim, Decreases, Rule, RuleKind};
pub use error::{AnnotationError, ModuleError};
pub use module::{Definition, Module, Sentence, SymbolAttribute, SymbolDeclaration};
pub use state::SymbolicState;
pub use term::{and_bool, not_bool, Sort, Term, AND_BOOL, NOT_BOOL, REWRITE};
