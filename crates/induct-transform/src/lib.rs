//! Induction over reachability claims
//!
//! A claim carrying `decreases = (v, measure, floor)` is split into two artifacts:
//!
//! 1. An **induction hypothesis**: the claim itself, usable as a rewrite rule
//!    whenever the current value of `v` is strictly below a fresh opaque
//!    witness `symbol_v` and not yet at `floor`.
//! 2. An **inductive-step claim**: the claim with `v` replaced by the witness.
//!
//! Proving the step claim in a semantics extended with the hypothesis
//! establishes the original claim for every value of `v` above `floor`.
//!
//! ```
//! use induct_term::{Claim, Term};
//! use induct_transform::InductionTransform;
//!
//! let n = Term::var("n");
//! let claim = Claim::new(Term::apply(
//!     "<T>",
//!     [Term::rewrite(Term::apply("run", [n.clone()]), Term::symbol("done"))],
//! ))
//! .annotate("n, le, 0")
//! .unwrap();
//!
//! let artifacts = InductionTransform::default().apply(&claim).unwrap();
//! assert!(!artifacts.claim.occurs("n"));
//! assert_eq!(artifacts.rule.priority, 1);
//! ```

mod annotation;
pub mod config;
pub mod error;
mod transform;

pub use annotation::find_decreases;
pub use config::{TransformConfig, TransformConfigBuilder};
pub use error::{TransformError, TransformResult};
pub use transform::{side_constraint, step_projection, InductionArtifacts, InductionTransform};
