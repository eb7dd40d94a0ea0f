//! Locating the `decreases` annotation on a claim
//!
//! The annotation arrives either as the claim's typed `decreases` attribute or
//! as a `decreasesInduction("<var>", "<measure>", "<floor>")` predicate buried
//! in `requires`. Both forms go through the same parser.

use induct_term::{AnnotationError, Claim, Decreases, Sort, Term};

/// The single `decreases` annotation of `claim`
pub fn find_decreases(claim: &Claim, predicate: &str) -> Result<Decreases, AnnotationError> {
    let matches = claim
        .requires
        .find_all(&|t: &Term| t.symbol_name() == Some(predicate));

    let from_predicate = match matches.as_slice() {
        [] => None,
        [node] => Some(parse_predicate(node)?),
        many => {
            return Err(AnnotationError::new(
                predicate,
                format!("found {} {predicate} predicates, expected one", many.len()),
            ))
        }
    };

    match (&claim.decreases, from_predicate) {
        (Some(attr), None) => Ok(attr.clone()),
        (None, Some(pred)) => Ok(pred),
        (Some(attr), Some(pred)) if *attr == pred => Ok(pred),
        (Some(attr), Some(pred)) => Err(AnnotationError::new(
            attr.to_string(),
            format!("conflicts with {predicate}({pred}) in requires"),
        )),
        (None, None) => Err(AnnotationError::new(
            "",
            "claim carries no decreases annotation",
        )),
    }
}

fn parse_predicate(node: &Term) -> Result<Decreases, AnnotationError> {
    let raw = node.to_string();
    if node.arity() != 3 {
        return Err(AnnotationError::new(
            &raw,
            format!("expected 3 arguments, found {}", node.arity()),
        ));
    }
    let mut fields = Vec::with_capacity(3);
    for arg in node.args() {
        match arg {
            Term::Constant { token, sort } if *sort == Sort::string() => fields.push(token.trim()),
            other => {
                return Err(AnnotationError::new(
                    &raw,
                    format!("argument {other} is not a string literal"),
                ))
            }
        }
    }
    Decreases::from_fields(&raw, fields[0], fields[1], fields[2])
}
