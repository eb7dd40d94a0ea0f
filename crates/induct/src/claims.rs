//! Loading annotated claims
//!
//! A claim file is JSON holding a single claim, a list of claims, or a whole
//! spec module whose claim sentences are used. An object with a `body` is a
//! claim; any other object is a module.

use crate::error::{InductError, InductResult};
use induct_term::{AnnotationError, Claim, Decreases, Module};
use induct_transform::TransformError;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// A malformed `decreases` fails with `MalformedAnnotation`, not as a JSON error
pub fn load_claims(path: &Path) -> InductResult<Vec<Claim>> {
    let text = std::fs::read_to_string(path).map_err(|e| InductError::io(path, e))?;
    let value: Value = serde_json::from_str(&text).map_err(|e| InductError::json(path, e))?;
    let claims = match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| claim_from_value(item, path))
            .collect::<InductResult<Vec<_>>>()?,
        Value::Object(fields) if !fields.contains_key("body") => module_claims(fields, path)?,
        other => vec![claim_from_value(other, path)?],
    };
    debug!(path = %path.display(), count = claims.len(), "Loaded claims");
    Ok(claims)
}

fn claim_from_value(mut value: Value, path: &Path) -> InductResult<Claim> {
    let decreases = match value.as_object_mut().and_then(|o| o.remove("decreases")) {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) => Some(Decreases::parse(&raw).map_err(TransformError::from)?),
        Some(other) => {
            let err = AnnotationError::new(other.to_string(), "expected a string");
            return Err(TransformError::from(err).into());
        }
    };
    let claim: Claim = serde_json::from_value(value).map_err(|e| InductError::json(path, e))?;
    Ok(match decreases {
        Some(decreases) => claim.with_decreases(decreases),
        None => claim,
    })
}

/// Claim sentences of a spec module; the remaining sentences are only shape-checked
fn module_claims(mut fields: Map<String, Value>, path: &Path) -> InductResult<Vec<Claim>> {
    let sentences = match fields.remove("sentences") {
        Some(Value::Array(items)) => items,
        Some(other) => {
            fields.insert("sentences".to_string(), other);
            Vec::new()
        }
        None => Vec::new(),
    };
    let mut claims = Vec::new();
    let mut rest = Vec::new();
    for sentence in sentences {
        if sentence.get("sentence").and_then(Value::as_str) == Some("claim") {
            claims.push(claim_from_value(sentence, path)?);
        } else {
            rest.push(sentence);
        }
    }
    fields
        .entry("sentences")
        .or_insert_with(|| Value::Array(rest));
    let module: Module =
        serde_json::from_value(Value::Object(fields)).map_err(|e| InductError::json(path, e))?;
    debug!(module = %module.name, claims = claims.len(), "Read spec module");
    Ok(claims)
}

/// The claim labelled `label`, or the only claim when no label is given
pub fn select_claim(claims: Vec<Claim>, label: Option<&str>) -> InductResult<Claim> {
    match label {
        Some(label) => {
            let mut matching = claims
                .into_iter()
                .filter(|c| c.label.as_deref() == Some(label));
            match (matching.next(), matching.next()) {
                (Some(claim), None) => Ok(claim),
                (None, _) => Err(InductError::ClaimSelection(format!(
                    "no claim labelled `{label}`"
                ))),
                (Some(_), Some(_)) => Err(InductError::ClaimSelection(format!(
                    "more than one claim labelled `{label}`"
                ))),
            }
        }
        None => {
            let count = claims.len();
            let mut iter = claims.into_iter();
            match (iter.next(), iter.next()) {
                (Some(claim), None) => Ok(claim),
                _ => Err(InductError::ClaimSelection(format!(
                    "expected exactly one claim, found {count}; select one by label"
                ))),
            }
        }
    }
}
