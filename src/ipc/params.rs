use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::calc::{Paper, Scores};
use crate::etr::ProjectionPolicy;
use crate::ipc::error::err;
use crate::session::{coerce_mark, coerce_number};

#[derive(Debug, Error)]
pub enum ParamError {
    #[error("missing params.{0}")]
    Missing(&'static str),
    #[error("params.{0} must be an object")]
    NotObject(&'static str),
    #[error("params.{field} must be {expected}")]
    Invalid {
        field: &'static str,
        expected: &'static str,
    },
    #[error("unknown {scope} field: {field}")]
    UnknownField { scope: &'static str, field: String },
}

impl ParamError {
    pub fn code(&self) -> &'static str {
        "bad_params"
    }

    pub fn respond(&self, id: &str) -> Value {
        let details = match self {
            Self::Missing(field) | Self::NotObject(field) | Self::Invalid { field, .. } => {
                json!({ "field": field })
            }
            Self::UnknownField { field, .. } => json!({ "field": field }),
        };
        err(id, self.code(), self.to_string(), Some(details))
    }
}

pub fn object<'a>(
    params: &'a Value,
    key: &'static str,
) -> Result<Option<&'a Map<String, Value>>, ParamError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_object().map(Some).ok_or(ParamError::NotObject(key)),
    }
}

/// Reads `params.scores`. A missing object means nothing entered; mark values
/// go through the same coercion as form input.
pub fn scores(params: &Value) -> Result<Scores, ParamError> {
    let mut out = Scores::default();
    let Some(obj) = object(params, "scores")? else {
        return Ok(out);
    };
    for (k, v) in obj {
        let Some(paper) = Paper::parse(k) else {
            return Err(ParamError::UnknownField {
                scope: "scores",
                field: k.clone(),
            });
        };
        out.set(paper, coerce_mark(paper, v));
    }
    Ok(out)
}

pub fn target(params: &Value) -> Result<f64, ParamError> {
    let raw = params.get("target").ok_or(ParamError::Missing("target"))?;
    coerce_number(raw).ok_or(ParamError::Invalid {
        field: "target",
        expected: "a number",
    })
}

pub fn policy(params: &Value, fallback: ProjectionPolicy) -> Result<ProjectionPolicy, ParamError> {
    match params.get("policy") {
        None | Some(Value::Null) => Ok(fallback),
        Some(v) => v
            .as_str()
            .and_then(ProjectionPolicy::parse)
            .ok_or(ParamError::Invalid {
                field: "policy",
                expected: "one of: proportional, flat",
            }),
    }
}
