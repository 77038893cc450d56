use crate::calc::{calculate_grade, GradeReport, Paper, Scores};
use crate::etr::{project_target, ProjectionPolicy, TargetProjection};
use crate::ipc::ParamError;
use serde::Serialize;
use serde_json::{Map, Value};

/// Form-style numeric coercion: numbers and numeric strings are accepted,
/// anything else (empty, null, text, bools) is treated as not entered.
pub fn coerce_number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Marks are clamped into [0, max] of their paper.
pub fn coerce_mark(paper: Paper, v: &Value) -> Option<f64> {
    coerce_number(v).map(|m| m.clamp(0.0, paper.max_mark()))
}

/// The current input snapshot held on behalf of the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub student_name: String,
    pub scores: Scores,
    pub target: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub inputs: Session,
    pub grade: GradeReport,
    pub etr: Option<TargetProjection>,
}

impl Session {
    /// Applies a partial update. Only unknown keys are rejected; values are
    /// coerced and never fail.
    pub fn apply_patch(&mut self, patch: &Map<String, Value>) -> Result<(), ParamError> {
        // Validate the whole patch before touching any field.
        let known = |k: &str| k == "studentName" || k == "target" || Paper::parse(k).is_some();
        if let Some(k) = patch.keys().find(|k| !known(k.as_str())) {
            return Err(ParamError::UnknownField {
                scope: "session",
                field: k.clone(),
            });
        }

        for (k, v) in patch {
            match k.as_str() {
                "studentName" => {
                    self.student_name = match v {
                        Value::Null => String::new(),
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                }
                "target" => self.target = coerce_number(v),
                key => {
                    if let Some(paper) = Paper::parse(key) {
                        self.scores.set(paper, coerce_mark(paper, v));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Session::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Session::default()
    }

    pub fn evaluate(&self, policy: ProjectionPolicy) -> Evaluation {
        Evaluation {
            inputs: self.clone(),
            grade: calculate_grade(&self.scores),
            etr: self
                .target
                .map(|t| project_target(&self.scores, t, policy)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(v: Value) -> Map<String, Value> {
        v.as_object().cloned().expect("object")
    }

    #[test]
    fn coerce_number_accepts_form_values() {
        assert_eq!(coerce_number(&json!(12)), Some(12.0));
        assert_eq!(coerce_number(&json!(" 12.5 ")), Some(12.5));
        assert_eq!(coerce_number(&json!("0")), Some(0.0));
        assert_eq!(coerce_number(&json!("")), None);
        assert_eq!(coerce_number(&json!("abc")), None);
        assert_eq!(coerce_number(&json!("NaN")), None);
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!(true)), None);
    }

    #[test]
    fn marks_are_clamped_to_paper_range() {
        assert_eq!(coerce_mark(Paper::Speaking, &json!(30)), Some(24.0));
        assert_eq!(coerce_mark(Paper::Writing, &json!(-4)), Some(0.0));
        assert_eq!(coerce_mark(Paper::Reading, &json!("39")), Some(39.0));
    }

    #[test]
    fn patch_updates_and_coerces() {
        let mut s = Session::default();
        s.apply_patch(&patch(json!({
            "studentName": "Aina",
            "reading": "40",
            "writing": 60,
            "speaking": "",
            "target": "85"
        })))
        .expect("patch");
        assert_eq!(s.student_name, "Aina");
        assert_eq!(s.scores.reading, Some(40.0));
        assert_eq!(s.scores.writing, Some(60.0));
        assert_eq!(s.scores.speaking, None);
        assert_eq!(s.target, Some(85.0));

        s.apply_patch(&patch(json!({ "writing": null }))).expect("patch");
        assert_eq!(s.scores.writing, None);
        assert_eq!(s.scores.reading, Some(40.0));
    }

    #[test]
    fn unknown_field_leaves_session_untouched() {
        let mut s = Session::default();
        let e = s
            .apply_patch(&patch(json!({ "reading": 10, "maths": 5 })))
            .unwrap_err();
        assert!(matches!(
            &e,
            ParamError::UnknownField { scope: "session", field } if field == "maths"
        ));
        assert!(s.is_empty());
    }

    #[test]
    fn evaluate_gates_projection_on_target() {
        let mut s = Session::default();
        s.apply_patch(&patch(json!({ "reading": 20, "writing": 30 })))
            .expect("patch");
        let ev = s.evaluate(ProjectionPolicy::Proportional);
        assert_eq!(ev.grade.percentage, 25.0);
        assert!(ev.etr.is_none());

        s.apply_patch(&patch(json!({ "target": 60 }))).expect("patch");
        let ev = s.evaluate(ProjectionPolicy::Proportional);
        assert_eq!(ev.etr.expect("etr").target, 60.0);
    }

    #[test]
    fn reset_returns_to_baseline() {
        let mut s = Session::default();
        s.apply_patch(&patch(json!({
            "studentName": "Aina",
            "reading": 40, "writing": 60, "speaking": 24, "listening": 30,
            "target": 90
        })))
        .expect("patch");
        assert_eq!(s.evaluate(ProjectionPolicy::Flat).grade.grade, "A+");

        s.reset();
        let ev = s.evaluate(ProjectionPolicy::Flat);
        assert_eq!(ev.grade.percentage, 0.0);
        assert_eq!(format!("{:.2}", ev.grade.percentage), "0.00");
        assert_eq!(ev.grade.grade, "G");
        assert!(ev.etr.is_none());
        assert!(s.is_empty());
    }
}
