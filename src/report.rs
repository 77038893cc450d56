use crate::calc::{calculate_grade, Paper};
use crate::etr::{project_target, ProjectionPolicy, TargetProjection};
use crate::session::Session;
use serde::Serialize;

const BLANK: &str = "—";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperLine {
    pub paper: Paper,
    pub number: u8,
    pub label: &'static str,
    pub mark: Option<f64>,
    pub max_mark: f64,
}

/// Printable summary of a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryModel {
    pub student_name: Option<String>,
    pub papers: Vec<PaperLine>,
    pub percentage: f64,
    pub grade: &'static str,
    pub etr: Option<TargetProjection>,
    pub lines: Vec<String>,
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|m| m.to_string()).unwrap_or_else(|| BLANK.to_string())
}

pub fn build_summary(session: &Session, policy: ProjectionPolicy) -> SummaryModel {
    let name = session.student_name.trim();
    let student_name = (!name.is_empty()).then(|| name.to_string());
    let grade = calculate_grade(&session.scores);
    let etr = session
        .target
        .map(|t| project_target(&session.scores, t, policy));

    let papers: Vec<PaperLine> = Paper::ALL
        .into_iter()
        .map(|paper| PaperLine {
            paper,
            number: paper.number(),
            label: paper.label(),
            mark: session.scores.get(paper),
            max_mark: paper.max_mark(),
        })
        .collect();

    let mut lines = Vec::new();
    if let Some(p) = etr.as_ref() {
        lines.push(format!("ETR: To Reach {}%", p.target));
        for pp in &p.papers {
            lines.push(format!(
                "{} ({} / {:.1} needed) in {}",
                pp.status.label(),
                fmt_opt(pp.actual),
                pp.required,
                pp.paper.key()
            ));
        }
        lines.push(p.message.clone());
    }
    lines.push(format!(
        "Student Name: {}",
        student_name.as_deref().unwrap_or(BLANK)
    ));
    lines.push("Paper Scores:".to_string());
    for pl in &papers {
        lines.push(format!("{}: {} / {}", pl.label, fmt_opt(pl.mark), pl.max_mark));
    }
    lines.push(format!("Current Estimated Total: {:.2}%", grade.percentage));
    lines.push(format!("Estimated Grade: {}", grade.grade));

    SummaryModel {
        student_name,
        papers,
        percentage: grade.percentage,
        grade: grade.grade,
        etr,
        lines,
    }
}
