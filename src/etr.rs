use crate::calc::{calculate_grade, round_to, Paper, Scores};
use serde::Serialize;

/// A paper at or above this fraction of its required mark still counts as
/// "needs improvement" rather than "far from target".
pub const NEEDS_IMPROVEMENT_RATIO: f64 = 0.8;

const EPS: f64 = 1e-9;

/// How the required mark of a paper that has not been taken yet is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionPolicy {
    /// Spread what is still missing from the target over the papers not yet
    /// taken, in proportion to their weight.
    #[default]
    Proportional,
    /// Every paper must reach the target percentage on its own.
    Flat,
}

impl ProjectionPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "proportional" => Some(Self::Proportional),
            "flat" => Some(Self::Flat),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Proportional => "proportional",
            Self::Flat => "flat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperStatus {
    OnTrack,
    NeedsImprovement,
    FarFromTarget,
    NotTaken,
}

impl PaperStatus {
    fn classify(actual: f64, required: f64) -> Self {
        if actual >= required {
            Self::OnTrack
        } else if actual >= required * NEEDS_IMPROVEMENT_RATIO {
            Self::NeedsImprovement
        } else {
            Self::FarFromTarget
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OnTrack => "On track",
            Self::NeedsImprovement => "Needs improvement",
            Self::FarFromTarget => "Far from target",
            Self::NotTaken => "Not taken",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperProjection {
    pub paper: Paper,
    pub label: &'static str,
    pub max_mark: f64,
    pub actual: Option<f64>,
    pub required: f64,
    pub status: PaperStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverallNote {
    TargetReached,
    /// `remaining` is the number of papers not yet taken; zero means every
    /// paper is in and the score can no longer rise.
    TargetUnreachable { remaining: usize },
    /// Percentage points still needed, to be earned across `remaining` papers.
    RemainingNeeded { points: f64, remaining: usize },
    Gap { points: f64 },
}

impl OverallNote {
    pub fn message(&self, target: f64) -> String {
        match self {
            Self::TargetReached => "You have reached your target!".to_string(),
            Self::TargetUnreachable { remaining: 0 } => format!(
                "You can no longer reach {}%. But you can still aim for your personal best.",
                target
            ),
            Self::TargetUnreachable { .. } => format!(
                "Even full marks in the remaining papers cannot reach {}%. Aim for your personal best.",
                target
            ),
            Self::RemainingNeeded { points, remaining } => format!(
                "You need {:.1}% more from the {} remaining paper{} to reach your target",
                points,
                remaining,
                if *remaining == 1 { "" } else { "s" }
            ),
            Self::Gap { points } => {
                format!("You need {:.1}% more to reach your target", points)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetProjection {
    pub target: f64,
    pub policy: ProjectionPolicy,
    pub percentage: f64,
    pub papers: Vec<PaperProjection>,
    pub overall: OverallNote,
    pub message: String,
    /// `percentage / target`, clamped to [0, 1].
    pub progress: f64,
}

fn flat_required(paper: Paper, target: f64) -> f64 {
    (target / 100.0) * paper.max_mark()
}

pub fn project_target(scores: &Scores, target: f64, policy: ProjectionPolicy) -> TargetProjection {
    let percentage = calculate_grade(scores).percentage;
    let remaining: Vec<Paper> = scores.missing().collect();
    let remaining_weight: f64 = remaining.iter().map(|p| p.weight()).sum();
    let still_needed = target - percentage;

    // Fraction of each untaken paper's max that must be earned. Only defined
    // while at least one paper is outstanding.
    let apportioned_fraction = if remaining.is_empty() {
        None
    } else {
        Some((still_needed / (remaining_weight * 100.0)).max(0.0))
    };

    let papers = Paper::ALL
        .into_iter()
        .map(|paper| {
            let actual = scores.get(paper);
            let (required, status) = match actual {
                Some(mark) => {
                    let required = flat_required(paper, target);
                    (required, PaperStatus::classify(mark, required))
                }
                None => {
                    let required = match (policy, apportioned_fraction) {
                        (ProjectionPolicy::Proportional, Some(frac)) => frac * paper.max_mark(),
                        _ => flat_required(paper, target),
                    };
                    (required, PaperStatus::NotTaken)
                }
            };
            PaperProjection {
                paper,
                label: paper.label(),
                max_mark: paper.max_mark(),
                actual,
                required: round_to(required, 1),
                status,
            }
        })
        .collect();

    let overall = if percentage >= target {
        OverallNote::TargetReached
    } else if remaining.is_empty() {
        OverallNote::TargetUnreachable { remaining: 0 }
    } else {
        match policy {
            ProjectionPolicy::Proportional if still_needed > remaining_weight * 100.0 + EPS => {
                OverallNote::TargetUnreachable {
                    remaining: remaining.len(),
                }
            }
            ProjectionPolicy::Proportional => OverallNote::RemainingNeeded {
                points: round_to(still_needed, 1),
                remaining: remaining.len(),
            },
            ProjectionPolicy::Flat => OverallNote::Gap {
                points: round_to(still_needed, 1),
            },
        }
    };

    let progress = if target <= 0.0 {
        1.0
    } else {
        (percentage / target).clamp(0.0, 1.0)
    };

    TargetProjection {
        target,
        policy,
        percentage,
        papers,
        message: overall.message(target),
        overall,
        progress,
    }
}
