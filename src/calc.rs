use serde::Serialize;

/// The four papers of the SPM CEFR English exam, in paper-number order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Paper {
    Reading,
    Writing,
    Speaking,
    Listening,
}

impl Paper {
    pub const ALL: [Paper; 4] = [
        Paper::Reading,
        Paper::Writing,
        Paper::Speaking,
        Paper::Listening,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "reading" => Some(Self::Reading),
            "writing" => Some(Self::Writing),
            "speaking" => Some(Self::Speaking),
            "listening" => Some(Self::Listening),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Reading => "reading",
            Self::Writing => "writing",
            Self::Speaking => "speaking",
            Self::Listening => "listening",
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Self::Reading => 1,
            Self::Writing => 2,
            Self::Speaking => 3,
            Self::Listening => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Reading => "Paper 1 (Reading)",
            Self::Writing => "Paper 2 (Writing)",
            Self::Speaking => "Paper 3 (Speaking)",
            Self::Listening => "Paper 4 (Listening)",
        }
    }

    pub fn max_mark(self) -> f64 {
        match self {
            Self::Reading => 40.0,
            Self::Writing => 60.0,
            Self::Speaking => 24.0,
            Self::Listening => 30.0,
        }
    }

    /// All four papers carry the same weight; the weights sum to 1.0.
    pub fn weight(self) -> f64 {
        0.25
    }
}

/// Raw marks as entered. `None` means the paper has not been taken yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scores {
    pub reading: Option<f64>,
    pub writing: Option<f64>,
    pub speaking: Option<f64>,
    pub listening: Option<f64>,
}

impl Scores {
    pub fn get(&self, paper: Paper) -> Option<f64> {
        match paper {
            Paper::Reading => self.reading,
            Paper::Writing => self.writing,
            Paper::Speaking => self.speaking,
            Paper::Listening => self.listening,
        }
    }

    pub fn set(&mut self, paper: Paper, mark: Option<f64>) {
        let slot = match paper {
            Paper::Reading => &mut self.reading,
            Paper::Writing => &mut self.writing,
            Paper::Speaking => &mut self.speaking,
            Paper::Listening => &mut self.listening,
        };
        *slot = mark;
    }

    pub fn entered(&self) -> impl Iterator<Item = (Paper, f64)> + '_ {
        Paper::ALL
            .into_iter()
            .filter_map(|p| self.get(p).map(|m| (p, m)))
    }

    pub fn missing(&self) -> impl Iterator<Item = Paper> + '_ {
        Paper::ALL.into_iter().filter(|p| self.get(*p).is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
    pub percentage: f64,
    pub grade: &'static str,
}

/// Descending lower bounds; the first band whose bound is met wins.
const GRADE_BANDS: &[(f64, &str)] = &[
    (90.0, "A+"),
    (80.0, "A"),
    (70.0, "A-"),
    (65.0, "B+"),
    (60.0, "B"),
    (55.0, "C+"),
    (50.0, "C"),
    (45.0, "D"),
    (40.0, "E"),
];

const LOWEST_GRADE: &str = "G";

pub fn round_to(x: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (x * f).round() / f
}

pub fn grade_for_percentage(percentage: f64) -> &'static str {
    GRADE_BANDS
        .iter()
        .find(|(min, _)| percentage >= *min)
        .map(|(_, g)| *g)
        .unwrap_or(LOWEST_GRADE)
}

/// Share of the overall percentage contributed by one paper.
pub fn contribution(paper: Paper, mark: f64) -> f64 {
    (mark / paper.max_mark()) * paper.weight() * 100.0
}

/// Unrounded weighted sum over entered papers. Absent papers add nothing and
/// their weight is not redistributed.
pub fn weighted_total(scores: &Scores) -> f64 {
    // Folding from +0.0: an empty f64 `sum()` yields -0.0.
    scores
        .entered()
        .fold(0.0, |acc, (p, m)| acc + contribution(p, m))
}

pub fn calculate_grade(scores: &Scores) -> GradeReport {
    let percentage = round_to(weighted_total(scores), 2);
    GradeReport {
        percentage,
        grade: grade_for_percentage(percentage),
    }
}
