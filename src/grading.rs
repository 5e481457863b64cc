//! Class-record arithmetic: component totals, percentage and weighted
//! scores, the initial grade and its transmuted final grade.
//!
//! A score is either blank or a number. Blanks add nothing to a total but
//! are reported separately so the editor can tell "not yet entered" from 0.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PortalError, PortalResult};

pub const WRITTEN_ITEMS: usize = 8;
pub const PERFORMANCE_ITEMS: usize = 5;

/// Grade for anything below the lowest transmutation cutoff.
pub const FAILING_GRADE: &str = "5.00";

/// Lower bound of the initial grade (inclusive) and the grade it maps to.
const TRANSMUTATION: [(f64, &str); 9] = [
    (97.0, "1.00"),
    (94.0, "1.25"),
    (91.0, "1.50"),
    (88.0, "1.75"),
    (85.0, "2.00"),
    (82.0, "2.25"),
    (79.0, "2.50"),
    (76.0, "2.75"),
    (75.0, "3.00"),
];

/// `None` is a blank cell.
pub type Score = Option<f64>;

/// Half-up rounding to two decimals: `Int(100*x + 0.5) / 100`.
pub fn round_off_2_decimals(x: f64) -> f64 {
    ((100.0 * x) + 0.5).floor() / 100.0
}

pub fn round_off_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

/// Score as a percentage of `max`; 0 when `max` is not positive.
pub fn percent_of(score: f64, max: f64) -> f64 {
    if max > 0.0 {
        score / max * 100.0
    } else {
        0.0
    }
}

pub fn transmute(initial_grade: f64) -> &'static str {
    TRANSMUTATION
        .iter()
        .find(|(cutoff, _)| initial_grade >= *cutoff)
        .map(|(_, grade)| *grade)
        .unwrap_or(FAILING_GRADE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Written,
    Performance,
    Exam,
}

impl Component {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "written" => Some(Component::Written),
            "performance" => Some(Component::Performance),
            "exam" => Some(Component::Exam),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Term {
    Midterm,
    Final,
}

impl Term {
    /// Anything other than `midterm` selects the final term.
    pub fn from_query(s: &str) -> Self {
        if s == "midterm" {
            Term::Midterm
        } else {
            Term::Final
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Term::Midterm => "midterm",
            Term::Final => "final",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Term::Midterm => "Midterm",
            Term::Final => "Final Term",
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weights {
    pub written: f64,
    pub performance: f64,
    pub exam: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            written: 30.0,
            performance: 40.0,
            exam: 30.0,
        }
    }
}

impl Weights {
    pub fn of(&self, component: Component) -> f64 {
        match component {
            Component::Written => self.written,
            Component::Performance => self.performance,
            Component::Exam => self.exam,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeBand {
    pub letter: String,
    pub min_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingScheme {
    pub weights: Weights,
    pub written_hps: Vec<f64>,
    pub performance_hps: Vec<f64>,
    pub exam_hps: f64,
    /// Highest band first.
    pub letter_scale: Vec<GradeBand>,
}

impl Default for GradingScheme {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            written_hps: vec![10.0, 10.0, 100.0, 10.0, 10.0, 10.0, 50.0, 100.0],
            performance_hps: vec![30.0, 15.0, 0.0, 0.0, 0.0],
            exam_hps: 60.0,
            letter_scale: vec![
                GradeBand {
                    letter: "A".into(),
                    min_percent: 90.0,
                },
                GradeBand {
                    letter: "B".into(),
                    min_percent: 80.0,
                },
                GradeBand {
                    letter: "C".into(),
                    min_percent: 70.0,
                },
            ],
        }
    }
}

impl GradingScheme {
    pub fn validate(&self) -> PortalResult<()> {
        let w = &self.weights;
        for (name, v) in [
            ("written", w.written),
            ("performance", w.performance),
            ("exam", w.exam),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(PortalError::validation(format!(
                    "{name} weight must be a non-negative number"
                )));
            }
        }
        if (w.written + w.performance + w.exam - 100.0).abs() > 1e-9 {
            return Err(PortalError::validation("Weights must add up to 100%"));
        }

        if self.written_hps.len() != WRITTEN_ITEMS {
            return Err(PortalError::validation(format!(
                "written works need exactly {WRITTEN_ITEMS} HPS values"
            )));
        }
        if self.performance_hps.len() != PERFORMANCE_ITEMS {
            return Err(PortalError::validation(format!(
                "performance tasks need exactly {PERFORMANCE_ITEMS} HPS values"
            )));
        }
        let all_hps = self
            .written_hps
            .iter()
            .chain(self.performance_hps.iter())
            .chain(std::iter::once(&self.exam_hps));
        for hps in all_hps {
            if !hps.is_finite() || *hps < 0.0 {
                return Err(PortalError::validation(
                    "HPS values must be non-negative numbers",
                ));
            }
        }

        if self.letter_scale.is_empty() {
            return Err(PortalError::validation("grade scale needs at least one band"));
        }
        for pair in self.letter_scale.windows(2) {
            if pair[0].min_percent <= pair[1].min_percent {
                return Err(PortalError::validation(
                    "grade scale bands must be ordered from highest to lowest",
                ));
            }
        }
        if self.letter_scale.iter().any(|b| b.letter.trim().is_empty()) {
            return Err(PortalError::validation("grade letters must not be empty"));
        }
        Ok(())
    }

    pub fn hps_total(&self, component: Component) -> f64 {
        match component {
            Component::Written => self.written_hps.iter().sum(),
            Component::Performance => self.performance_hps.iter().sum(),
            Component::Exam => self.exam_hps,
        }
    }

    /// HPS of one cell. Exam has a single cell and ignores `item`.
    pub fn item_hps(&self, component: Component, item: Option<usize>) -> Option<f64> {
        match component {
            Component::Written => item.and_then(|i| self.written_hps.get(i).copied()),
            Component::Performance => item.and_then(|i| self.performance_hps.get(i).copied()),
            Component::Exam => Some(self.exam_hps),
        }
    }

    pub fn letter_for(&self, percent: f64) -> &str {
        self.letter_scale
            .iter()
            .find(|b| percent >= b.min_percent)
            .map(|b| b.letter.as_str())
            .unwrap_or("F")
    }

    /// Rejects negative, non-finite and above-HPS scores. Blank is always valid.
    pub fn check_score(
        &self,
        component: Component,
        item: Option<usize>,
        value: Score,
    ) -> PortalResult<()> {
        let Some(hps) = self.item_hps(component, item) else {
            return Err(PortalError::bad_params(format!(
                "no such {component:?} item: {}",
                item.map(|i| i.to_string()).unwrap_or_else(|| "none".into())
            )));
        };
        let Some(v) = value else {
            return Ok(());
        };
        if !v.is_finite() || v < 0.0 {
            return Err(PortalError::bad_params("scores must be non-negative numbers"));
        }
        if v > hps {
            return Err(PortalError::bad_params(format!(
                "score {v} exceeds the highest possible score {hps}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRow {
    pub student_id: String,
    pub name: String,
    pub written: Vec<Score>,
    pub performance: Vec<Score>,
    pub exam: Score,
}

impl GradeRow {
    pub fn blank(student_id: &str, name: &str) -> Self {
        Self {
            student_id: student_id.to_string(),
            name: name.to_string(),
            written: vec![None; WRITTEN_ITEMS],
            performance: vec![None; PERFORMANCE_ITEMS],
            exam: None,
        }
    }

    fn cells(&self, component: Component) -> &[Score] {
        match component {
            Component::Written => &self.written,
            Component::Performance => &self.performance,
            Component::Exam => std::slice::from_ref(&self.exam),
        }
    }

    fn cell_mut(&mut self, component: Component, item: Option<usize>) -> Option<&mut Score> {
        match component {
            Component::Written => item.and_then(|i| self.written.get_mut(i)),
            Component::Performance => item.and_then(|i| self.performance.get_mut(i)),
            Component::Exam => Some(&mut self.exam),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentResult {
    pub total: f64,
    pub hps: f64,
    pub percentage_score: f64,
    pub weighted_score: f64,
    pub blank_count: usize,
}

pub fn component_result(scores: &[Score], hps: f64, weight: f64) -> ComponentResult {
    let total: f64 = scores.iter().flatten().sum();
    let blank_count = scores.iter().filter(|s| s.is_none()).count();
    let (percentage_score, weighted_score) = if hps > 0.0 {
        (
            round_off_2_decimals(total / hps * 100.0),
            round_off_2_decimals(total / hps * weight),
        )
    } else {
        (0.0, 0.0)
    };
    ComponentResult {
        total,
        hps,
        percentage_score,
        weighted_score,
        blank_count,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowResult {
    pub student_id: String,
    pub name: String,
    pub scores: GradeRow,
    pub written: ComponentResult,
    pub performance: ComponentResult,
    pub exam: ComponentResult,
    pub initial_grade: f64,
    pub final_grade: &'static str,
}

pub fn compute_row(scheme: &GradingScheme, row: &GradeRow) -> RowResult {
    let part = |c: Component| {
        component_result(row.cells(c), scheme.hps_total(c), scheme.weights.of(c))
    };
    let written = part(Component::Written);
    let performance = part(Component::Performance);
    let exam = part(Component::Exam);

    let initial_grade = round_off_2_decimals(
        written.weighted_score + performance.weighted_score + exam.weighted_score,
    );
    RowResult {
        student_id: row.student_id.clone(),
        name: row.name.clone(),
        scores: row.clone(),
        written,
        performance,
        exam,
        initial_grade,
        final_grade: transmute(initial_grade),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    pub course: String,
    pub section: String,
    pub term: Term,
}

impl RecordKey {
    pub fn new(course: &str, section: &str, term: Term) -> Self {
        Self {
            course: course.trim().to_lowercase(),
            section: section.trim().to_lowercase(),
            term,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassRecord {
    pub key: RecordKey,
    pub rows: Vec<GradeRow>,
    pub saved_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub total_students: usize,
    pub complete_rows: usize,
    pub blank_cells: usize,
    pub passing: usize,
    pub failing: usize,
    pub class_average: f64,
}

impl ClassRecord {
    pub fn new(key: RecordKey, rows: Vec<GradeRow>) -> Self {
        Self {
            key,
            rows,
            saved_at: None,
        }
    }

    pub fn set_score(
        &mut self,
        scheme: &GradingScheme,
        student_id: &str,
        component: Component,
        item: Option<usize>,
        value: Score,
    ) -> PortalResult<()> {
        scheme.check_score(component, item, value)?;
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.student_id == student_id)
            .ok_or_else(|| PortalError::not_found("class record row", student_id))?;
        let cell = row.cell_mut(component, item).ok_or_else(|| {
            PortalError::bad_params(format!("no such {component:?} item for this row"))
        })?;
        *cell = value;
        Ok(())
    }

    pub fn compute(&self, scheme: &GradingScheme) -> Vec<RowResult> {
        self.rows.iter().map(|r| compute_row(scheme, r)).collect()
    }

    pub fn summarize(&self, scheme: &GradingScheme) -> RecordSummary {
        let results = self.compute(scheme);
        let blanks_in = |r: &RowResult| {
            r.written.blank_count + r.performance.blank_count + r.exam.blank_count
        };
        let blank_cells: usize = results.iter().map(blanks_in).sum();
        let complete_rows = results.iter().filter(|r| blanks_in(r) == 0).count();
        let failing = results
            .iter()
            .filter(|r| r.final_grade == FAILING_GRADE)
            .count();
        let class_average = if results.is_empty() {
            0.0
        } else {
            round_off_2_decimals(
                results.iter().map(|r| r.initial_grade).sum::<f64>() / results.len() as f64,
            )
        };
        RecordSummary {
            total_students: results.len(),
            complete_rows,
            blank_cells,
            passing: results.len() - failing,
            failing,
            class_average,
        }
    }
}
