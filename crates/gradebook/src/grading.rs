//! Grade calculation.
//!
//! A [`GradeScheme`] holds the configuration shared by every record (subject
//! list, maximum marks, grade bands) and turns a set of marks into a
//! [`Summary`] of total, average and grade.

use crate::config::{GradeBand, GradingConfig};

/// Derived statistics for one set of marks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Sum of all subject marks.
    pub total: u32,
    /// `total / subject count`, rounded to two decimal places.
    pub average: f64,
    /// Grade letter for `average`.
    pub grade: char,
}

/// Subject list, mark ceiling and grade bands used to evaluate records.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeScheme {
    subjects: Vec<String>,
    max_marks: u32,
    bands: Vec<GradeBand>,
    fallback_grade: char,
}

impl GradeScheme {
    /// Build a scheme from grading configuration.
    ///
    /// Bands are ordered highest threshold first regardless of how they were
    /// configured.
    #[must_use]
    pub fn new(config: &GradingConfig) -> Self {
        let mut bands = config.bands.clone();
        bands.sort_by(|a, b| b.min_average.total_cmp(&a.min_average));
        Self {
            subjects: config.subjects.clone(),
            max_marks: config.max_marks,
            bands,
            fallback_grade: config.fallback_grade,
        }
    }

    /// Ordered subject names.
    #[must_use]
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    /// Number of subjects.
    #[must_use]
    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    /// Position of a subject in storage order, matched case-insensitively.
    #[must_use]
    pub fn subject_index(&self, subject: &str) -> Option<usize> {
        let subject = subject.trim();
        self.subjects
            .iter()
            .position(|s| s.eq_ignore_ascii_case(subject))
    }

    /// Maximum marks in a single subject.
    #[must_use]
    pub fn max_marks(&self) -> u32 {
        self.max_marks
    }

    /// Maximum total across all subjects.
    #[must_use]
    pub fn max_total(&self) -> u32 {
        let count = u32::try_from(self.subject_count()).unwrap_or(u32::MAX);
        count.saturating_mul(self.max_marks)
    }

    /// Check whether a single mark is within `[0, max_marks]`.
    #[must_use]
    pub fn accepts(&self, mark: u32) -> bool {
        mark <= self.max_marks
    }

    /// Grade letter for an average.
    #[must_use]
    pub fn grade_for(&self, average: f64) -> char {
        self.bands
            .iter()
            .find(|band| average >= band.min_average)
            .map_or(self.fallback_grade, |band| band.grade)
    }

    /// Compute total, average and grade for a set of marks.
    ///
    /// The grade is taken from the rounded average, so the printed average
    /// and the grade always agree.
    #[must_use]
    pub fn summarize(&self, marks: &[u32]) -> Summary {
        let total = marks.iter().fold(0u32, |acc, mark| acc.saturating_add(*mark));
        let average = match u32::try_from(marks.len()) {
            Ok(0) | Err(_) => 0.0,
            Ok(count) => round2(f64::from(total) / f64::from(count)),
        };
        Summary {
            total,
            average,
            grade: self.grade_for(average),
        }
    }
}

impl Default for GradeScheme {
    fn default() -> Self {
        Self::new(&GradingConfig::default())
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
