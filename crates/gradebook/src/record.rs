//! Student record type.
//!
//! A [`StudentRecord`] owns its identity fields and marks. The derived
//! fields (total, average, grade) are private and can only change through
//! methods that recompute them from the marks.

use crate::grading::{GradeScheme, Summary};

/// Normalize a roll number for comparison and storage.
#[must_use]
pub fn normalize_roll(roll: &str) -> &str {
    roll.trim()
}

/// Fields supplied when registering a new student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    /// Roll number, unique across the store.
    pub roll: String,
    /// Student name.
    pub name: String,
    /// Class or section label.
    pub class: String,
    /// One mark per configured subject, in subject order.
    pub marks: Vec<u32>,
}

/// A student's academic record.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    roll: String,
    name: String,
    class: String,
    marks: Vec<u32>,
    summary: Summary,
}

impl StudentRecord {
    /// Build a record and compute its derived fields.
    ///
    /// Field validation is the caller's job; see [`crate::storage::Store::add`].
    #[must_use]
    pub fn new(student: NewStudent, scheme: &GradeScheme) -> Self {
        let summary = scheme.summarize(&student.marks);
        Self {
            roll: normalize_roll(&student.roll).to_string(),
            name: student.name,
            class: student.class,
            marks: student.marks,
            summary,
        }
    }

    /// Roll number.
    #[must_use]
    pub fn roll(&self) -> &str {
        &self.roll
    }

    /// Student name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Class or section label.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Marks in subject order.
    #[must_use]
    pub fn marks(&self) -> &[u32] {
        &self.marks
    }

    /// Sum of marks.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.summary.total
    }

    /// Average mark, rounded to two decimal places.
    #[must_use]
    pub fn average(&self) -> f64 {
        self.summary.average
    }

    /// Grade letter.
    #[must_use]
    pub fn grade(&self) -> char {
        self.summary.grade
    }

    /// Check whether this record has the given roll number.
    #[must_use]
    pub fn has_roll(&self, roll: &str) -> bool {
        self.roll == normalize_roll(roll)
    }

    /// Replace the marks for which an update is given, keep the rest, and
    /// recompute the derived fields.
    ///
    /// `updates` is indexed by subject; extra entries are ignored.
    pub(crate) fn apply_marks(&mut self, updates: &[Option<u32>], scheme: &GradeScheme) {
        for (mark, update) in self.marks.iter_mut().zip(updates) {
            if let Some(value) = update {
                *mark = *value;
            }
        }
        self.recompute(scheme);
    }

    /// Recompute total, average and grade from the current marks.
    pub(crate) fn recompute(&mut self, scheme: &GradeScheme) {
        self.summary = scheme.summarize(&self.marks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> NewStudent {
        NewStudent {
            roll: "101".to_string(),
            name: "Alice".to_string(),
            class: "10A".to_string(),
            marks: vec![90, 70, 85],
        }
    }

    #[test]
    fn test_new_computes_summary() {
        let record = StudentRecord::new(alice(), &GradeScheme::default());

        assert_eq!(record.roll(), "101");
        assert_eq!(record.name(), "Alice");
        assert_eq!(record.class(), "10A");
        assert_eq!(record.marks(), &[90, 70, 85]);
        assert_eq!(record.total(), 245);
        assert!((record.average() - 81.67).abs() < f64::EPSILON);
        assert_eq!(record.grade(), 'A');
    }

    #[test]
    fn test_new_normalizes_roll() {
        let mut student = alice();
        student.roll = "  101 ".to_string();
        let record = StudentRecord::new(student, &GradeScheme::default());

        assert_eq!(record.roll(), "101");
        assert!(record.has_roll("101"));
        assert!(record.has_roll(" 101"));
        assert!(!record.has_roll("1010"));
    }

    #[test]
    fn test_apply_marks_partial() {
        let scheme = GradeScheme::default();
        let mut record = StudentRecord::new(alice(), &scheme);

        record.apply_marks(&[Some(40), None, None], &scheme);

        assert_eq!(record.marks(), &[40, 70, 85]);
        assert_eq!(record.total(), 195);
        assert!((record.average() - 65.0).abs() < f64::EPSILON);
        assert_eq!(record.grade(), 'B');
    }

    #[test]
    fn test_apply_marks_none_keeps_marks() {
        let scheme = GradeScheme::default();
        let mut record = StudentRecord::new(alice(), &scheme);
        let before = record.clone();

        record.apply_marks(&[None, None, None], &scheme);

        assert_eq!(record, before);
    }

    #[test]
    fn test_normalize_roll() {
        assert_eq!(normalize_roll(" 42\t"), "42");
        assert_eq!(normalize_roll("A-7"), "A-7");
    }
}
