//! Typed validators for operator input.
//!
//! Each validator takes raw text as typed and either returns the parsed
//! value or an input error naming what was wrong.

use crate::error::{Error, Result};
use crate::grading::GradeScheme;
use crate::storage::format::DELIMITER;

/// Validate a required free-text field.
///
/// Surrounding whitespace is trimmed. The value may not be empty and may not
/// contain the data file delimiter or line breaks.
///
/// # Errors
///
/// Returns [`Error::EmptyField`] or [`Error::InvalidField`].
pub fn parse_text(field: &'static str, raw: &str) -> Result<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(Error::EmptyField { field });
    }
    if value.contains(DELIMITER) {
        return Err(Error::invalid_field(
            field,
            format!("cannot contain '{DELIMITER}'"),
        ));
    }
    if value.chars().any(char::is_control) {
        return Err(Error::invalid_field(
            field,
            "cannot contain line breaks or control characters",
        ));
    }
    Ok(value.to_string())
}

/// Validate a required mark for `subject`.
///
/// # Errors
///
/// Returns [`Error::EmptyField`] for blank input and [`Error::InvalidMark`]
/// for non-integers or values above `max`.
pub fn parse_mark(subject: &str, raw: &str, max: u32) -> Result<u32> {
    parse_optional_mark(subject, raw, max)?.ok_or(Error::EmptyField { field: "marks" })
}

/// Validate a mark where blank input means "keep the current value".
///
/// # Errors
///
/// Returns [`Error::InvalidMark`] for non-integers or values above `max`.
pub fn parse_optional_mark(subject: &str, raw: &str, max: u32) -> Result<Option<u32>> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }
    // Parse as signed so "-5" is reported as out of range rather than garbage
    match value.parse::<i64>() {
        Ok(mark) => u32::try_from(mark)
            .ok()
            .filter(|m| *m <= max)
            .map(Some)
            .ok_or_else(|| Error::invalid_mark(subject, value, max)),
        Err(_) => Err(Error::invalid_mark(subject, value, max)),
    }
}

/// Check an already-numeric mark against the ceiling.
///
/// # Errors
///
/// Returns [`Error::InvalidMark`] if `mark > max`.
pub fn check_mark(subject: &str, mark: u32, max: u32) -> Result<u32> {
    if mark > max {
        return Err(Error::invalid_mark(subject, mark.to_string(), max));
    }
    Ok(mark)
}

/// Split a `Subject=Value` assignment as given on the command line.
///
/// # Errors
///
/// Returns [`Error::InvalidField`] if there is no `=` or the subject is blank.
pub fn split_assignment(raw: &str) -> Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((subject, value)) if !subject.trim().is_empty() => Ok((subject.trim(), value.trim())),
        _ => Err(Error::invalid_field(
            "mark",
            format!("expected SUBJECT=VALUE, got '{raw}'"),
        )),
    }
}

/// Turn `Subject=Value` assignments into one optional mark per subject.
///
/// Subjects that are not mentioned are `None`.
///
/// # Errors
///
/// Returns [`Error::UnknownSubject`] for a subject that is not configured,
/// [`Error::InvalidField`] for malformed or repeated assignments, and
/// [`Error::InvalidMark`] for bad values.
pub fn parse_assignments(scheme: &GradeScheme, raw: &[String]) -> Result<Vec<Option<u32>>> {
    let mut marks = vec![None; scheme.subject_count()];
    for assignment in raw {
        let (subject, value) = split_assignment(assignment)?;
        let index = scheme
            .subject_index(subject)
            .ok_or_else(|| Error::UnknownSubject {
                subject: subject.to_string(),
            })?;
        let name = &scheme.subjects()[index];
        if marks[index].is_some() {
            return Err(Error::invalid_field(
                "mark",
                format!("{name} given more than once"),
            ));
        }
        marks[index] = Some(parse_mark(name, value, scheme.max_marks())?);
    }
    Ok(marks)
}
