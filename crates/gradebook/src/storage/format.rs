//! Line format of the data file.
//!
//! One record per line, fields joined by [`DELIMITER`]:
//!
//! ```text
//! roll|name|class|<mark per subject>|total|average|grade
//! 101|Alice|10A|90|70|85|245|81.67|A
//! ```
//!
//! There is no escaping, so free-text fields must never contain the
//! delimiter. The trailing derived fields are written for readability and
//! ignored on read.

use crate::error::{Error, Result};
use crate::grading::GradeScheme;
use crate::record::{NewStudent, StudentRecord};

/// Field separator.
pub const DELIMITER: char = '|';

/// Number of identity fields before the marks.
const IDENTITY_FIELDS: usize = 3;

/// Encode a record as one line, without the trailing newline.
#[must_use]
pub fn encode_line(record: &StudentRecord) -> String {
    let mut fields = Vec::with_capacity(IDENTITY_FIELDS + record.marks().len() + 3);
    fields.push(record.roll().to_string());
    fields.push(record.name().to_string());
    fields.push(record.class().to_string());
    fields.extend(record.marks().iter().map(u32::to_string));
    fields.push(record.total().to_string());
    fields.push(format!("{:.2}", record.average()));
    fields.push(record.grade().to_string());
    fields.join(&DELIMITER.to_string())
}

/// Decode one line into a record, recomputing its derived fields.
///
/// `line_no` is 1-based and only used for error messages.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the line has too few fields, a blank identity
/// field, or a mark that is not an integer within range.
pub fn decode_line(line: &str, line_no: usize, scheme: &GradeScheme) -> Result<StudentRecord> {
    let parse_error = |message: String| Error::Parse {
        line: line_no,
        message,
    };

    let fields: Vec<&str> = line.trim().split(DELIMITER).collect();
    let expected = IDENTITY_FIELDS + scheme.subject_count();
    if fields.len() < expected {
        return Err(parse_error(format!(
            "expected at least {expected} fields, found {}",
            fields.len()
        )));
    }

    for (label, value) in ["roll", "name", "class"].iter().zip(&fields) {
        if value.trim().is_empty() {
            return Err(parse_error(format!("{label} is empty")));
        }
    }

    let marks = scheme
        .subjects()
        .iter()
        .zip(&fields[IDENTITY_FIELDS..expected])
        .map(|(subject, raw)| {
            raw.trim()
                .parse::<u32>()
                .ok()
                .filter(|mark| scheme.accepts(*mark))
                .ok_or_else(|| parse_error(format!("invalid mark '{raw}' for {subject}")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(StudentRecord::new(
        NewStudent {
            roll: fields[0].trim().to_string(),
            name: fields[1].trim().to_string(),
            class: fields[2].trim().to_string(),
            marks,
        },
        scheme,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(roll: &str, marks: Vec<u32>) -> StudentRecord {
        StudentRecord::new(
            NewStudent {
                roll: roll.to_string(),
                name: "Alice".to_string(),
                class: "10A".to_string(),
                marks,
            },
            &GradeScheme::default(),
        )
    }

    #[test]
    fn test_encode_line() {
        let line = encode_line(&record("101", vec![90, 70, 85]));
        assert_eq!(line, "101|Alice|10A|90|70|85|245|81.67|A");
    }

    #[test]
    fn test_encode_line_pads_average() {
        let line = encode_line(&record("102", vec![40, 70, 85]));
        assert_eq!(line, "102|Alice|10A|40|70|85|195|65.00|B");
    }

    #[test]
    fn test_decode_line() {
        let scheme = GradeScheme::default();
        let decoded = decode_line("101|Alice|10A|90|70|85|245|81.67|A", 1, &scheme).unwrap();

        assert_eq!(decoded, record("101", vec![90, 70, 85]));
    }

    #[test]
    fn test_decode_line_ignores_stale_derived_fields() {
        let scheme = GradeScheme::default();
        let decoded = decode_line("101|Alice|10A|90|70|85|0|0.00|F", 1, &scheme).unwrap();

        assert_eq!(decoded.total(), 245);
        assert_eq!(decoded.grade(), 'A');
    }

    #[test]
    fn test_decode_line_without_derived_fields() {
        let scheme = GradeScheme::default();
        let decoded = decode_line("7|Bob|9B|10|20|30", 3, &scheme).unwrap();

        assert_eq!(decoded.total(), 60);
        assert_eq!(decoded.grade(), 'F');
    }

    #[test]
    fn test_decode_line_too_few_fields() {
        let scheme = GradeScheme::default();
        let err = decode_line("7|Bob|9B|10", 4, &scheme).unwrap_err();

        assert!(matches!(err, Error::Parse { line: 4, .. }));
        assert!(err.to_string().contains("expected at least 6 fields, found 4"));
    }

    #[test]
    fn test_decode_line_bad_mark() {
        let scheme = GradeScheme::default();

        let err = decode_line("7|Bob|9B|10|abc|30", 2, &scheme).unwrap_err();
        assert!(err.to_string().contains("'abc' for Physics"));

        assert!(decode_line("7|Bob|9B|10|20|130", 2, &scheme).is_err());
    }

    #[test]
    fn test_decode_line_blank_roll() {
        let scheme = GradeScheme::default();
        let err = decode_line(" |Bob|9B|10|20|30", 5, &scheme).unwrap_err();
        assert!(err.to_string().contains("roll is empty"));
    }

    #[test]
    fn test_decode_line_trims_line_ending() {
        let scheme = GradeScheme::default();
        let decoded = decode_line("7|Bob|9B|10|20|30|60|20.00|F\r\n", 1, &scheme).unwrap();
        assert_eq!(decoded.grade(), 'F');
    }
}
