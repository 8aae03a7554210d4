//! Console rendering of student records.

use std::io::Write;

use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::grading::GradeScheme;
use crate::record::StudentRecord;

/// Width of the detail card rules.
const CARD_WIDTH: usize = 45;

/// Write the detail card for one record.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_record(
    out: &mut impl Write,
    record: &StudentRecord,
    scheme: &GradeScheme,
) -> Result<()> {
    let heavy = "=".repeat(CARD_WIDTH);
    let light = "-".repeat(CARD_WIDTH);

    writeln!(out)?;
    writeln!(out, "{heavy}")?;
    writeln!(out, "  Student: {}", record.name())?;
    writeln!(out, "{heavy}")?;
    writeln!(out, "  Roll Number: {}", record.roll())?;
    writeln!(out, "  Class: {}", record.class())?;
    writeln!(out, "{light}")?;
    for (subject, mark) in scheme.subjects().iter().zip(record.marks()) {
        writeln!(out, "  {subject:<10} Marks: {mark}")?;
    }
    writeln!(out, "{light}")?;
    writeln!(out, "  Total Marks: {}/{}", record.total(), scheme.max_total())?;
    if scheme.max_marks() == 100 {
        writeln!(out, "  Average Score: {:.2}%", record.average())?;
    } else {
        writeln!(
            out,
            "  Average Score: {:.2}/{}",
            record.average(),
            scheme.max_marks()
        )?;
    }
    writeln!(out, "  Final Grade: {}", record.grade())?;
    writeln!(out, "{heavy}")?;
    writeln!(out)?;
    Ok(())
}

/// Write all records as a table, or a notice when there are none.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_table(
    out: &mut impl Write,
    records: &[StudentRecord],
    scheme: &GradeScheme,
) -> Result<()> {
    if records.is_empty() {
        writeln!(out)?;
        writeln!(
            out,
            "[INFO] No student records found. Please add a student first."
        )?;
        writeln!(out)?;
        return Ok(());
    }

    let rows: Vec<Vec<String>> = records.iter().map(table_row).collect();

    let mut headers = vec!["Roll".to_string(), "Name".to_string(), "Class".to_string()];
    headers.extend(scheme.subjects().iter().cloned());
    headers.extend(["Total", "Average", "Grade"].map(String::from));

    let mut minimums = vec![6, 20, 6];
    minimums.extend(scheme.subjects().iter().map(|s| (s.len() + 2).max(7)));
    minimums.extend([8, 9, 6]);

    let widths: Vec<usize> = minimums
        .iter()
        .enumerate()
        .map(|(col, min)| {
            rows.iter()
                .map(|row| row[col].chars().count() + 1)
                .chain([headers[col].len() + 1, *min])
                .max()
                .unwrap_or(*min)
        })
        .collect();
    let rule = "=".repeat(widths.iter().sum::<usize>());

    writeln!(out)?;
    writeln!(out, "{rule}")?;
    write_cells(out, &headers, &widths)?;
    writeln!(out, "{rule}")?;
    for row in &rows {
        write_cells(out, row, &widths)?;
    }
    writeln!(out, "{rule}")?;
    writeln!(out)?;
    Ok(())
}

fn table_row(record: &StudentRecord) -> Vec<String> {
    let mut row = vec![
        record.roll().to_string(),
        record.name().to_string(),
        record.class().to_string(),
    ];
    row.extend(record.marks().iter().map(u32::to_string));
    row.push(record.total().to_string());
    row.push(format!("{:.2}", record.average()));
    row.push(record.grade().to_string());
    row
}

fn write_cells(out: &mut impl Write, cells: &[String], widths: &[usize]) -> Result<()> {
    let line: String = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    writeln!(out, "{}", line.trim_end())?;
    Ok(())
}

/// JSON view of a record with marks keyed by subject.
#[must_use]
pub fn record_json(record: &StudentRecord, scheme: &GradeScheme) -> Value {
    let marks: Map<String, Value> = scheme
        .subjects()
        .iter()
        .zip(record.marks())
        .map(|(subject, mark)| (subject.clone(), json!(mark)))
        .collect();

    json!({
        "roll": record.roll(),
        "name": record.name(),
        "class": record.class(),
        "marks": marks,
        "total": record.total(),
        "average": record.average(),
        "grade": record.grade().to_string(),
    })
}

/// JSON array of records.
#[must_use]
pub fn records_json(records: &[StudentRecord], scheme: &GradeScheme) -> Value {
    Value::Array(records.iter().map(|r| record_json(r, scheme)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NewStudent;

    fn record(roll: &str, name: &str, marks: Vec<u32>) -> StudentRecord {
        StudentRecord::new(
            NewStudent {
                roll: roll.to_string(),
                name: name.to_string(),
                class: "10A".to_string(),
                marks,
            },
            &GradeScheme::default(),
        )
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_write_record() {
        let scheme = GradeScheme::default();
        let alice = record("101", "Alice", vec![90, 70, 85]);
        let text = render(|out| write_record(out, &alice, &scheme));

        assert!(text.contains("Student: Alice"));
        assert!(text.contains("Roll Number: 101"));
        assert!(text.contains("Math       Marks: 90"));
        assert!(text.contains("Total Marks: 245/300"));
        assert!(text.contains("Average Score: 81.67%"));
        assert!(text.contains("Final Grade: A"));
    }

    #[test]
    fn test_write_table_empty() {
        let scheme = GradeScheme::default();
        let text = render(|out| write_table(out, &[], &scheme));

        assert!(text.contains("No student records found"));
    }

    #[test]
    fn test_write_table() {
        let scheme = GradeScheme::default();
        let records = vec![
            record("101", "Alice", vec![90, 70, 85]),
            record("102", "Bob", vec![40, 70, 85]),
        ];
        let text = render(|out| write_table(out, &records, &scheme));
        let lines: Vec<&str> = text.lines().collect();

        let header = lines.iter().find(|l| l.starts_with("Roll")).unwrap();
        assert!(header.contains("Physics"));
        assert!(header.ends_with("Grade"));

        let alice = lines.iter().find(|l| l.starts_with("101")).unwrap();
        assert!(alice.contains("Alice"));
        assert!(alice.contains("81.67"));
        assert!(alice.ends_with('A'));

        let bob = lines.iter().find(|l| l.starts_with("102")).unwrap();
        assert!(bob.contains("65.00"));
    }

    #[test]
    fn test_write_table_widens_long_names() {
        let scheme = GradeScheme::default();
        let long = "A Very Long Student Name Indeed";
        let records = vec![record("1", long, vec![1, 2, 3])];
        let text = render(|out| write_table(out, &records, &scheme));

        let row = text.lines().find(|l| l.starts_with('1')).unwrap();
        assert!(row.contains(&format!("{long} ")));
    }

    #[test]
    fn test_record_json() {
        let scheme = GradeScheme::default();
        let value = record_json(&record("101", "Alice", vec![90, 70, 85]), &scheme);

        assert_eq!(value["roll"], "101");
        assert_eq!(value["marks"]["Physics"], 70);
        assert_eq!(value["total"], 245);
        assert_eq!(value["grade"], "A");
    }

    #[test]
    fn test_records_json() {
        let scheme = GradeScheme::default();
        let records = vec![record("1", "A", vec![1, 2, 3]), record("2", "B", vec![4, 5, 6])];
        let value = records_json(&records, &scheme);

        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }
}
