//! Storage layer for gradebook.
//!
//! The [`Store`] owns every student record in memory and persists the whole
//! list to a flat text file after each change. The file is read once when the
//! store is opened and rewritten wholesale on every save; a single process is
//! assumed to own the file for the lifetime of the store.

pub mod format;

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::grading::GradeScheme;
use crate::input::{check_mark, parse_text};
use crate::record::{normalize_roll, NewStudent, StudentRecord};

use self::format::{decode_line, encode_line};

/// Records read from the data file along with the lines that were skipped.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Successfully parsed records, in file order.
    pub records: Vec<StudentRecord>,
    /// One error per skipped line.
    pub skipped: Vec<Error>,
}

/// Student record store backed by a flat file.
#[derive(Debug)]
pub struct Store {
    /// Path to the data file.
    path: PathBuf,
    /// Subjects and grading rules shared by all records.
    scheme: GradeScheme,
    /// Records in insertion order.
    records: Vec<StudentRecord>,
}

impl Store {
    /// Create an empty store that will save to `path`.
    ///
    /// Nothing is read or written until the first mutation or [`Store::save`].
    #[must_use]
    pub fn new(path: impl AsRef<Path>, scheme: GradeScheme) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            scheme,
            records: Vec::new(),
        }
    }

    /// Open the store at `path`, loading any existing records.
    ///
    /// Returns the store together with the errors for lines that were skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`] if the data file exists but cannot be read.
    pub fn open(path: impl AsRef<Path>, scheme: GradeScheme) -> Result<(Self, Vec<Error>)> {
        let mut store = Self::new(path, scheme);
        let report = Self::load(&store.path, &store.scheme)?;
        store.records = report.records;
        info!(
            "Loaded {} records from {}",
            store.records.len(),
            store.path.display()
        );
        Ok((store, report.skipped))
    }

    /// Open the store at `path`, starting empty if the file cannot be read.
    ///
    /// A read failure is returned alongside any skipped-line errors instead of
    /// aborting.
    #[must_use]
    pub fn open_or_empty(path: impl AsRef<Path>, scheme: GradeScheme) -> (Self, Vec<Error>) {
        let path = path.as_ref();
        match Self::open(path, scheme.clone()) {
            Ok(opened) => opened,
            Err(err) => {
                error!("Could not load {}: {}", path.display(), err);
                (Self::new(path, scheme), vec![err])
            }
        }
    }

    /// Read and parse the data file.
    ///
    /// A missing file yields an empty report. Lines that fail to parse, and
    /// lines repeating an earlier roll number, are skipped and reported.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`] if the file exists but cannot be read.
    pub fn load(path: &Path, scheme: &GradeScheme) -> Result<LoadReport> {
        if !path.exists() {
            debug!("No data file at {}, starting empty", path.display());
            return Ok(LoadReport::default());
        }

        let bytes = fs::read(path).map_err(|source| Error::Persistence {
            operation: "read",
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes);
        let replaced = matches!(text, Cow::Owned(_));

        let mut report = LoadReport::default();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let line_no = index + 1;
            if replaced && line.contains(char::REPLACEMENT_CHARACTER) {
                warn!(
                    "Invalid UTF-8 on line {} of {} was replaced and will be saved that way",
                    line_no,
                    path.display()
                );
            }
            let outcome = decode_line(line, line_no, scheme).and_then(|record| {
                if report.records.iter().any(|r| r.has_roll(record.roll())) {
                    Err(Error::Parse {
                        line: line_no,
                        message: format!("duplicate roll number {}", record.roll()),
                    })
                } else {
                    Ok(record)
                }
            });
            match outcome {
                Ok(record) => report.records.push(record),
                Err(err) => {
                    warn!("Skipping line in {}: {}", path.display(), err);
                    report.skipped.push(err);
                }
            }
        }

        debug!(
            "Parsed {} records, skipped {} lines",
            report.records.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Recompute derived fields and rewrite the data file.
    ///
    /// The file is written to a sibling temporary file first and then renamed
    /// over the original. Parent directories are created if missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectoryCreate`] or [`Error::Persistence`]. The
    /// in-memory records are left as they are.
    pub fn save(&mut self) -> Result<()> {
        for record in &mut self.records {
            record.recompute(&self.scheme);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let mut contents = String::new();
        for record in &self.records {
            contents.push_str(&encode_line(record));
            contents.push('\n');
        }

        let tmp = temp_path(&self.path);
        let written = fs::write(&tmp, contents).and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(source) = written {
            let _ = fs::remove_file(&tmp);
            error!("Failed to save {}: {}", self.path.display(), source);
            return Err(Error::Persistence {
                operation: "write",
                path: self.path.clone(),
                source,
            });
        }

        info!(
            "Saved {} records to {}",
            self.records.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Get the path to the data file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the grading scheme.
    #[must_use]
    pub fn scheme(&self) -> &GradeScheme {
        &self.scheme
    }

    /// Index of the record with `roll`, if any.
    fn position(&self, roll: &str) -> Option<usize> {
        self.records.iter().position(|r| r.has_roll(roll))
    }

    /// Check whether a roll number is already taken.
    #[must_use]
    pub fn contains(&self, roll: &str) -> bool {
        self.position(roll).is_some()
    }

    /// Register a new student and save.
    ///
    /// # Errors
    ///
    /// Returns an input error if a field or mark is invalid,
    /// [`Error::DuplicateRoll`] if the roll number is taken (the store is left
    /// unchanged in both cases), or a persistence error if saving fails, in
    /// which case the record stays in memory.
    pub fn add(&mut self, student: NewStudent) -> Result<&StudentRecord> {
        let student = self.validate_new(student)?;
        if self.contains(&student.roll) {
            return Err(Error::duplicate_roll(student.roll));
        }

        let index = self.records.len();
        self.records.push(StudentRecord::new(student, &self.scheme));
        info!("Added student {}", self.records[index].roll());

        self.save()?;
        Ok(&self.records[index])
    }

    /// Replace the marks given in `updates` (one slot per subject, `None`
    /// keeps the current mark), recompute, and save.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`], [`Error::MarkCount`] or
    /// [`Error::InvalidMark`] without touching the record, or a persistence
    /// error if saving fails, in which case the new marks stay in memory.
    pub fn update_marks(&mut self, roll: &str, updates: &[Option<u32>]) -> Result<&StudentRecord> {
        let index = self
            .position(roll)
            .ok_or_else(|| Error::not_found(normalize_roll(roll)))?;

        if updates.len() != self.scheme.subject_count() {
            return Err(Error::MarkCount {
                expected: self.scheme.subject_count(),
                actual: updates.len(),
            });
        }
        for (subject, update) in self.scheme.subjects().iter().zip(updates) {
            if let Some(mark) = update {
                check_mark(subject, *mark, self.scheme.max_marks())?;
            }
        }

        self.records[index].apply_marks(updates, &self.scheme);
        info!(
            "Updated marks for {} (grade {})",
            self.records[index].roll(),
            self.records[index].grade()
        );

        self.save()?;
        Ok(&self.records[index])
    }

    /// Remove the record with `roll` and save.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record matches, or a persistence
    /// error if saving fails, in which case the record is already gone from
    /// memory.
    pub fn delete(&mut self, roll: &str) -> Result<StudentRecord> {
        let index = self
            .position(roll)
            .ok_or_else(|| Error::not_found(normalize_roll(roll)))?;

        let removed = self.records.remove(index);
        info!("Deleted student {}", removed.roll());

        self.save()?;
        Ok(removed)
    }

    /// Look up a record by roll number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record matches.
    pub fn search(&self, roll: &str) -> Result<&StudentRecord> {
        self.position(roll)
            .map(|index| &self.records[index])
            .ok_or_else(|| Error::not_found(normalize_roll(roll)))
    }

    /// All records in insertion order.
    #[must_use]
    pub fn list_all(&self) -> &[StudentRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn validate_new(&self, student: NewStudent) -> Result<NewStudent> {
        let roll = parse_text("roll number", &student.roll)?;
        let name = parse_text("name", &student.name)?;
        let class = parse_text("class", &student.class)?;

        if student.marks.len() != self.scheme.subject_count() {
            return Err(Error::MarkCount {
                expected: self.scheme.subject_count(),
                actual: student.marks.len(),
            });
        }
        for (subject, mark) in self.scheme.subjects().iter().zip(&student.marks) {
            check_mark(subject, *mark, self.scheme.max_marks())?;
        }

        Ok(NewStudent {
            roll,
            name,
            class,
            marks: student.marks,
        })
    }
}

/// Sibling path used while rewriting the data file.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
