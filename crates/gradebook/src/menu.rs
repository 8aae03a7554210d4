//! Interactive menu.
//!
//! Reads one line per prompt from any [`BufRead`] and writes to any
//! [`Write`], so the whole session can be driven from a script or a test.
//! Data errors are reported and the loop continues; only console I/O
//! failures end the session early. End of input is treated as Exit & Save.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::display::{write_record, write_table};
use crate::error::{Error, Result};
use crate::input::{parse_mark, parse_optional_mark, parse_text};
use crate::record::NewStudent;
use crate::storage::Store;

/// A main menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// Register a new student.
    Add,
    /// Update a student's marks.
    UpdateMarks,
    /// Show one student by roll number.
    Search,
    /// Show every student.
    DisplayAll,
    /// Delete a student.
    Delete,
    /// Save and leave.
    ExitAndSave,
}

impl MenuChoice {
    /// All entries in menu order.
    pub const ALL: [Self; 6] = [
        Self::Add,
        Self::UpdateMarks,
        Self::Search,
        Self::DisplayAll,
        Self::Delete,
        Self::ExitAndSave,
    ];

    /// Parse the operator's choice (`1` to `6`).
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let number: usize = input.trim().parse().ok()?;
        Self::ALL.get(number.checked_sub(1)?).copied()
    }

    /// Menu label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Add => "Add New Student",
            Self::UpdateMarks => "Update Student Marks",
            Self::Search => "Search Student by Roll Number",
            Self::DisplayAll => "Display All Student Records",
            Self::Delete => "Delete Student Record",
            Self::ExitAndSave => "Exit & Save",
        }
    }
}

/// Console session over a [`Store`].
#[derive(Debug)]
pub struct Menu<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    /// Create a menu reading from `input` and writing to `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the menu and return its output.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run the menu loop until Exit & Save or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading from or writing to the console fails.
    pub fn run(&mut self, store: &mut Store) -> Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "  Welcome to the Student Manager System")?;
        writeln!(self.output)?;

        loop {
            self.print_menu()?;
            let outcome = self
                .read_line(&format!("Enter your choice (1-{}): ", MenuChoice::ALL.len()))
                .and_then(|choice| self.dispatch(store, &choice));

            match outcome {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(Error::InputClosed) => {
                    debug!("Console input closed, saving and exiting");
                    writeln!(self.output)?;
                    self.save(store)?;
                    return Ok(());
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Handle one menu choice. Returns `false` when the session should end.
    fn dispatch(&mut self, store: &mut Store, choice: &str) -> Result<bool> {
        match MenuChoice::parse(choice) {
            Some(MenuChoice::Add) => self.add_student(store)?,
            Some(MenuChoice::UpdateMarks) => self.update_marks(store)?,
            Some(MenuChoice::Search) => self.search_student(store)?,
            Some(MenuChoice::DisplayAll) => {
                write_table(&mut self.output, store.list_all(), store.scheme())?;
            }
            Some(MenuChoice::Delete) => self.delete_student(store)?,
            Some(MenuChoice::ExitAndSave) => {
                self.save(store)?;
                return Ok(false);
            }
            None => {
                writeln!(
                    self.output,
                    "\nInvalid choice. Please enter a number between 1 and {}.",
                    MenuChoice::ALL.len()
                )?;
            }
        }
        Ok(true)
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.output, " Main Menu ")?;
        writeln!(self.output)?;
        for (number, choice) in MenuChoice::ALL.iter().enumerate() {
            writeln!(self.output, "{}. {}", number + 1, choice.label())?;
        }
        Ok(())
    }

    fn add_student(&mut self, store: &mut Store) -> Result<()> {
        writeln!(self.output, "\n--- Register New Student ---")?;

        let roll = loop {
            let roll = self.prompt_text("Roll Number (Must be unique)", "roll number")?;
            if !store.contains(&roll) {
                break roll;
            }
            writeln!(
                self.output,
                "   This Roll Number already exists. Please choose a unique one."
            )?;
        };
        let name = self.prompt_text("Name", "name")?;
        let class = self.prompt_text("Class", "class")?;

        let max = store.scheme().max_marks();
        let subjects = store.scheme().subjects().to_vec();
        let mut marks = Vec::with_capacity(subjects.len());
        for subject in &subjects {
            marks.push(self.prompt_mark(subject, max)?);
        }

        let added = format!("\nStudent '{name}' (Roll: {roll}) added successfully.\n");
        let result = store
            .add(NewStudent {
                roll,
                name,
                class,
                marks,
            })
            .map(|_| ());
        self.finish_mutation(store, result, &added)
    }

    fn update_marks(&mut self, store: &mut Store) -> Result<()> {
        writeln!(self.output, "\n--- Update Student Marks ---")?;
        let roll = self.prompt_text("Roll Number to update", "roll number")?;

        let current = match store.search(&roll) {
            Ok(record) => {
                writeln!(
                    self.output,
                    "   Found student: {} (Current Grade: {})",
                    record.name(),
                    record.grade()
                )?;
                record.marks().to_vec()
            }
            Err(err) => return self.report(err),
        };

        let max = store.scheme().max_marks();
        let subjects = store.scheme().subjects().to_vec();
        let mut updates = Vec::with_capacity(subjects.len());
        for (subject, mark) in subjects.iter().zip(current) {
            writeln!(self.output, "   Current marks for {subject}: {mark}")?;
            updates.push(self.prompt_optional_mark(subject, mark, max)?);
        }

        let result = store.update_marks(&roll, &updates).map(|_| ());
        // Read back after the call: the marks are applied even if saving failed
        let message = store
            .search(&roll)
            .map(|record| {
                format!(
                    "\n[SUCCESS] Marks updated for {}. New Grade: {}.\n",
                    record.name(),
                    record.grade()
                )
            })
            .unwrap_or_default();
        self.finish_mutation(store, result, &message)
    }

    fn search_student(&mut self, store: &Store) -> Result<()> {
        writeln!(self.output, "\n--- Search Student Record ---")?;
        let roll = self.prompt_text("Roll Number to search", "roll number")?;

        match store.search(&roll) {
            Ok(record) => write_record(&mut self.output, record, store.scheme()),
            Err(err) => self.report(err),
        }
    }

    fn delete_student(&mut self, store: &mut Store) -> Result<()> {
        writeln!(self.output, "\n--- Delete Student Record ---")?;
        let roll = self.prompt_text("Roll Number to delete", "roll number")?;

        let name = match store.search(&roll) {
            Ok(record) => record.name().to_string(),
            Err(err) => return self.report(err),
        };
        let message = format!("\nStudent '{name}' (Roll: {roll}) has been deleted.\n");
        let result = store.delete(&roll).map(|_| ());
        self.finish_mutation(store, result, &message)
    }

    /// Report the outcome of a mutating store call.
    ///
    /// A persistence failure still means the change was made in memory, so
    /// the success message is shown before the save error.
    fn finish_mutation(&mut self, store: &Store, result: Result<()>, done: &str) -> Result<()> {
        match result {
            Ok(()) => {
                writeln!(self.output, "{done}")?;
                self.saved(store)
            }
            Err(err) if err.is_persistence() => {
                writeln!(self.output, "{done}")?;
                writeln!(self.output, "[ERROR] Failed to save data: {err}\n")?;
                writeln!(
                    self.output,
                    "        Changes are kept in memory; choose Exit & Save to retry."
                )?;
                Ok(())
            }
            Err(err) => self.report(err),
        }
    }

    /// Print a data error, or pass console errors through.
    fn report(&mut self, err: Error) -> Result<()> {
        match err {
            Error::Io(_) | Error::InputClosed => Err(err),
            err => {
                writeln!(self.output, "   Error: {err}")?;
                Ok(())
            }
        }
    }

    fn save(&mut self, store: &mut Store) -> Result<()> {
        match store.save() {
            Ok(()) => self.saved(store),
            Err(err) => {
                writeln!(self.output, "\n[ERROR] Failed to save data: {err}\n")?;
                Ok(())
            }
        }
    }

    fn saved(&mut self, store: &Store) -> Result<()> {
        writeln!(
            self.output,
            "[INFO] Data successfully saved to {}\n",
            store.path().display()
        )?;
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line)? == 0 {
            return Err(Error::InputClosed);
        }
        Ok(String::from_utf8_lossy(&line).trim().to_string())
    }

    fn prompt_text(&mut self, label: &str, field: &'static str) -> Result<String> {
        loop {
            let raw = self.read_line(&format!("   Enter {label}: "))?;
            match parse_text(field, &raw) {
                Ok(value) => return Ok(value),
                Err(err) => self.reprompt(&err)?,
            }
        }
    }

    fn prompt_mark(&mut self, subject: &str, max: u32) -> Result<u32> {
        loop {
            let raw = self.read_line(&format!("   Enter Marks for {subject} (0-{max}): "))?;
            match parse_mark(subject, &raw, max) {
                Ok(mark) => return Ok(mark),
                Err(err) => self.reprompt(&err)?,
            }
        }
    }

    fn prompt_optional_mark(
        &mut self,
        subject: &str,
        current: u32,
        max: u32,
    ) -> Result<Option<u32>> {
        loop {
            let raw = self.read_line(&format!(
                "   Enter NEW marks for {subject} (or press Enter to keep {current}): "
            ))?;
            match parse_optional_mark(subject, &raw, max) {
                Ok(mark) => return Ok(mark),
                Err(err) => self.reprompt(&err)?,
            }
        }
    }

    fn reprompt(&mut self, err: &Error) -> Result<()> {
        match err {
            Error::EmptyField { .. } => writeln!(self.output, "   Input cannot be empty.")?,
            err => writeln!(self.output, "   {err}")?,
        }
        Ok(())
    }
}
