//! `gradebook` - student records with derived grades
//!
//! This library provides the record model, grade calculation, flat-file
//! storage and console front end for keeping per-subject marks of students.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod grading;
pub mod input;
pub mod logging;
pub mod menu;
pub mod record;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use grading::{GradeScheme, Summary};
pub use logging::init_logging;
pub use menu::Menu;
pub use record::{NewStudent, StudentRecord};
pub use storage::Store;
