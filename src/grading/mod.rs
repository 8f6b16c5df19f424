//! # Grading Module
//!
//! The percentage grade table and the statistics derived from it.

pub mod gpa;
pub mod scale;

pub use gpa::what_if;
pub use gpa::GpaSummary;
pub use gpa::Outlook;
pub use gpa::TermGpa;
pub use gpa::WhatIf;
pub use scale::grade_point_for;
pub use scale::letter_for;
pub use scale::percentage_floor_for;
pub use scale::GradeScaleEntry;
pub use scale::GRADE_SCALE;
