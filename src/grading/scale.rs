//! Percentage to grade point conversion on the 4.0 scale.

/// One row of the grade table. Bounds are inclusive whole percentages.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradeScaleEntry {
    pub min: u8,
    pub max: u8,
    pub grade_point: f64,
    pub letter: &'static str,
}

/// The grade table, highest band first. The bands partition 0..=100.
pub const GRADE_SCALE: [GradeScaleEntry; 13] = [
    GradeScaleEntry {
        min: 90,
        max: 100,
        grade_point: 4.0,
        letter: "A+",
    },
    GradeScaleEntry {
        min: 85,
        max: 89,
        grade_point: 3.9,
        letter: "A",
    },
    GradeScaleEntry {
        min: 80,
        max: 84,
        grade_point: 3.7,
        letter: "A-",
    },
    GradeScaleEntry {
        min: 77,
        max: 79,
        grade_point: 3.3,
        letter: "B+",
    },
    GradeScaleEntry {
        min: 73,
        max: 76,
        grade_point: 3.0,
        letter: "B",
    },
    GradeScaleEntry {
        min: 70,
        max: 72,
        grade_point: 2.7,
        letter: "B-",
    },
    GradeScaleEntry {
        min: 67,
        max: 69,
        grade_point: 2.3,
        letter: "C+",
    },
    GradeScaleEntry {
        min: 63,
        max: 66,
        grade_point: 2.0,
        letter: "C",
    },
    GradeScaleEntry {
        min: 60,
        max: 62,
        grade_point: 1.7,
        letter: "C-",
    },
    GradeScaleEntry {
        min: 57,
        max: 59,
        grade_point: 1.3,
        letter: "D+",
    },
    GradeScaleEntry {
        min: 53,
        max: 56,
        grade_point: 1.0,
        letter: "D",
    },
    GradeScaleEntry {
        min: 50,
        max: 52,
        grade_point: 0.7,
        letter: "D-",
    },
    GradeScaleEntry {
        min: 0,
        max: 49,
        grade_point: 0.0,
        letter: "F",
    },
];

/// Finds the band containing `percentage`.
/// Fractional percentages are truncated, so 89.9 falls in the 85-89 band.
pub fn entry_for(percentage: f64) -> Option<&'static GradeScaleEntry> {
    if !percentage.is_finite() || !(0.0..=100.0).contains(&percentage) {
        return None;
    }
    let whole = percentage.trunc();
    GRADE_SCALE
        .iter()
        .find(|entry| f64::from(entry.min) <= whole && whole <= f64::from(entry.max))
}

pub fn grade_point_for(percentage: f64) -> Option<f64> {
    entry_for(percentage).map(|entry| entry.grade_point)
}

pub fn letter_for(percentage: f64) -> Option<&'static str> {
    entry_for(percentage).map(|entry| entry.letter)
}

/// Lowest percentage of the band whose grade point equals `grade_point` rounded to one decimal.
///
/// Only points present in the table have an answer: 3.5 sits between B+ (3.3) and
/// A- (3.7) and yields `None`.
pub fn percentage_floor_for(grade_point: f64) -> Option<u8> {
    if !grade_point.is_finite() {
        return None;
    }
    let tenths = (grade_point * 10.0).round();
    GRADE_SCALE
        .iter()
        .find(|entry| (entry.grade_point * 10.0).round() == tenths)
        .map(|entry| entry.min)
}
