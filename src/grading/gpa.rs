//! Credit-weighted GPA statistics and the "what-if" projection.

use crate::grading::scale::percentage_floor_for;
use crate::transcript::CourseRecord;

/// GPA of the courses taken in one term.
#[derive(Clone, Debug, PartialEq)]
pub struct TermGpa {
    pub term: String,
    pub gpa: f64,
    pub credits: f64,
}

/// Cumulative statistics over a record list.
///
/// Only valid records whose percentage maps to a grade point and whose credits are
/// positive contribute. Every average is weighted by credits.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GpaSummary {
    pub gpa: Option<f64>,
    pub average_percentage: Option<f64>,
    pub total_credits: f64,
    /// Sum of grade point times credits
    pub total_points: f64,
    /// Per-term GPAs in the order the terms first appear
    pub terms: Vec<TermGpa>,
}

/// Running sums for one group of courses.
#[derive(Default)]
struct Accumulator {
    credits: f64,
    points: f64,
    weighted_percentage: f64,
}

impl Accumulator {
    fn add(&mut self, percentage: f64, grade_point: f64, credits: f64) {
        self.credits += credits;
        self.points += grade_point * credits;
        self.weighted_percentage += percentage * credits;
    }

    fn gpa(&self) -> Option<f64> {
        (self.credits > 0.0).then(|| self.points / self.credits)
    }
}

impl GpaSummary {
    pub fn from_records(records: &[CourseRecord]) -> Self {
        let mut total = Accumulator::default();
        let mut terms: Vec<(String, Accumulator)> = Vec::new();

        for record in records.iter().filter(|record| record.is_valid) {
            let (Some(percentage), Some(grade_point), Some(credits)) =
                (record.percentage_value(), record.grade_point(), record.credits_value())
            else {
                continue;
            };
            if credits <= 0.0 {
                continue;
            }
            total.add(percentage, grade_point, credits);
            match terms.iter_mut().find(|(term, _)| *term == record.term) {
                Some((_, accumulator)) => accumulator.add(percentage, grade_point, credits),
                None => {
                    let mut accumulator = Accumulator::default();
                    accumulator.add(percentage, grade_point, credits);
                    terms.push((record.term.clone(), accumulator));
                }
            }
        }

        Self {
            gpa: total.gpa(),
            average_percentage: (total.credits > 0.0).then(|| total.weighted_percentage / total.credits),
            total_credits: total.credits,
            total_points: total.points,
            terms: terms
                .into_iter()
                .filter_map(|(term, accumulator)| {
                    accumulator.gpa().map(|gpa| TermGpa { term, gpa, credits: accumulator.credits })
                })
                .collect(),
        }
    }

    pub fn term_gpa(&self, term: &str) -> Option<f64> {
        self.terms.iter().find(|entry| entry.term == term).map(|entry| entry.gpa)
    }
}

/// Whether a target GPA can still be reached with the additional credits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outlook {
    Reachable,
    /// Would need more than 4.0 on every additional credit
    Unreachable,
    /// Already met even with 0.0 on every additional credit
    Secured,
}

/// Projection of the average needed on future credits.
#[derive(Clone, Debug, PartialEq)]
pub struct WhatIf {
    pub target_gpa: f64,
    pub additional_credits: f64,
    pub required_grade_point: f64,
    /// Band floor for the required point; absent when the point is not in the grade table.
    pub required_percentage: Option<u8>,
    pub outlook: Outlook,
}

/// Grade point needed on `additional_credits` more credits to bring the cumulative GPA to
/// `target_gpa`.
///
/// Returns `None` when `additional_credits` is not positive or an input is not finite.
pub fn what_if(summary: &GpaSummary, target_gpa: f64, additional_credits: f64) -> Option<WhatIf> {
    if !target_gpa.is_finite() || !additional_credits.is_finite() || additional_credits <= 0.0 {
        return None;
    }
    let required = (target_gpa * (summary.total_credits + additional_credits) - summary.total_points)
        / additional_credits;
    let outlook = if required > 4.0 {
        Outlook::Unreachable
    } else if required <= 0.0 {
        Outlook::Secured
    } else {
        Outlook::Reachable
    };
    Some(WhatIf {
        target_gpa,
        additional_credits,
        required_grade_point: required,
        required_percentage: percentage_floor_for(required),
        outlook,
    })
}
