//! Student results and grade computation.

use std::collections::BTreeMap;

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::error::ApiError;
use crate::models::student_result::{NewStudentResult, StudentResult};
use crate::schema::student_results;

/// Lower bound of the mean for each grade, best first.
const GRADE_BANDS: &[(f64, &str)] = &[
    (80.0, "A"),
    (75.0, "A-"),
    (70.0, "B+"),
    (65.0, "B"),
    (60.0, "B-"),
    (55.0, "C+"),
    (50.0, "C"),
    (45.0, "C-"),
    (40.0, "D+"),
    (35.0, "D"),
    (30.0, "D-"),
];

pub const MAX_SCORE: i32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSummary {
    pub total: i32,
    pub mean: f64,
    pub grade: &'static str,
}

pub fn grade_for_mean(mean: f64) -> &'static str {
    GRADE_BANDS
        .iter()
        .find(|(floor, _)| mean >= *floor)
        .map(|(_, grade)| *grade)
        .unwrap_or("E")
}

/// Total, mean (2 dp) and grade for a subject → score map.
pub fn summarize_scores(scores: &BTreeMap<String, i32>) -> Result<ScoreSummary, ApiError> {
    if scores.is_empty() {
        return Err(ApiError::validation("at least one subject score is required"));
    }
    for (subject, score) in scores {
        if subject.trim().is_empty() {
            return Err(ApiError::validation("subject names must not be blank"));
        }
        if !(0..=MAX_SCORE).contains(score) {
            return Err(ApiError::validation(format!(
                "score for {subject} must be between 0 and {MAX_SCORE}"
            )));
        }
    }
    let total: i32 = scores.values().sum();
    let mean = (f64::from(total) / scores.len() as f64 * 100.0).round() / 100.0;
    Ok(ScoreSummary {
        total,
        mean,
        grade: grade_for_mean(mean),
    })
}

pub async fn create_result(
    conn: &mut AsyncPgConnection,
    new_result: NewStudentResult,
) -> anyhow::Result<StudentResult> {
    let result = diesel::insert_into(student_results::table)
        .values(&new_result)
        .get_result::<StudentResult>(conn)
        .await?;
    tracing::info!(
        result_id = result.id,
        admission_number = %result.admission_number,
        grade = %result.grade,
        "Student result recorded"
    );
    Ok(result)
}

/// All results of one student, newest year first.
pub async fn list_for_student(
    conn: &mut AsyncPgConnection,
    admission_number: &str,
) -> anyhow::Result<Vec<StudentResult>> {
    let results = student_results::table
        .filter(student_results::admission_number.eq(admission_number))
        .order((student_results::year.desc(), student_results::term.desc()))
        .load::<StudentResult>(conn)
        .await?;
    Ok(results)
}

pub async fn delete_result(conn: &mut AsyncPgConnection, result_id: i64) -> anyhow::Result<bool> {
    let deleted = diesel::delete(student_results::table.find(result_id))
        .execute(conn)
        .await?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, i32)]) -> BTreeMap<String, i32> {
        pairs.iter().map(|(s, v)| (s.to_string(), *v)).collect()
    }

    #[test]
    fn grade_bands() {
        assert_eq!(grade_for_mean(100.0), "A");
        assert_eq!(grade_for_mean(80.0), "A");
        assert_eq!(grade_for_mean(79.99), "A-");
        assert_eq!(grade_for_mean(70.0), "B+");
        assert_eq!(grade_for_mean(50.0), "C");
        assert_eq!(grade_for_mean(30.0), "D-");
        assert_eq!(grade_for_mean(29.99), "E");
        assert_eq!(grade_for_mean(0.0), "E");
    }

    #[test]
    fn summary_rounds_mean() {
        let summary = summarize_scores(&scores(&[("maths", 81), ("english", 70), ("biology", 66)])).unwrap();
        assert_eq!(summary.total, 217);
        assert_eq!(summary.mean, 72.33);
        assert_eq!(summary.grade, "B+");
    }

    #[test]
    fn summary_validation() {
        assert!(summarize_scores(&BTreeMap::new()).is_err());
        assert!(summarize_scores(&scores(&[("maths", 101)])).is_err());
        assert!(summarize_scores(&scores(&[("maths", -1)])).is_err());
        assert!(summarize_scores(&scores(&[(" ", 50)])).is_err());
    }
}
