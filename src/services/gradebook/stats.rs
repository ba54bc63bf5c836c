use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::BTreeMap;

use super::GradebookService;
use super::recalculate::settle_expired_attempts;
use crate::models::{
    ApiResponse,
    gradebook::{
        entities::{Grade, GradeStatus},
        responses::{CountEntry, GradebookStatsResponse},
    },
};
use crate::services::permissions::{current_user, require_course_staff};
use crate::services::{internal_error, round2};

/// 只统计仍在课程中的学生
pub fn summarize(course_id: i64, student_ids: &[i64], grades: &[Grade]) -> GradebookStatsResponse {
    let relevant: Vec<&Grade> = grades
        .iter()
        .filter(|g| student_ids.contains(&g.student_id))
        .collect();

    let currents: Vec<f64> = relevant.iter().filter_map(|g| g.current_grade).collect();
    let average_grade = if currents.is_empty() {
        None
    } else {
        Some(round2(currents.iter().sum::<f64>() / currents.len() as f64))
    };

    let mut letters: BTreeMap<String, u64> = BTreeMap::new();
    for letter in relevant.iter().filter_map(|g| g.letter_grade.clone()) {
        *letters.entry(letter).or_default() += 1;
    }

    // 没有成绩记录的学生计为 incomplete
    let missing = student_ids.len().saturating_sub(relevant.len()) as u64;
    let status_distribution = [
        GradeStatus::Passing,
        GradeStatus::AtRisk,
        GradeStatus::Failing,
        GradeStatus::Incomplete,
    ]
    .into_iter()
    .map(|status| {
        let mut count = relevant.iter().filter(|g| g.status == status).count() as u64;
        if status == GradeStatus::Incomplete {
            count += missing;
        }
        CountEntry {
            key: status.to_string(),
            count,
        }
    })
    .collect();

    GradebookStatsResponse {
        course_id,
        student_count: student_ids.len() as u64,
        graded_count: currents.len() as u64,
        average_grade,
        letter_distribution: letters
            .into_iter()
            .map(|(key, count)| CountEntry { key, count })
            .collect(),
        status_distribution,
    }
}

pub async fn get_gradebook_stats(
    service: &GradebookService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (course, _) = match require_course_staff(&storage, &user, course_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if let Err(e) = settle_expired_attempts(&storage, &course, None).await {
        return Ok(internal_error("Failed to finalize expired quiz attempts", e));
    }

    let students = match storage.list_course_students(course_id).await {
        Ok(s) => s,
        Err(e) => return Ok(internal_error("Failed to list students", e)),
    };
    let grades = match storage.list_course_grades(course_id).await {
        Ok(g) => g,
        Err(e) => return Ok(internal_error("Failed to list grades", e)),
    };
    let student_ids: Vec<i64> = students.iter().map(|s| s.user_id).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        summarize(course_id, &student_ids, &grades),
        "Success",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(student_id: i64, current: Option<f64>, letter: Option<&str>, status: GradeStatus) -> Grade {
        Grade {
            id: student_id,
            course_id: 1,
            student_id,
            items: vec![],
            total_earned: 0.0,
            total_possible: 0.0,
            current_grade: current,
            letter_grade: letter.map(str::to_string),
            status,
            calculated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_summarize_distribution() {
        let grades = vec![
            grade(1, Some(92.0), Some("A"), GradeStatus::Passing),
            grade(2, Some(55.0), Some("F"), GradeStatus::AtRisk),
            grade(3, Some(91.0), Some("A"), GradeStatus::Passing),
            // 已退课学生不计入
            grade(9, Some(10.0), Some("F"), GradeStatus::Failing),
        ];
        let stats = summarize(1, &[1, 2, 3, 4], &grades);

        assert_eq!(stats.student_count, 4);
        assert_eq!(stats.graded_count, 3);
        assert_eq!(stats.average_grade, Some(79.33));
        assert_eq!(
            stats.letter_distribution,
            vec![
                CountEntry { key: "A".into(), count: 2 },
                CountEntry { key: "F".into(), count: 1 },
            ]
        );
        let incomplete = stats
            .status_distribution
            .iter()
            .find(|e| e.key == "incomplete")
            .unwrap();
        assert_eq!(incomplete.count, 1);
    }

    #[test]
    fn test_summarize_empty_course() {
        let stats = summarize(1, &[], &[]);
        assert_eq!(stats.average_grade, None);
        assert!(stats.letter_distribution.is_empty());
    }
}
