use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashSet;

use super::{AssignmentService, load_assignment};
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::responses::{AssignmentStatsResponse, ScoreStats},
    submissions::entities::{Submission, SubmissionStatus},
};
use crate::services::permissions::current_user;
use crate::services::submissions::lifecycle::latest_per_student;
use crate::services::{forbidden, internal_error, load_user_summaries, round2};

/// 作业统计；只计当前在课学生，每人取最新一次提交。返回统计与未提交学生 ID
pub fn compute_assignment_stats(
    assignment_id: i64,
    student_ids: &[i64],
    submissions: &[Submission],
) -> (AssignmentStatsResponse, Vec<i64>) {
    let enrolled: HashSet<i64> = student_ids.iter().copied().collect();
    let relevant: Vec<Submission> = submissions
        .iter()
        .filter(|s| s.assignment_id == assignment_id && enrolled.contains(&s.student_id))
        .cloned()
        .collect();
    let latest = latest_per_student(&relevant);

    let graded: Vec<f64> = latest
        .values()
        .filter(|s| s.status == SubmissionStatus::Graded)
        .filter_map(|s| s.grade)
        .collect();

    let score_stats = if graded.is_empty() {
        None
    } else {
        let sum: f64 = graded.iter().sum();
        Some(ScoreStats {
            average: round2(sum / graded.len() as f64),
            highest: graded.iter().copied().fold(f64::MIN, f64::max),
            lowest: graded.iter().copied().fold(f64::MAX, f64::min),
        })
    };

    let total_students = enrolled.len() as u64;
    let submitted_count = latest.len() as u64;
    let submission_rate = if total_students == 0 {
        0.0
    } else {
        round2(submitted_count as f64 / total_students as f64 * 100.0)
    };

    let mut unsubmitted: Vec<i64> = enrolled
        .iter()
        .copied()
        .filter(|id| !latest.contains_key(id))
        .collect();
    unsubmitted.sort_unstable();

    let stats = AssignmentStatsResponse {
        assignment_id,
        total_students,
        submitted_count,
        graded_count: graded.len() as u64,
        late_count: latest.values().filter(|s| s.is_late).count() as u64,
        submission_rate,
        score_stats,
        unsubmitted_students: Vec::new(),
    };
    (stats, unsubmitted)
}

pub async fn get_assignment_stats(
    service: &AssignmentService,
    assignment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;
    let (_, course, access) = match load_assignment(&storage, &user, assignment_id).await {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    if !access.is_staff() {
        return Ok(forbidden(
            ErrorCode::CoursePermissionDenied,
            "Only course staff can view statistics",
        ));
    }

    let students = match storage.list_course_students(course.id).await {
        Ok(students) => students,
        Err(e) => return Ok(internal_error("Failed to load assignment statistics", e)),
    };
    let submissions = match storage
        .list_submissions_by_assignments(&[assignment_id], None)
        .await
    {
        Ok(submissions) => submissions,
        Err(e) => return Ok(internal_error("Failed to load assignment statistics", e)),
    };

    let student_ids: Vec<i64> = students.iter().map(|s| s.user_id).collect();
    let (mut stats, unsubmitted) =
        compute_assignment_stats(assignment_id, &student_ids, &submissions);

    let users = match load_user_summaries(&storage, &unsubmitted).await {
        Ok(users) => users,
        Err(e) => return Ok(internal_error("Failed to load assignment statistics", e)),
    };
    stats.unsubmitted_students = unsubmitted
        .iter()
        .filter_map(|id| users.get(id).cloned())
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(stats, "Success")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn submission(
        student_id: i64,
        attempt_number: i32,
        status: SubmissionStatus,
        grade: Option<f64>,
        is_late: bool,
    ) -> Submission {
        Submission {
            id: student_id * 100 + attempt_number as i64,
            assignment_id: 7,
            student_id,
            attempt_number,
            content: "text".to_string(),
            status,
            is_late,
            grade,
            feedback: None,
            graded_by: None,
            graded_at: None,
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn test_stats_use_latest_submission() {
        let submissions = vec![
            submission(1, 1, SubmissionStatus::Graded, Some(40.0), false),
            submission(1, 2, SubmissionStatus::Graded, Some(90.0), true),
            submission(2, 1, SubmissionStatus::Graded, Some(70.0), false),
            submission(3, 1, SubmissionStatus::Submitted, None, false),
        ];
        let (stats, unsubmitted) = compute_assignment_stats(7, &[1, 2, 3, 4], &submissions);

        assert_eq!(stats.total_students, 4);
        assert_eq!(stats.submitted_count, 3);
        assert_eq!(stats.graded_count, 2);
        assert_eq!(stats.late_count, 1);
        assert_eq!(stats.submission_rate, 75.0);
        assert_eq!(
            stats.score_stats,
            Some(ScoreStats {
                average: 80.0,
                highest: 90.0,
                lowest: 70.0,
            })
        );
        assert_eq!(unsubmitted, vec![4]);
    }

    #[test]
    fn test_stats_ignore_students_who_left() {
        let submissions = vec![submission(9, 1, SubmissionStatus::Graded, Some(50.0), false)];
        let (stats, unsubmitted) = compute_assignment_stats(7, &[1], &submissions);
        assert_eq!(stats.submitted_count, 0);
        assert!(stats.score_stats.is_none());
        assert_eq!(unsubmitted, vec![1]);
    }

    #[test]
    fn test_stats_without_students() {
        let (stats, _) = compute_assignment_stats(7, &[], &[]);
        assert_eq!(stats.submission_rate, 0.0);
    }
}
