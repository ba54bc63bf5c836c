//! 提交状态流转与提交准入规则
//!
//! 状态机：submitted / resubmitted → graded | returned；graded → graded（重评）| returned。
//! returned 之后只能由学生重新提交，产生新的 resubmitted 记录。

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::models::{
    ErrorCode,
    assignments::entities::Assignment,
    submissions::entities::{Submission, SubmissionStatus},
};

pub fn can_transition(from: SubmissionStatus, to: SubmissionStatus) -> bool {
    use SubmissionStatus::*;
    matches!(
        (from, to),
        (Submitted | Resubmitted, Graded | Returned) | (Graded, Graded | Returned)
    )
}

/// 第一次提交为 submitted，之后均为 resubmitted
pub fn initial_status(attempt_number: i32) -> SubmissionStatus {
    if attempt_number <= 1 {
        SubmissionStatus::Submitted
    } else {
        SubmissionStatus::Resubmitted
    }
}

pub fn is_late(submitted_at: DateTime<Utc>, due_date: Option<DateTime<Utc>>) -> bool {
    due_date.is_some_and(|due| submitted_at > due)
}

/// 准入检查，通过时返回是否迟交
pub fn check_admission(
    assignment: &Assignment,
    previous_attempts: i32,
    now: DateTime<Utc>,
) -> Result<bool, (ErrorCode, String)> {
    if let Some(max) = assignment.max_attempts
        && previous_attempts >= max
    {
        return Err((
            ErrorCode::SubmissionAttemptsExceeded,
            format!("Maximum number of attempts ({max}) reached"),
        ));
    }

    let late = is_late(now, assignment.due_date);
    if late && !assignment.allow_late {
        return Err((
            ErrorCode::SubmissionLateNotAllowed,
            "The due date has passed and late submissions are not allowed".to_string(),
        ));
    }
    Ok(late)
}

/// 每个学生 attempt_number 最大的一条提交
pub fn latest_per_student(submissions: &[Submission]) -> HashMap<i64, &Submission> {
    let mut latest: HashMap<i64, &Submission> = HashMap::new();
    for submission in submissions {
        latest
            .entry(submission.student_id)
            .and_modify(|current| {
                if submission.attempt_number > current.attempt_number {
                    *current = submission;
                }
            })
            .or_insert(submission);
    }
    latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::entities::GradeCategory;
    use chrono::Duration;

    fn assignment(due_in_hours: Option<i64>, allow_late: bool, max_attempts: Option<i32>) -> Assignment {
        let now = Utc::now();
        Assignment {
            id: 1,
            course_id: 1,
            module_id: None,
            created_by: 1,
            title: "Essay".to_string(),
            description: None,
            max_grade: 100.0,
            due_date: due_in_hours.map(|h| now + Duration::hours(h)),
            allow_late,
            category: GradeCategory::Assignments,
            max_attempts,
            created_at: now,
            updated_at: now,
        }
    }

    fn submission(student_id: i64, attempt_number: i32) -> Submission {
        Submission {
            id: student_id * 10 + attempt_number as i64,
            assignment_id: 1,
            student_id,
            attempt_number,
            content: "answer".to_string(),
            status: initial_status(attempt_number),
            is_late: false,
            grade: None,
            feedback: None,
            graded_by: None,
            graded_at: None,
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn test_transitions() {
        use SubmissionStatus::*;
        assert!(can_transition(Submitted, Graded));
        assert!(can_transition(Resubmitted, Returned));
        assert!(can_transition(Graded, Graded));
        assert!(can_transition(Graded, Returned));
        assert!(!can_transition(Returned, Graded));
        assert!(!can_transition(Graded, Submitted));
        assert!(!can_transition(Submitted, Resubmitted));
    }

    #[test]
    fn test_initial_status() {
        assert_eq!(initial_status(1), SubmissionStatus::Submitted);
        assert_eq!(initial_status(2), SubmissionStatus::Resubmitted);
    }

    #[test]
    fn test_is_late_strictly_after_due() {
        let due = Utc::now();
        assert!(!is_late(due, Some(due)));
        assert!(is_late(due + Duration::seconds(1), Some(due)));
        assert!(!is_late(due, None));
    }

    #[test]
    fn test_late_rejected_when_not_allowed() {
        let now = Utc::now();
        let err = check_admission(&assignment(Some(-1), false, None), 0, now).unwrap_err();
        assert_eq!(err.0, ErrorCode::SubmissionLateNotAllowed);
        assert_eq!(check_admission(&assignment(Some(-1), true, None), 0, now), Ok(true));
        assert_eq!(check_admission(&assignment(Some(1), false, None), 0, now), Ok(false));
    }

    #[test]
    fn test_attempt_limit() {
        let now = Utc::now();
        let limited = assignment(None, false, Some(2));
        assert!(check_admission(&limited, 1, now).is_ok());
        let err = check_admission(&limited, 2, now).unwrap_err();
        assert_eq!(err.0, ErrorCode::SubmissionAttemptsExceeded);
    }

    #[test]
    fn test_latest_per_student() {
        let subs = vec![submission(1, 1), submission(1, 3), submission(1, 2), submission(2, 1)];
        let latest = latest_per_student(&subs);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[&1].attempt_number, 3);
        assert_eq!(latest[&2].attempt_number, 1);
    }
}
