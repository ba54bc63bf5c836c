//! 作答时限、开放时间与答案公布时机

use chrono::{DateTime, Duration, Utc};

use crate::models::quizzes::entities::{Quiz, QuizAttempt, ShowAnswersAfter};

pub fn deadline_for(started_at: DateTime<Utc>, time_limit_minutes: Option<i32>) -> Option<DateTime<Utc>> {
    time_limit_minutes.map(|minutes| started_at + Duration::minutes(i64::from(minutes)))
}

/// 进行中的限时作答超过截止时间加宽限期
pub fn is_expired(attempt: &QuizAttempt, now: DateTime<Utc>, grace_seconds: i64) -> bool {
    attempt.is_in_progress()
        && attempt
            .deadline_at
            .is_some_and(|deadline| now > deadline + Duration::seconds(grace_seconds.max(0)))
}

pub fn remaining_seconds(attempt: &QuizAttempt, now: DateTime<Utc>) -> Option<i64> {
    if !attempt.is_in_progress() {
        return None;
    }
    attempt
        .deadline_at
        .map(|deadline| (deadline - now).num_seconds().max(0))
}

/// 能否开始新的作答
pub fn check_available(quiz: &Quiz, now: DateTime<Utc>) -> Result<(), String> {
    if !quiz.is_published {
        return Err("Quiz is not published".to_string());
    }
    if quiz.questions.is_empty() {
        return Err("Quiz has no questions".to_string());
    }
    if quiz.available_from.is_some_and(|from| now < from) {
        return Err("Quiz is not open yet".to_string());
    }
    if quiz.due_date.is_some_and(|due| now > due) {
        return Err("Quiz is closed".to_string());
    }
    Ok(())
}

/// 学生能否看到正确答案；教学人员始终可见
pub fn answers_visible(quiz: &Quiz, attempt: &QuizAttempt, is_staff: bool, now: DateTime<Utc>) -> bool {
    if is_staff {
        return true;
    }
    if attempt.is_in_progress() {
        return false;
    }
    match quiz.show_answers_after {
        ShowAnswersAfter::Immediately => true,
        ShowAnswersAfter::AfterDueDate => quiz.due_date.is_none_or(|due| now > due),
        ShowAnswersAfter::Never => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::entities::GradeCategory;
    use crate::models::quizzes::entities::{AttemptStatus, Question, QuestionType};

    fn quiz(show: ShowAnswersAfter, due_date: Option<DateTime<Utc>>) -> Quiz {
        let now = Utc::now();
        Quiz {
            id: 1,
            course_id: 1,
            module_id: None,
            created_by: 1,
            title: "Quiz".to_string(),
            description: None,
            questions: vec![Question {
                id: "q1".to_string(),
                question_type: QuestionType::Essay,
                text: "Explain".to_string(),
                options: Vec::new(),
                correct_answer: None,
                accepted_answers: Vec::new(),
                case_sensitive: false,
                points: 1.0,
            }],
            time_limit_minutes: Some(10),
            max_attempts: None,
            passing_score: 60.0,
            show_answers_after: show,
            available_from: None,
            due_date,
            is_published: true,
            category: GradeCategory::Quizzes,
            created_at: now,
            updated_at: now,
        }
    }

    fn attempt(status: AttemptStatus, started_at: DateTime<Utc>) -> QuizAttempt {
        QuizAttempt {
            id: 1,
            quiz_id: 1,
            student_id: 2,
            attempt_number: 1,
            questions_snapshot: Vec::new(),
            answers: Vec::new(),
            status,
            score: None,
            total_points: 1.0,
            percentage: None,
            passed: None,
            auto_submitted: false,
            started_at,
            deadline_at: deadline_for(started_at, Some(10)),
            submitted_at: None,
            graded_at: None,
        }
    }

    #[test]
    fn test_expiry_honours_grace_period() {
        let started = Utc::now() - Duration::minutes(10) - Duration::seconds(20);
        let a = attempt(AttemptStatus::InProgress, started);
        let now = Utc::now();
        assert!(!is_expired(&a, now, 30));
        assert!(is_expired(&a, now, 5));
        assert_eq!(remaining_seconds(&a, now), Some(0));

        let submitted = attempt(AttemptStatus::Submitted, started);
        assert!(!is_expired(&submitted, now, 0));
        assert_eq!(remaining_seconds(&submitted, now), None);
    }

    #[test]
    fn test_untimed_attempt_never_expires() {
        let mut a = attempt(AttemptStatus::InProgress, Utc::now() - Duration::days(3));
        a.deadline_at = None;
        assert!(!is_expired(&a, Utc::now(), 0));
    }

    #[test]
    fn test_availability_window() {
        let now = Utc::now();
        assert!(check_available(&quiz(ShowAnswersAfter::Never, None), now).is_ok());

        let closed = quiz(ShowAnswersAfter::Never, Some(now - Duration::hours(1)));
        assert!(check_available(&closed, now).is_err());

        let mut future = quiz(ShowAnswersAfter::Never, None);
        future.available_from = Some(now + Duration::hours(1));
        assert!(check_available(&future, now).is_err());

        let mut draft = quiz(ShowAnswersAfter::Never, None);
        draft.is_published = false;
        assert!(check_available(&draft, now).is_err());
    }

    #[test]
    fn test_answer_visibility() {
        let now = Utc::now();
        let finished = attempt(AttemptStatus::Graded, now - Duration::minutes(5));
        let running = attempt(AttemptStatus::InProgress, now);

        let immediate = quiz(ShowAnswersAfter::Immediately, None);
        assert!(answers_visible(&immediate, &finished, false, now));
        assert!(!answers_visible(&immediate, &running, false, now));

        let after_due = quiz(ShowAnswersAfter::AfterDueDate, Some(now + Duration::hours(1)));
        assert!(!answers_visible(&after_due, &finished, false, now));
        assert!(answers_visible(&after_due, &finished, false, now + Duration::hours(2)));

        let never = quiz(ShowAnswersAfter::Never, None);
        assert!(!answers_visible(&never, &finished, false, now));
        assert!(answers_visible(&never, &finished, true, now));
    }
}
