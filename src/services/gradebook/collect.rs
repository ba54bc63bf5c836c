//! 收集学生在课程中的成绩条目

use crate::models::{
    assignments::entities::Assignment,
    gradebook::entities::{GradeItem, GradeItemSource, ManualGrade},
    quizzes::entities::{AttemptStatus, Quiz, QuizAttempt},
    submissions::entities::{Submission, SubmissionStatus},
};
use crate::services::round2;

/// 作业取最近一次已评分提交；未提交或未评分时 earned 为空
pub fn assignment_item(assignment: &Assignment, submissions: &[Submission]) -> GradeItem {
    let earned = submissions
        .iter()
        .filter(|s| s.assignment_id == assignment.id)
        .filter(|s| s.status == SubmissionStatus::Graded)
        .filter_map(|s| s.grade.map(|g| (s.attempt_number, g)))
        .max_by_key(|(attempt, _)| *attempt)
        .map(|(_, grade)| grade);

    GradeItem {
        source: GradeItemSource::Assignment,
        source_id: assignment.id,
        title: assignment.title.clone(),
        category: assignment.category,
        earned,
        possible: assignment.max_grade,
    }
}

/// 测验取最高的已评分作答，百分比按当前测验总分折算
pub fn quiz_item(quiz: &Quiz, attempts: &[QuizAttempt]) -> GradeItem {
    let possible = quiz.total_points();
    let best = attempts
        .iter()
        .filter(|a| a.quiz_id == quiz.id && a.status == AttemptStatus::Graded)
        .filter_map(|a| a.percentage)
        .fold(None, |best: Option<f64>, pct| {
            Some(best.map_or(pct, |b| b.max(pct)))
        });

    GradeItem {
        source: GradeItemSource::Quiz,
        source_id: quiz.id,
        title: quiz.title.clone(),
        category: quiz.category,
        earned: best.map(|pct| round2(pct / 100.0 * possible)),
        possible,
    }
}

pub fn manual_item(entry: &ManualGrade) -> GradeItem {
    GradeItem {
        source: GradeItemSource::Manual,
        source_id: entry.id,
        title: entry.title.clone(),
        category: entry.category,
        earned: Some(entry.earned),
        possible: entry.possible,
    }
}

/// 单个学生的全部条目；未发布或没有题目的测验不计入
pub fn collect_items(
    assignments: &[Assignment],
    submissions: &[Submission],
    quizzes: &[Quiz],
    attempts: &[QuizAttempt],
    manual: &[ManualGrade],
) -> Vec<GradeItem> {
    let mut items: Vec<GradeItem> = assignments
        .iter()
        .map(|a| assignment_item(a, submissions))
        .collect();

    items.extend(
        quizzes
            .iter()
            .filter(|q| q.is_published && q.total_points() > 0.0)
            .map(|q| quiz_item(q, attempts)),
    );

    items.extend(manual.iter().map(manual_item));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::entities::GradeCategory;
    use crate::models::quizzes::entities::{Question, QuestionType, ShowAnswersAfter};

    fn assignment(id: i64, max_grade: f64) -> Assignment {
        let now = chrono::Utc::now();
        Assignment {
            id,
            course_id: 1,
            module_id: None,
            created_by: 1,
            title: format!("A{id}"),
            description: None,
            max_grade,
            due_date: None,
            allow_late: false,
            category: GradeCategory::Assignments,
            max_attempts: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn submission(
        assignment_id: i64,
        attempt_number: i32,
        status: SubmissionStatus,
        grade: Option<f64>,
    ) -> Submission {
        Submission {
            id: attempt_number as i64,
            assignment_id,
            student_id: 9,
            attempt_number,
            content: "answer".into(),
            status,
            is_late: false,
            grade,
            feedback: None,
            graded_by: None,
            graded_at: None,
            submitted_at: chrono::Utc::now(),
        }
    }

    fn quiz(id: i64, points: &[f64]) -> Quiz {
        let now = chrono::Utc::now();
        Quiz {
            id,
            course_id: 1,
            module_id: None,
            created_by: 1,
            title: format!("Q{id}"),
            description: None,
            questions: points
                .iter()
                .enumerate()
                .map(|(i, p)| Question {
                    id: format!("q{i}"),
                    question_type: QuestionType::Essay,
                    text: "explain".into(),
                    options: vec![],
                    correct_answer: None,
                    accepted_answers: vec![],
                    case_sensitive: false,
                    points: *p,
                })
                .collect(),
            time_limit_minutes: None,
            max_attempts: None,
            passing_score: 60.0,
            show_answers_after: ShowAnswersAfter::Immediately,
            available_from: None,
            due_date: None,
            is_published: true,
            category: GradeCategory::Quizzes,
            created_at: now,
            updated_at: now,
        }
    }

    fn attempt(quiz_id: i64, status: AttemptStatus, percentage: Option<f64>) -> QuizAttempt {
        QuizAttempt {
            id: 1,
            quiz_id,
            student_id: 9,
            attempt_number: 1,
            questions_snapshot: vec![],
            answers: vec![],
            status,
            score: None,
            total_points: 10.0,
            percentage,
            passed: None,
            auto_submitted: false,
            started_at: chrono::Utc::now(),
            deadline_at: None,
            submitted_at: None,
            graded_at: None,
        }
    }

    #[test]
    fn test_assignment_uses_latest_graded_submission() {
        let subs = vec![
            submission(1, 1, SubmissionStatus::Graded, Some(60.0)),
            submission(1, 2, SubmissionStatus::Graded, Some(85.0)),
            submission(1, 3, SubmissionStatus::Resubmitted, None),
        ];
        let item = assignment_item(&assignment(1, 100.0), &subs);
        assert_eq!(item.earned, Some(85.0));
        assert_eq!(item.possible, 100.0);
    }

    #[test]
    fn test_missing_or_returned_work_has_no_earned() {
        let subs = vec![submission(1, 1, SubmissionStatus::Returned, Some(40.0))];
        assert_eq!(assignment_item(&assignment(1, 100.0), &subs).earned, None);
        assert_eq!(assignment_item(&assignment(2, 100.0), &subs).earned, None);
    }

    #[test]
    fn test_quiz_uses_best_graded_attempt_scaled_to_points() {
        let attempts = vec![
            attempt(5, AttemptStatus::Graded, Some(50.0)),
            attempt(5, AttemptStatus::Graded, Some(80.0)),
            attempt(5, AttemptStatus::Submitted, Some(95.0)),
        ];
        let item = quiz_item(&quiz(5, &[5.0, 15.0]), &attempts);
        assert_eq!(item.possible, 20.0);
        assert_eq!(item.earned, Some(16.0));
    }

    #[test]
    fn test_collect_skips_unpublished_quizzes() {
        let mut hidden = quiz(6, &[10.0]);
        hidden.is_published = false;
        let items = collect_items(&[assignment(1, 10.0)], &[], &[quiz(5, &[10.0]), hidden], &[], &[]);
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.earned.is_none()));
    }
}
