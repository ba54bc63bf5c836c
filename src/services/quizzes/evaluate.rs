//! 测验判分
//!
//! 判分只依据作答开始时保存的题目快照。选择题按去空白后的完全相等判定，
//! 判断题按布尔值比较，填空题按（可配置大小写的）可接受答案匹配，
//! 问答题留待人工评分。

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use crate::models::quizzes::entities::{
    AttemptAnswer, AttemptStatus, Question, QuestionType, QuizAttempt,
};
use crate::services::round2;

/// 把请求中的单个答案统一成字符串；null 表示未作答
pub fn normalize_answer(value: &serde_json::Value) -> Result<Option<String>, String> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) if s.trim().is_empty() => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s.clone())),
        serde_json::Value::Bool(b) => Ok(Some(b.to_string())),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err("Answers must be strings, booleans or numbers".to_string()),
    }
}

/// 把新提交的答案合并进已保存的答案，按快照顺序返回
pub fn merge_answers(
    snapshot: &[Question],
    saved: &[AttemptAnswer],
    incoming: &HashMap<String, serde_json::Value>,
) -> Result<Vec<AttemptAnswer>, String> {
    let known: HashSet<&str> = snapshot.iter().map(|q| q.id.as_str()).collect();
    if let Some(unknown) = incoming.keys().find(|id| !known.contains(id.as_str())) {
        return Err(format!("Unknown question id: {unknown}"));
    }

    snapshot
        .iter()
        .map(|question| {
            let answer = match incoming.get(&question.id) {
                Some(value) => normalize_answer(value)?,
                None => saved
                    .iter()
                    .find(|a| a.question_id == question.id)
                    .and_then(|a| a.answer.clone()),
            };
            Ok(AttemptAnswer {
                question_id: question.id.clone(),
                answer,
                is_correct: None,
                points_awarded: None,
                feedback: None,
            })
        })
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// 单题判分，返回 (是否正确, 得分)；问答题作答后两者均为空
pub fn grade_answer(question: &Question, answer: Option<&str>) -> (Option<bool>, Option<f64>) {
    let Some(answer) = answer.map(str::trim).filter(|a| !a.is_empty()) else {
        return match question.question_type {
            QuestionType::Essay => (None, Some(0.0)),
            _ => (Some(false), Some(0.0)),
        };
    };

    let correct = match question.question_type {
        QuestionType::MultipleChoice => question
            .correct_answer
            .as_deref()
            .is_some_and(|c| c.trim() == answer),
        QuestionType::TrueFalse => {
            let expected = question.correct_answer.as_deref().and_then(parse_bool);
            expected.is_some() && expected == parse_bool(answer)
        }
        QuestionType::ShortAnswer => question.accepted_answers.iter().any(|accepted| {
            let accepted = accepted.trim();
            if question.case_sensitive {
                accepted == answer
            } else {
                accepted.to_lowercase() == answer.to_lowercase()
            }
        }),
        QuestionType::Essay => return (None, None),
    };

    (Some(correct), Some(if correct { question.points } else { 0.0 }))
}

/// 按快照对全部答案判分
pub fn grade_answers(snapshot: &[Question], answers: &[AttemptAnswer]) -> Vec<AttemptAnswer> {
    snapshot
        .iter()
        .map(|question| {
            let answer = answers
                .iter()
                .find(|a| a.question_id == question.id)
                .and_then(|a| a.answer.clone());
            let (is_correct, points_awarded) = grade_answer(question, answer.as_deref());
            AttemptAnswer {
                question_id: question.id.clone(),
                answer,
                is_correct,
                points_awarded,
                feedback: None,
            }
        })
        .collect()
}

/// 根据各题得分重算总分、百分比与状态；仍有未评分题目时保持 submitted
pub fn recompute_totals(attempt: &mut QuizAttempt, passing_score: f64, now: DateTime<Utc>) {
    let score: f64 = attempt
        .answers
        .iter()
        .filter_map(|a| a.points_awarded)
        .sum();
    let pending = attempt.answers.iter().any(|a| a.points_awarded.is_none());
    // 通过判定用未舍入的百分比，舍入只用于存储展示
    let exact_percentage = if attempt.total_points > 0.0 {
        score / attempt.total_points * 100.0
    } else {
        0.0
    };

    attempt.score = Some(round2(score));
    attempt.percentage = Some(round2(exact_percentage));
    if pending {
        attempt.status = AttemptStatus::Submitted;
        attempt.passed = None;
        attempt.graded_at = None;
    } else {
        attempt.status = AttemptStatus::Graded;
        attempt.passed = Some(exact_percentage >= passing_score);
        attempt.graded_at = Some(now);
    }
}

/// 交卷：判分并写入交卷时间
pub fn finalize_attempt(
    attempt: &mut QuizAttempt,
    passing_score: f64,
    auto_submitted: bool,
    now: DateTime<Utc>,
) {
    attempt.answers = grade_answers(&attempt.questions_snapshot, &attempt.answers);
    attempt.submitted_at = Some(now);
    attempt.auto_submitted = auto_submitted;
    recompute_totals(attempt, passing_score, now);
}

pub fn validate_questions(questions: &[Question]) -> Result<(), String> {
    if questions.is_empty() {
        return Err("A quiz must have at least one question".to_string());
    }

    let mut seen = HashSet::new();
    for question in questions {
        let id = question.id.trim();
        if id.is_empty() {
            return Err("Question id must not be empty".to_string());
        }
        if !seen.insert(id) {
            return Err(format!("Duplicate question id: {id}"));
        }
        if question.text.trim().is_empty() {
            return Err(format!("Question {id}: text must not be empty"));
        }
        if !(question.points.is_finite() && question.points > 0.0) {
            return Err(format!("Question {id}: points must be greater than 0"));
        }

        match question.question_type {
            QuestionType::MultipleChoice => {
                if question.options.len() < 2 {
                    return Err(format!("Question {id}: at least two options are required"));
                }
                let correct = question.correct_answer.as_deref().map(str::trim);
                if !correct.is_some_and(|c| question.options.iter().any(|o| o.trim() == c)) {
                    return Err(format!(
                        "Question {id}: correct_answer must be one of the options"
                    ));
                }
            }
            QuestionType::TrueFalse => {
                if question.correct_answer.as_deref().and_then(parse_bool).is_none() {
                    return Err(format!(
                        "Question {id}: correct_answer must be \"true\" or \"false\""
                    ));
                }
            }
            QuestionType::ShortAnswer => {
                if question.accepted_answers.iter().all(|a| a.trim().is_empty()) {
                    return Err(format!(
                        "Question {id}: at least one accepted answer is required"
                    ));
                }
            }
            QuestionType::Essay => {}
        }
    }
    Ok(())
}

/// 测验设置的取值范围
pub fn validate_settings(
    passing_score: Option<f64>,
    time_limit_minutes: Option<i32>,
    max_attempts: Option<i32>,
    available_from: Option<DateTime<Utc>>,
    due_date: Option<DateTime<Utc>>,
) -> Result<(), String> {
    if let Some(score) = passing_score
        && !(0.0..=100.0).contains(&score)
    {
        return Err("passing_score must be between 0 and 100".to_string());
    }
    if time_limit_minutes.is_some_and(|t| t <= 0) {
        return Err("time_limit_minutes must be greater than 0".to_string());
    }
    if max_attempts.is_some_and(|m| m <= 0) {
        return Err("max_attempts must be greater than 0".to_string());
    }
    if let (Some(from), Some(due)) = (available_from, due_date)
        && from >= due
    {
        return Err("available_from must be earlier than due_date".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(id: &str, question_type: QuestionType, points: f64) -> Question {
        Question {
            id: id.to_string(),
            question_type,
            text: format!("Question {id}"),
            options: Vec::new(),
            correct_answer: None,
            accepted_answers: Vec::new(),
            case_sensitive: false,
            points,
        }
    }

    fn multiple_choice() -> Question {
        Question {
            options: vec!["A".into(), "B".into(), "C".into()],
            correct_answer: Some("B".into()),
            ..question("mc", QuestionType::MultipleChoice, 2.0)
        }
    }

    fn true_false() -> Question {
        Question {
            correct_answer: Some("true".into()),
            ..question("tf", QuestionType::TrueFalse, 1.0)
        }
    }

    fn short_answer(case_sensitive: bool) -> Question {
        Question {
            accepted_answers: vec!["Paris".into(), "paris, france".into()],
            case_sensitive,
            ..question("sa", QuestionType::ShortAnswer, 3.0)
        }
    }

    fn attempt(snapshot: Vec<Question>) -> QuizAttempt {
        let total_points = snapshot.iter().map(|q| q.points).sum();
        QuizAttempt {
            id: 1,
            quiz_id: 1,
            student_id: 5,
            attempt_number: 1,
            questions_snapshot: snapshot,
            answers: Vec::new(),
            status: AttemptStatus::InProgress,
            score: None,
            total_points,
            percentage: None,
            passed: None,
            auto_submitted: false,
            started_at: Utc::now(),
            deadline_at: None,
            submitted_at: None,
            graded_at: None,
        }
    }

    #[test]
    fn test_normalize_answer() {
        assert_eq!(normalize_answer(&json!(null)), Ok(None));
        assert_eq!(normalize_answer(&json!("  ")), Ok(None));
        assert_eq!(normalize_answer(&json!(true)), Ok(Some("true".to_string())));
        assert_eq!(normalize_answer(&json!(42)), Ok(Some("42".to_string())));
        assert!(normalize_answer(&json!(["a"])).is_err());
    }

    #[test]
    fn test_grade_multiple_choice() {
        let q = multiple_choice();
        assert_eq!(grade_answer(&q, Some(" B ")), (Some(true), Some(2.0)));
        assert_eq!(grade_answer(&q, Some("b")), (Some(false), Some(0.0)));
        assert_eq!(grade_answer(&q, None), (Some(false), Some(0.0)));
    }

    #[test]
    fn test_grade_true_false_compares_booleans() {
        let q = true_false();
        assert_eq!(grade_answer(&q, Some("TRUE")), (Some(true), Some(1.0)));
        assert_eq!(grade_answer(&q, Some("false")), (Some(false), Some(0.0)));
        assert_eq!(grade_answer(&q, Some("yes")), (Some(false), Some(0.0)));
    }

    #[test]
    fn test_grade_short_answer_case_handling() {
        let insensitive = short_answer(false);
        assert_eq!(grade_answer(&insensitive, Some("PARIS")), (Some(true), Some(3.0)));
        assert_eq!(
            grade_answer(&insensitive, Some("Paris, France")),
            (Some(true), Some(3.0))
        );

        let sensitive = short_answer(true);
        assert_eq!(grade_answer(&sensitive, Some("Paris")), (Some(true), Some(3.0)));
        assert_eq!(grade_answer(&sensitive, Some("PARIS")), (Some(false), Some(0.0)));
    }

    #[test]
    fn test_essay_left_for_manual_grading() {
        let q = question("es", QuestionType::Essay, 5.0);
        assert_eq!(grade_answer(&q, Some("A long answer")), (None, None));
        assert_eq!(grade_answer(&q, None), (None, Some(0.0)));
    }

    #[test]
    fn test_merge_answers_keeps_saved_and_rejects_unknown() {
        let snapshot = vec![multiple_choice(), true_false()];
        let first = merge_answers(&snapshot, &[], &HashMap::from([("mc".to_string(), json!("A"))]))
            .unwrap();
        assert_eq!(first[0].answer.as_deref(), Some("A"));
        assert_eq!(first[1].answer, None);

        let second = merge_answers(
            &snapshot,
            &first,
            &HashMap::from([("tf".to_string(), json!(false))]),
        )
        .unwrap();
        assert_eq!(second[0].answer.as_deref(), Some("A"));
        assert_eq!(second[1].answer.as_deref(), Some("false"));

        let err = merge_answers(&snapshot, &[], &HashMap::from([("zz".to_string(), json!("x"))]));
        assert!(err.is_err());
    }

    #[test]
    fn test_finalize_fully_objective_attempt() {
        let mut attempt = attempt(vec![multiple_choice(), true_false(), short_answer(false)]);
        attempt.answers = merge_answers(
            &attempt.questions_snapshot,
            &[],
            &HashMap::from([
                ("mc".to_string(), json!("B")),
                ("tf".to_string(), json!(false)),
                ("sa".to_string(), json!("paris")),
            ]),
        )
        .unwrap();

        finalize_attempt(&mut attempt, 60.0, false, Utc::now());

        assert_eq!(attempt.status, AttemptStatus::Graded);
        assert_eq!(attempt.score, Some(5.0));
        assert_eq!(attempt.percentage, Some(83.33));
        assert_eq!(attempt.passed, Some(true));
        assert!(attempt.graded_at.is_some());
        assert!(attempt.submitted_at.is_some());
    }

    #[test]
    fn test_essay_keeps_attempt_submitted_until_graded() {
        let mut attempt = attempt(vec![multiple_choice(), question("es", QuestionType::Essay, 8.0)]);
        attempt.answers = merge_answers(
            &attempt.questions_snapshot,
            &[],
            &HashMap::from([
                ("mc".to_string(), json!("B")),
                ("es".to_string(), json!("My essay")),
            ]),
        )
        .unwrap();

        finalize_attempt(&mut attempt, 50.0, false, Utc::now());
        assert_eq!(attempt.status, AttemptStatus::Submitted);
        assert_eq!(attempt.passed, None);
        assert_eq!(attempt.score, Some(2.0));

        attempt.answers[1].points_awarded = Some(6.0);
        recompute_totals(&mut attempt, 50.0, Utc::now());
        assert_eq!(attempt.status, AttemptStatus::Graded);
        assert_eq!(attempt.score, Some(8.0));
        assert_eq!(attempt.percentage, Some(80.0));
        assert_eq!(attempt.passed, Some(true));
    }

    #[test]
    fn test_percentage_boundary_passes() {
        let mut attempt = attempt(vec![multiple_choice(), Question {
            id: "mc2".into(),
            ..multiple_choice()
        }]);
        attempt.answers = merge_answers(
            &attempt.questions_snapshot,
            &[],
            &HashMap::from([("mc".to_string(), json!("B"))]),
        )
        .unwrap();
        finalize_attempt(&mut attempt, 50.0, true, Utc::now());
        assert_eq!(attempt.percentage, Some(50.0));
        assert_eq!(attempt.passed, Some(true));
        assert!(attempt.auto_submitted);
    }

    #[test]
    fn test_pass_decision_uses_unrounded_percentage() {
        let third = |id: &str| Question {
            id: id.into(),
            ..multiple_choice()
        };
        let mut attempt = attempt(vec![third("a"), third("b"), third("c")]);
        attempt.answers = merge_answers(
            &attempt.questions_snapshot,
            &[],
            &HashMap::from([("a".to_string(), json!("B"))]),
        )
        .unwrap();

        let mut strict = attempt.clone();
        finalize_attempt(&mut attempt, 33.333, false, Utc::now());
        assert_eq!(attempt.percentage, Some(33.33));
        assert_eq!(attempt.passed, Some(true));

        finalize_attempt(&mut strict, 33.34, false, Utc::now());
        assert_eq!(strict.passed, Some(false));
    }

    #[test]
    fn test_validate_questions() {
        assert!(validate_questions(&[]).is_err());
        assert!(validate_questions(&[multiple_choice(), true_false(), short_answer(true)]).is_ok());

        let duplicate = vec![multiple_choice(), multiple_choice()];
        assert!(validate_questions(&duplicate).unwrap_err().contains("Duplicate"));

        let bad_choice = Question {
            correct_answer: Some("D".into()),
            ..multiple_choice()
        };
        assert!(validate_questions(&[bad_choice]).is_err());

        let bad_tf = Question {
            correct_answer: Some("maybe".into()),
            ..true_false()
        };
        assert!(validate_questions(&[bad_tf]).is_err());

        let no_points = question("es", QuestionType::Essay, 0.0);
        assert!(validate_questions(&[no_points]).is_err());
    }

    #[test]
    fn test_validate_settings() {
        let now = Utc::now();
        assert!(validate_settings(Some(60.0), Some(30), Some(2), None, None).is_ok());
        assert!(validate_settings(Some(101.0), None, None, None, None).is_err());
        assert!(validate_settings(None, Some(0), None, None, None).is_err());
        assert!(validate_settings(None, None, Some(0), None, None).is_err());
        assert!(validate_settings(None, None, None, Some(now), Some(now)).is_err());
    }
}
