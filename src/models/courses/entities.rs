use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::define_string_enum;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "course.ts")]
pub enum CourseStatus {
    Active,
    Archived,
}

define_string_enum!(CourseStatus, "课程状态" {
    Active => ACTIVE = "active",
    Archived => ARCHIVED = "archived",
});

/// 成绩类别，与评分方案中的四项权重一一对应
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "course.ts")]
pub enum GradeCategory {
    Assignments,
    Quizzes,
    Midterm,
    Final,
}

define_string_enum!(GradeCategory, "成绩类别" {
    Assignments => ASSIGNMENTS = "assignments",
    Quizzes => QUIZZES = "quizzes",
    Midterm => MIDTERM = "midterm",
    Final => FINAL = "final",
});

impl GradeCategory {
    pub const ALL: [GradeCategory; 4] = [
        GradeCategory::Assignments,
        GradeCategory::Quizzes,
        GradeCategory::Midterm,
        GradeCategory::Final,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CategoryWeights {
    pub assignments: f64,
    pub quizzes: f64,
    pub midterm: f64,
    #[serde(rename = "final")]
    pub final_exam: f64,
}

impl CategoryWeights {
    pub fn weight(&self, category: GradeCategory) -> f64 {
        match category {
            GradeCategory::Assignments => self.assignments,
            GradeCategory::Quizzes => self.quizzes,
            GradeCategory::Midterm => self.midterm,
            GradeCategory::Final => self.final_exam,
        }
    }

    pub fn total(&self) -> f64 {
        GradeCategory::ALL.iter().map(|c| self.weight(*c)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct LetterBand {
    pub letter: String,
    pub min_percentage: f64,
}

/// 课程评分方案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct GradingScheme {
    pub weights: CategoryWeights,
    pub passing_grade: f64,
    #[serde(default = "default_at_risk_margin")]
    pub at_risk_margin: f64,
    #[serde(default = "default_letter_bands")]
    pub letter_bands: Vec<LetterBand>,
}

fn default_at_risk_margin() -> f64 {
    10.0
}

pub fn default_letter_bands() -> Vec<LetterBand> {
    [("A", 90.0), ("B", 80.0), ("C", 70.0), ("D", 60.0), ("F", 0.0)]
        .into_iter()
        .map(|(letter, min)| LetterBand {
            letter: letter.to_string(),
            min_percentage: min,
        })
        .collect()
}

impl Default for GradingScheme {
    fn default() -> Self {
        Self {
            weights: CategoryWeights {
                assignments: 40.0,
                quizzes: 20.0,
                midterm: 20.0,
                final_exam: 20.0,
            },
            passing_grade: 60.0,
            at_risk_margin: default_at_risk_margin(),
            letter_bands: default_letter_bands(),
        }
    }
}

impl From<&crate::config::GradingConfig> for GradingScheme {
    fn from(config: &crate::config::GradingConfig) -> Self {
        Self {
            weights: CategoryWeights {
                assignments: config.assignments_weight,
                quizzes: config.quizzes_weight,
                midterm: config.midterm_weight,
                final_exam: config.final_weight,
            },
            passing_grade: config.passing_grade,
            at_risk_margin: config.at_risk_margin,
            letter_bands: default_letter_bands(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct Course {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub credits: i32,
    pub instructor_id: i64,
    pub major_id: Option<i64>,
    /// 仅对课程教学人员可见，其余情况置空
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_key: Option<String>,
    pub status: CourseStatus,
    pub grading_scheme: GradingScheme,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Course {
    pub fn is_archived(&self) -> bool {
        self.status == CourseStatus::Archived
    }

    pub fn without_enrollment_key(mut self) -> Self {
        self.enrollment_key = None;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseSummary {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub credits: i32,
    pub status: CourseStatus,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id,
            code: course.code.clone(),
            name: course.name.clone(),
            credits: course.credits,
            status: course.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_serialize_final_key() {
        let json = serde_json::to_value(GradingScheme::default()).unwrap();
        assert_eq!(json["weights"]["final"], 20.0);
        assert!(json["weights"].get("final_exam").is_none());
    }

    #[test]
    fn test_scheme_defaults_when_omitted() {
        let scheme: GradingScheme = serde_json::from_str(
            r#"{"weights":{"assignments":50,"quizzes":10,"midterm":20,"final":20},"passing_grade":50}"#,
        )
        .unwrap();
        assert_eq!(scheme.at_risk_margin, 10.0);
        assert_eq!(scheme.letter_bands.len(), 5);
        assert_eq!(scheme.weights.total(), 100.0);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("final".parse::<GradeCategory>().unwrap(), GradeCategory::Final);
        assert!("homework".parse::<GradeCategory>().is_err());
    }
}
