//! 成绩计算
//!
//! 按类别汇总已有得分的条目：`current = Σ(得分/满分 × 权重) / Σ参与类别权重 × 100`。
//! 没有得分条目的类别不参与分母；全部类别都没有得分时状态为 incomplete。

use std::collections::BTreeMap;

use crate::models::courses::entities::{GradeCategory, GradingScheme, LetterBand};
use crate::models::gradebook::entities::{GradeItem, GradeStatus};
use crate::services::round2;

const WEIGHT_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct GradeSummary {
    pub total_earned: f64,
    pub total_possible: f64,
    pub current_grade: Option<f64>,
    pub letter_grade: Option<String>,
    pub status: GradeStatus,
}

/// 校验评分方案，返回第一条不满足的规则
pub fn validate_scheme(scheme: &GradingScheme) -> Result<(), String> {
    for category in GradeCategory::ALL {
        let weight = scheme.weights.weight(category);
        if !weight.is_finite() || weight < 0.0 {
            return Err(format!("Weight of {category} must not be negative"));
        }
    }

    let total = scheme.weights.total();
    if (total - 100.0).abs() > WEIGHT_TOLERANCE {
        return Err(format!("Category weights must sum to 100, got {total}"));
    }

    if !(0.0..=100.0).contains(&scheme.passing_grade) {
        return Err("Passing grade must be between 0 and 100".to_string());
    }
    if !scheme.at_risk_margin.is_finite() || scheme.at_risk_margin < 0.0 {
        return Err("At-risk margin must not be negative".to_string());
    }

    validate_letter_bands(&scheme.letter_bands)
}

fn validate_letter_bands(bands: &[LetterBand]) -> Result<(), String> {
    let Some(last) = bands.last() else {
        return Err("At least one letter band is required".to_string());
    };

    for band in bands {
        if band.letter.trim().is_empty() {
            return Err("Letter band name must not be empty".to_string());
        }
        if !(0.0..=100.0).contains(&band.min_percentage) {
            return Err(format!(
                "Minimum percentage of band {} must be between 0 and 100",
                band.letter
            ));
        }
    }

    if bands
        .windows(2)
        .any(|pair| pair[0].min_percentage <= pair[1].min_percentage)
    {
        return Err("Letter bands must be in strictly descending order".to_string());
    }

    if last.min_percentage != 0.0 {
        return Err("The last letter band must start at 0".to_string());
    }

    Ok(())
}

/// 第一个满足下限的分档；都不满足时取最后一档
pub fn letter_for(percentage: f64, bands: &[LetterBand]) -> Option<String> {
    bands
        .iter()
        .find(|band| percentage >= band.min_percentage)
        .or_else(|| bands.last())
        .map(|band| band.letter.clone())
}

pub fn status_for(current: Option<f64>, scheme: &GradingScheme) -> GradeStatus {
    match current {
        None => GradeStatus::Incomplete,
        Some(pct) if pct >= scheme.passing_grade => GradeStatus::Passing,
        Some(pct) if pct >= scheme.passing_grade - scheme.at_risk_margin => GradeStatus::AtRisk,
        Some(_) => GradeStatus::Failing,
    }
}

pub fn calculate(items: &[GradeItem], scheme: &GradingScheme) -> GradeSummary {
    // 类别 -> (得分, 满分)
    let mut by_category: BTreeMap<GradeCategory, (f64, f64)> = BTreeMap::new();
    for item in items {
        if let Some(earned) = item.earned {
            let entry = by_category.entry(item.category).or_insert((0.0, 0.0));
            entry.0 += earned;
            entry.1 += item.possible;
        }
    }

    let total_earned: f64 = by_category.values().map(|(e, _)| e).sum();
    let total_possible: f64 = by_category.values().map(|(_, p)| p).sum();

    let mut weighted = 0.0;
    let mut included_weight = 0.0;
    for (category, (earned, possible)) in &by_category {
        if *possible <= 0.0 {
            continue;
        }
        let weight = scheme.weights.weight(*category);
        weighted += earned / possible * weight;
        included_weight += weight;
    }

    let current_grade = if included_weight > 0.0 {
        Some(round2(weighted / included_weight * 100.0))
    } else if total_possible > 0.0 {
        // 参与的类别权重都为 0，退化为原始得分率
        Some(round2(total_earned / total_possible * 100.0))
    } else {
        None
    };

    GradeSummary {
        total_earned: round2(total_earned),
        total_possible: round2(total_possible),
        current_grade,
        letter_grade: current_grade.and_then(|pct| letter_for(pct, &scheme.letter_bands)),
        status: status_for(current_grade, scheme),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::entities::CategoryWeights;
    use crate::models::gradebook::entities::GradeItemSource;

    fn item(category: GradeCategory, earned: Option<f64>, possible: f64) -> GradeItem {
        GradeItem {
            source: GradeItemSource::Assignment,
            source_id: 1,
            title: "item".into(),
            category,
            earned,
            possible,
        }
    }

    fn scheme(assignments: f64, quizzes: f64, midterm: f64, final_exam: f64) -> GradingScheme {
        GradingScheme {
            weights: CategoryWeights {
                assignments,
                quizzes,
                midterm,
                final_exam,
            },
            ..GradingScheme::default()
        }
    }

    #[test]
    fn test_default_scheme_is_valid() {
        assert!(validate_scheme(&GradingScheme::default()).is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_100() {
        let err = validate_scheme(&scheme(40.0, 20.0, 20.0, 10.0)).unwrap_err();
        assert!(err.contains("sum to 100"));
        assert!(validate_scheme(&scheme(33.33, 33.33, 33.34, 0.0)).is_ok());
        assert!(validate_scheme(&scheme(120.0, -20.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn test_letter_bands_rules() {
        let mut s = GradingScheme::default();
        s.letter_bands.swap(0, 1);
        assert!(validate_scheme(&s).is_err());

        let mut s = GradingScheme::default();
        s.letter_bands.pop();
        assert!(validate_scheme(&s).unwrap_err().contains("start at 0"));

        let mut s = GradingScheme::default();
        s.passing_grade = 101.0;
        assert!(validate_scheme(&s).is_err());
    }

    #[test]
    fn test_weighted_average_over_present_categories() {
        // 作业 80%（权重 40），测验 50%（权重 20），期中期末尚无成绩
        let items = vec![
            item(GradeCategory::Assignments, Some(8.0), 10.0),
            item(GradeCategory::Quizzes, Some(5.0), 10.0),
            item(GradeCategory::Final, None, 100.0),
        ];
        let summary = calculate(&items, &GradingScheme::default());
        // (0.8*40 + 0.5*20) / 60 * 100 = 70
        assert_eq!(summary.current_grade, Some(70.0));
        assert_eq!(summary.letter_grade.as_deref(), Some("C"));
        assert_eq!(summary.status, GradeStatus::Passing);
        assert_eq!(summary.total_earned, 13.0);
        assert_eq!(summary.total_possible, 20.0);
    }

    #[test]
    fn test_all_categories_present() {
        let items = vec![
            item(GradeCategory::Assignments, Some(90.0), 100.0),
            item(GradeCategory::Quizzes, Some(70.0), 100.0),
            item(GradeCategory::Midterm, Some(80.0), 100.0),
            item(GradeCategory::Final, Some(60.0), 100.0),
        ];
        let summary = calculate(&items, &GradingScheme::default());
        // 36 + 14 + 16 + 12 = 78
        assert_eq!(summary.current_grade, Some(78.0));
    }

    #[test]
    fn test_no_graded_items_is_incomplete() {
        let items = vec![item(GradeCategory::Assignments, None, 10.0)];
        let summary = calculate(&items, &GradingScheme::default());
        assert_eq!(summary.current_grade, None);
        assert_eq!(summary.letter_grade, None);
        assert_eq!(summary.status, GradeStatus::Incomplete);
        assert_eq!(summary.total_possible, 0.0);
    }

    #[test]
    fn test_zero_weight_category_falls_back_to_ratio() {
        let items = vec![item(GradeCategory::Final, Some(3.0), 4.0)];
        let summary = calculate(&items, &scheme(50.0, 50.0, 0.0, 0.0));
        assert_eq!(summary.current_grade, Some(75.0));
    }

    #[test]
    fn test_status_thresholds() {
        let s = GradingScheme::default();
        assert_eq!(status_for(Some(60.0), &s), GradeStatus::Passing);
        assert_eq!(status_for(Some(50.0), &s), GradeStatus::AtRisk);
        assert_eq!(status_for(Some(49.99), &s), GradeStatus::Failing);
        assert_eq!(status_for(None, &s), GradeStatus::Incomplete);
    }

    #[test]
    fn test_letter_for_bands() {
        let bands = GradingScheme::default().letter_bands;
        assert_eq!(letter_for(90.0, &bands).as_deref(), Some("A"));
        assert_eq!(letter_for(89.99, &bands).as_deref(), Some("B"));
        assert_eq!(letter_for(0.0, &bands).as_deref(), Some("F"));
        assert_eq!(letter_for(-5.0, &bands).as_deref(), Some("F"));
        assert_eq!(letter_for(50.0, &[]), None);
    }
}
