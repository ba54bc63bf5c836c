use super::entities::{Curriculum, Major};
use crate::models::courses::entities::CourseSummary;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "major.ts")]
pub struct MajorListResponse {
    pub items: Vec<Major>,
}

/// 培养方案详情，课程按方案中的顺序展开
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "major.ts")]
pub struct CurriculumDetailResponse {
    #[serde(flatten)]
    #[ts(flatten)]
    pub curriculum: Curriculum,
    pub courses: Vec<CourseSummary>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "major.ts")]
pub struct CurriculumListResponse {
    pub items: Vec<Curriculum>,
}
