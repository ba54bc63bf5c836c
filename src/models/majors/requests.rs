use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "major.ts")]
pub struct CreateMajorRequest {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "major.ts")]
pub struct UpdateMajorRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "major.ts")]
pub struct CreateCurriculumRequest {
    pub name: String,
    pub year: Option<i32>,
    pub description: Option<String>,
    #[serde(default)]
    pub course_ids: Vec<i64>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "major.ts")]
pub struct UpdateCurriculumRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub course_ids: Option<Vec<i64>>,
}
