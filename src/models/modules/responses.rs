use super::entities::CourseModule;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "module.ts")]
pub struct ModuleListResponse {
    pub items: Vec<CourseModule>,
}
