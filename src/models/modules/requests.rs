use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "module.ts")]
pub struct CreateModuleRequest {
    pub title: String,
    pub description: Option<String>,
    /// 缺省时追加到末尾
    pub position: Option<i32>,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "module.ts")]
pub struct UpdateModuleRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub position: Option<i32>,
    pub is_published: Option<bool>,
}
