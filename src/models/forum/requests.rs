use crate::models::common::pagination::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "forum.ts")]
pub struct PostListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PostListQuery {
    pub page: u64,
    pub size: u64,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "forum.ts")]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "forum.ts")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    /// 仅教学人员可修改
    pub is_pinned: Option<bool>,
    /// 仅教学人员可修改
    pub is_locked: Option<bool>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "forum.ts")]
pub struct CreateCommentRequest {
    pub content: String,
    pub parent_comment_id: Option<i64>,
}
