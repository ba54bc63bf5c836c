use super::entities::{Comment, ForumPost};
use crate::models::users::entities::UserSummary;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "forum.ts")]
pub struct PostListItem {
    #[serde(flatten)]
    #[ts(flatten)]
    pub post: ForumPost,
    pub author: Option<UserSummary>,
    pub comment_count: u64,
}

/// 评论树节点
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "forum.ts")]
pub struct CommentNode {
    #[serde(flatten)]
    #[ts(flatten)]
    pub comment: Comment,
    pub author: Option<UserSummary>,
    pub replies: Vec<CommentNode>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "forum.ts")]
pub struct PostDetailResponse {
    pub post: ForumPost,
    pub author: Option<UserSummary>,
    pub comments: Vec<CommentNode>,
}
