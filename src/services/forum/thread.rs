//! 评论树

use std::collections::{HashMap, HashSet};

use crate::models::{
    forum::{entities::Comment, responses::CommentNode},
    users::entities::UserSummary,
};

/// 按父子关系组装评论树，同层按创建时间升序；父评论已不存在的回复提升为顶层
pub fn build_comment_tree(
    comments: &[Comment],
    authors: &HashMap<i64, UserSummary>,
) -> Vec<CommentNode> {
    let ids: HashSet<i64> = comments.iter().map(|c| c.id).collect();
    let mut children: HashMap<Option<i64>, Vec<&Comment>> = HashMap::new();
    for comment in comments {
        let parent = comment.parent_comment_id.filter(|p| ids.contains(p));
        children.entry(parent).or_default().push(comment);
    }
    for siblings in children.values_mut() {
        siblings.sort_by_key(|c| (c.created_at, c.id));
    }

    fn build(
        parent: Option<i64>,
        children: &HashMap<Option<i64>, Vec<&Comment>>,
        authors: &HashMap<i64, UserSummary>,
    ) -> Vec<CommentNode> {
        children
            .get(&parent)
            .map(|siblings| {
                siblings
                    .iter()
                    .map(|comment| CommentNode {
                        comment: (*comment).clone(),
                        author: authors.get(&comment.author_id).cloned(),
                        replies: build(Some(comment.id), children, authors),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    build(None, &children, authors)
}

/// 评论及其全部后代的 ID
pub fn descendants_of(comments: &[Comment], root_id: i64) -> Vec<i64> {
    let mut result = vec![root_id];
    let mut index = 0;
    while index < result.len() {
        let current = result[index];
        result.extend(
            comments
                .iter()
                .filter(|c| c.parent_comment_id == Some(current))
                .map(|c| c.id),
        );
        index += 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn comment(id: i64, parent: Option<i64>, minutes: i64) -> Comment {
        let at = Utc::now() + Duration::minutes(minutes);
        Comment {
            id,
            post_id: 1,
            author_id: 100 + id,
            parent_comment_id: parent,
            content: format!("comment {id}"),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_tree_nesting_and_order() {
        let comments = vec![
            comment(3, Some(1), 3),
            comment(1, None, 1),
            comment(2, None, 2),
            comment(4, Some(3), 4),
            comment(5, Some(1), 0),
        ];
        let tree = build_comment_tree(&comments, &HashMap::new());

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].comment.id, 1);
        assert_eq!(tree[1].comment.id, 2);
        let replies: Vec<i64> = tree[0].replies.iter().map(|n| n.comment.id).collect();
        assert_eq!(replies, vec![5, 3]);
        assert_eq!(tree[0].replies[1].replies[0].comment.id, 4);
    }

    #[test]
    fn test_orphan_reply_becomes_root() {
        let comments = vec![comment(7, Some(99), 0)];
        let tree = build_comment_tree(&comments, &HashMap::new());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].comment.id, 7);
    }

    #[test]
    fn test_descendants_include_root() {
        let comments = vec![
            comment(1, None, 0),
            comment(2, Some(1), 1),
            comment(3, Some(2), 2),
            comment(4, None, 3),
        ];
        let mut ids = descendants_of(&comments, 1);
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(descendants_of(&comments, 4), vec![4]);
    }
}
