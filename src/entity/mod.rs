//! SeaORM 实体定义
//!
//! 与 models 中的业务实体分离：时间以 Unix 秒存储，嵌套结构以 JSON 文本存储，
//! Storage 层负责在两者之间转换。

pub mod prelude;

pub mod assignments;
pub mod comments;
pub mod course_modules;
pub mod course_users;
pub mod courses;
pub mod curriculums;
pub mod forum_posts;
pub mod grades;
pub mod majors;
pub mod manual_grades;
pub mod notifications;
pub mod quiz_attempts;
pub mod quizzes;
pub mod submissions;
pub mod users;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

pub(crate) fn to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}

pub(crate) fn to_datetime_opt(ts: Option<i64>) -> Option<DateTime<Utc>> {
    ts.map(to_datetime)
}

/// 解析 JSON 文本列，损坏的数据记录警告并回落到默认值
pub(crate) fn from_json_column<T: DeserializeOwned + Default>(table: &str, id: i64, raw: &str) -> T {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!("Corrupted JSON column in {} #{}: {}", table, id, e);
        T::default()
    })
}
