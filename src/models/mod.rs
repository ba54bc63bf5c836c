pub mod assignments;
pub mod auth;
pub mod common;
pub mod course_users;
pub mod courses;
pub mod forum;
pub mod gradebook;
pub mod majors;
pub mod modules;
pub mod notifications;
pub mod quizzes;
pub mod submissions;
pub mod users;

pub use common::pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use common::response::ApiResponse;

use serde::{Deserialize, Serialize};

/// 业务错误码
///
/// 0 表示成功；1xxx 通用；2xxx 认证与用户；3xxx 课程与成员；4xxx 作业与提交；
/// 5xxx 测验；6xxx 成绩；7xxx 论坛；8xxx 通知。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    AuthFailed = 2000,
    RegisterFailed = 2001,
    UserNotFound = 2004,
    UserAlreadyExists = 2005,
    UserNameInvalid = 2006,
    UserEmailInvalid = 2007,
    UserPasswordInvalid = 2008,
    UserNameAlreadyExists = 2009,
    UserEmailAlreadyExists = 2010,
    UserUpdateFailed = 2011,
    CanNotDeleteCurrentUser = 2012,
    MajorNotFound = 2100,
    MajorAlreadyExists = 2101,
    CurriculumNotFound = 2110,

    CourseNotFound = 3000,
    CourseAlreadyExists = 3001,
    CoursePermissionDenied = 3003,
    CourseArchived = 3004,
    GradingSchemeInvalid = 3005,
    EnrollmentKeyInvalid = 3006,
    CourseAlreadyJoined = 3007,
    CourseUserNotFound = 3008,
    InstructorCannotLeave = 3009,
    ModuleNotFound = 3100,

    AssignmentNotFound = 4000,
    SubmissionNotFound = 4001,
    SubmissionLateNotAllowed = 4002,
    SubmissionAttemptsExceeded = 4003,
    SubmissionStatusInvalid = 4004,
    GradeOutOfRange = 4005,

    QuizNotFound = 5000,
    QuizInvalid = 5001,
    QuizNotAvailable = 5002,
    QuizAttemptsExceeded = 5003,
    QuizAttemptNotFound = 5004,
    QuizAttemptClosed = 5005,
    QuizTimeExpired = 5006,

    GradeNotFound = 6000,
    ManualGradeNotFound = 6001,

    PostNotFound = 7000,
    PostLocked = 7001,
    CommentNotFound = 7002,

    NotificationNotFound = 8000,
}

/// 进程启动时间
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 定义以小写字符串存储的枚举
///
/// 生成字符串常量、`as_str()`、带中文提示的 `Deserialize`、`Display` 与 `FromStr`。
/// 序列化由调用方 derive 的 `Serialize` 配合 `rename_all = "snake_case"` 完成。
#[macro_export]
macro_rules! define_string_enum {
    ($name:ident, $label:literal { $($variant:ident => $konst:ident = $value:literal),+ $(,)? }) => {
        impl $name {
            $(pub const $konst: &'static str = $value;)+

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                s.parse::<$name>().map_err(|_| {
                    serde::de::Error::custom(format!(
                        concat!("无效的", $label, ": '{}'. 支持的取值: {}"),
                        s,
                        [$($value),+].join(", ")
                    ))
                })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    _ => Err(format!(concat!("Invalid ", $label, ": {}"), s)),
                }
            }
        }
    };
}
