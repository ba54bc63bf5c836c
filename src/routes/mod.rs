pub mod assignments;
pub mod auth;
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

pub use assignments::configure_assignment_routes;
pub use auth::configure_auth_routes;
pub use course_users::configure_course_user_routes;
pub use courses::configure_course_routes;
pub use forum::configure_forum_routes;
pub use gradebook::configure_gradebook_routes;
pub use majors::configure_major_routes;
pub use modules::configure_module_routes;
pub use notifications::configure_notification_routes;
pub use quizzes::configure_quiz_routes;
pub use submissions::configure_submission_routes;
pub use users::configure_user_routes;

use actix_web::web;

/// 注册全部路由
///
/// actix 的 scope 按前缀匹配，`/api/v1/courses/{course_id}/...` 与
/// `/api/v1/assignments/{assignment_id}/submissions` 必须先于父级 scope 注册。
pub fn configure_all(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_auth_routes)
        .configure(configure_user_routes)
        .configure(configure_major_routes)
        .configure(configure_course_user_routes)
        .configure(configure_module_routes)
        .configure(configure_submission_routes)
        .configure(configure_assignment_routes)
        .configure(configure_gradebook_routes)
        .configure(configure_forum_routes)
        .configure(configure_quiz_routes)
        .configure(configure_course_routes)
        .configure(configure_notification_routes);
}
