//! 预导入模块

pub use super::assignments::{
    ActiveModel as AssignmentActiveModel, Entity as Assignments, Model as AssignmentModel,
};
pub use super::comments::{ActiveModel as CommentActiveModel, Entity as Comments, Model as CommentModel};
pub use super::course_modules::{
    ActiveModel as CourseModuleActiveModel, Entity as CourseModules, Model as CourseModuleModel,
};
pub use super::course_users::{
    ActiveModel as CourseUserActiveModel, Entity as CourseUsers, Model as CourseUserModel,
};
pub use super::courses::{ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel};
pub use super::curriculums::{
    ActiveModel as CurriculumActiveModel, Entity as Curriculums, Model as CurriculumModel,
};
pub use super::forum_posts::{
    ActiveModel as ForumPostActiveModel, Entity as ForumPosts, Model as ForumPostModel,
};
pub use super::grades::{ActiveModel as GradeActiveModel, Entity as Grades, Model as GradeModel};
pub use super::majors::{ActiveModel as MajorActiveModel, Entity as Majors, Model as MajorModel};
pub use super::manual_grades::{
    ActiveModel as ManualGradeActiveModel, Entity as ManualGrades, Model as ManualGradeModel,
};
pub use super::notifications::{
    ActiveModel as NotificationActiveModel, Entity as Notifications, Model as NotificationModel,
};
pub use super::quiz_attempts::{
    ActiveModel as QuizAttemptActiveModel, Entity as QuizAttempts, Model as QuizAttemptModel,
};
pub use super::quizzes::{ActiveModel as QuizActiveModel, Entity as Quizzes, Model as QuizModel};
pub use super::submissions::{
    ActiveModel as SubmissionActiveModel, Entity as Submissions, Model as SubmissionModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
