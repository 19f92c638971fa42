use course_types::api::Claims;
use course_types::models::{Course, Role};

/// Only the course's teacher or an admin may delete it.
pub fn can_delete(user: &Claims, course: &Course) -> bool {
    user.role == Role::Admin || user.sub == course.teacher.id
}
