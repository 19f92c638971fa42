use std::fmt;

use tracing::info;
use uuid::Uuid;

use course_types::api::Claims;
use course_types::models::Course;

use crate::convert::course_from_row;
use crate::error::ApiError;
use crate::state::{AppState, with_db};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    Guest,
    Authenticated,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Guest => "guest",
            UserType::Authenticated => "authenticated",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who looked at a course and what they were told. Kept apart from the
/// response so logging never feeds back into it.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseAccess {
    pub course_id: i64,
    pub viewer_id: Option<Uuid>,
    pub is_authenticated: bool,
    pub user_type: UserType,
    pub is_enrolled: bool,
}

impl CourseAccess {
    pub fn emit(&self) {
        info!(
            course_id = self.course_id,
            viewer = ?self.viewer_id,
            is_authenticated = self.is_authenticated,
            user_type = %self.user_type,
            is_enrolled = self.is_enrolled,
            "Course detail access"
        );
    }
}

#[derive(Debug)]
pub struct CourseDetail {
    pub course: Course,
    pub access: CourseAccess,
}

/// Course with teacher, category and lessons, plus the viewer's enrollment
/// status. Anonymous viewers are never enrolled.
pub async fn show(state: &AppState, course_id: i64, viewer: Option<&Claims>) -> Result<CourseDetail, ApiError> {
    let viewer_id = viewer.map(|c| c.sub);

    let loaded = with_db(state, move |db| {
        let Some(row) = db.get_course(course_id)? else {
            return Ok(None);
        };
        let lessons = db.get_lessons(course_id)?;
        let is_enrolled = match viewer_id {
            Some(uid) => db.is_enrolled(&uid.to_string(), course_id)?,
            None => false,
        };
        Ok(Some((row, lessons, is_enrolled)))
    })
    .await?;

    let (row, lessons, is_enrolled) = loaded.ok_or(ApiError::NotFound("Course"))?;

    let access = CourseAccess {
        course_id,
        viewer_id,
        is_authenticated: viewer.is_some(),
        user_type: if viewer.is_some() {
            UserType::Authenticated
        } else {
            UserType::Guest
        },
        is_enrolled,
    };
    access.emit();

    Ok(CourseDetail {
        course: course_from_row(row, Some(lessons)),
        access,
    })
}
