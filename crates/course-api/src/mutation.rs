use tracing::{info, warn};

use course_db::models::{CourseChanges, NewCourse};
use course_types::api::Claims;
use course_types::models::Course;

use crate::convert::course_from_row;
use crate::error::ApiError;
use crate::policy;
use crate::slug::slugify;
use crate::state::{AppState, with_db};
use crate::validation::{StoreCourse, Thumbnail, UpdateCourse, ValidationErrors};

/// Storage namespace for course thumbnails.
pub const THUMBNAIL_DIR: &str = "courses";

/// Create a course owned by `creator`. The thumbnail is stored first; if the
/// insert then fails the stored file is removed again.
pub async fn create(
    state: &AppState,
    input: StoreCourse,
    creator: &Claims,
    thumbnail: Option<Thumbnail>,
) -> Result<Course, ApiError> {
    let teacher_id = creator.sub.to_string();

    let category_id = input.category_id;
    let tid = teacher_id.clone();
    // Checked up front so a bad reference costs no upload. The foreign keys on
    // `courses` still reject a category or user removed before the insert.
    let (category_ok, teacher_ok) = with_db(state, move |db| {
        Ok((db.category_exists(category_id)?, db.user_exists(&tid)?))
    })
    .await?;

    if !category_ok {
        return Err(invalid_category().into());
    }
    if !teacher_ok {
        return Err(ApiError::NotFound("Teacher"));
    }

    let thumbnail_path = match &thumbnail {
        Some(upload) => Some(store_thumbnail(state, upload).await?),
        None => None,
    };

    let new_course = NewCourse {
        slug: slugify(&input.title),
        title: input.title,
        description: input.description,
        category_id: input.category_id,
        teacher_id,
        is_premium: input.is_premium,
        thumbnail: thumbnail_path.clone(),
    };

    let course_id = match with_db(state, move |db| db.insert_course(&new_course)).await {
        Ok(id) => id,
        Err(e) => {
            discard_thumbnail(state, thumbnail_path.as_deref()).await;
            return Err(e);
        }
    };

    info!("Course {} created by {}", course_id, creator.sub);
    load(state, course_id).await
}

/// Partial update. A new thumbnail is stored before the row changes and the
/// old file is only removed once the row points at the new one.
pub async fn update(
    state: &AppState,
    course_id: i64,
    input: UpdateCourse,
    thumbnail: Option<Thumbnail>,
) -> Result<Course, ApiError> {
    let existing = load(state, course_id).await?;

    if let Some(category_id) = input.category_id {
        if !with_db(state, move |db| db.category_exists(category_id)).await? {
            return Err(invalid_category().into());
        }
    }

    let new_thumbnail = match &thumbnail {
        Some(upload) => Some(store_thumbnail(state, upload).await?),
        None => None,
    };

    let changes = CourseChanges {
        slug: input.title.as_deref().map(slugify),
        title: input.title,
        description: input.description,
        category_id: input.category_id,
        is_premium: input.is_premium,
        thumbnail: new_thumbnail.clone(),
    };

    match with_db(state, move |db| db.update_course(course_id, &changes)).await {
        Ok(true) => {}
        Ok(false) => {
            discard_thumbnail(state, new_thumbnail.as_deref()).await;
            return Err(ApiError::NotFound("Course"));
        }
        Err(e) => {
            discard_thumbnail(state, new_thumbnail.as_deref()).await;
            return Err(e);
        }
    }

    if new_thumbnail.is_some() {
        discard_thumbnail(state, existing.thumbnail.as_deref()).await;
    }

    info!("Course {} updated", course_id);
    load(state, course_id).await
}

/// Delete a course the requester is allowed to delete. The thumbnail is
/// removed after the row; failing to remove it is logged, not returned.
pub async fn destroy(state: &AppState, course_id: i64, requester: &Claims) -> Result<(), ApiError> {
    let course = load(state, course_id).await?;

    if !policy::can_delete(requester, &course) {
        warn!("User {} may not delete course {}", requester.sub, course_id);
        return Err(ApiError::Forbidden);
    }

    if !with_db(state, move |db| db.delete_course(course_id)).await? {
        return Err(ApiError::NotFound("Course"));
    }

    discard_thumbnail(state, course.thumbnail.as_deref()).await;

    info!("Course {} deleted by {}", course_id, requester.sub);
    Ok(())
}

async fn load(state: &AppState, course_id: i64) -> Result<Course, ApiError> {
    with_db(state, move |db| db.get_course(course_id))
        .await?
        .map(|row| course_from_row(row, None))
        .ok_or(ApiError::NotFound("Course"))
}

async fn store_thumbnail(state: &AppState, thumbnail: &Thumbnail) -> Result<String, ApiError> {
    state
        .storage
        .store(THUMBNAIL_DIR, thumbnail.extension, &thumbnail.data)
        .await
        .map_err(ApiError::Storage)
}

/// Best-effort removal of a stored file.
async fn discard_thumbnail(state: &AppState, path: Option<&str>) {
    let Some(path) = path else {
        return;
    };
    if let Err(e) = state.storage.delete(path).await {
        warn!("Failed to delete thumbnail {}: {:#}", path, e);
    }
}

fn invalid_category() -> ValidationErrors {
    ValidationErrors::single("category_id", "The selected category id is invalid.")
}
