use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use course_types::api::{
    Claims, CourseCollection, CourseDetailEnvelope, CourseEnvelope, CourseResource, DeletedResponse,
    ListCoursesQuery,
};

use crate::detail;
use crate::error::ApiError;
use crate::form::CourseForm;
use crate::middleware::Viewer;
use crate::mutation;
use crate::query::{self, ListParams};
use crate::state::AppState;
use crate::validation::{validate_store, validate_update};

/// GET /courses
pub async fn index(
    State(state): State<AppState>,
    Query(raw): Query<ListCoursesQuery>,
) -> Result<Json<CourseCollection>, ApiError> {
    let params = ListParams::from_query(&raw)?;
    let page = query::list(&state, params).await?;

    Ok(Json(CourseCollection {
        data: page
            .courses
            .into_iter()
            .map(|c| CourseResource::from_course(c, &state.public_url))
            .collect(),
        meta: page.meta,
    }))
}

/// POST /courses — multipart form; the creator becomes the teacher.
pub async fn store(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = CourseForm::from_multipart(multipart).await?;
    let (input, thumbnail) = validate_store(form)?;

    let course = mutation::create(&state, input, &claims, thumbnail).await?;

    Ok((
        StatusCode::CREATED,
        Json(CourseEnvelope {
            data: CourseResource::from_course(course, &state.public_url),
        }),
    ))
}

/// GET /courses/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
    Extension(Viewer(viewer)): Extension<Viewer>,
) -> Result<Json<CourseDetailEnvelope>, ApiError> {
    let detail = detail::show(&state, course_id, viewer.as_ref()).await?;

    Ok(Json(CourseDetailEnvelope {
        data: CourseResource::from_course(detail.course, &state.public_url),
        is_enrolled: detail.access.is_enrolled,
        user_type: detail.access.user_type.to_string(),
    }))
}

/// PUT|PATCH /courses/{id} — multipart form, any subset of fields.
pub async fn update(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
    Extension(_claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<Json<CourseEnvelope>, ApiError> {
    let form = CourseForm::from_multipart(multipart).await?;
    let (input, thumbnail) = validate_update(form)?;

    let course = mutation::update(&state, course_id, input, thumbnail).await?;

    Ok(Json(CourseEnvelope {
        data: CourseResource::from_course(course, &state.public_url),
    }))
}

/// DELETE /courses/{id}
pub async fn destroy(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DeletedResponse>, ApiError> {
    mutation::destroy(&state, course_id, &claims).await?;

    Ok(Json(DeletedResponse {
        message: "Course deleted successfully".to_string(),
    }))
}

/// GET /health — liveness check (no auth).
pub async fn health() -> &'static str {
    "ok"
}
