use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Category, Course, Lesson, Role, Teacher};

// -- JWT Claims --

/// Bearer token claims. Tokens are issued elsewhere; this service only
/// verifies them and reads the caller's identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    pub exp: usize,
}

// -- Listing --

/// Raw `GET /courses` query string. Values stay as strings because each
/// filter has its own presence rule (see `course_api::query`).
#[derive(Debug, Default, Deserialize)]
pub struct ListCoursesQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub is_premium: Option<String>,
    pub teacher: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageMeta {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub from: Option<u64>,
    pub to: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CourseCollection {
    pub data: Vec<CourseResource>,
    pub meta: PageMeta,
}

// -- Course representation --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseResource {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_premium: bool,
    pub teacher: Teacher,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub lessons: Option<Vec<Lesson>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CourseResource {
    /// Build the wire representation. `public_url` is the externally visible
    /// base the `/storage` mount is served from.
    pub fn from_course(course: Course, public_url: &str) -> Self {
        let thumbnail_url = course
            .thumbnail
            .as_ref()
            .map(|path| format!("{}/storage/{}", public_url.trim_end_matches('/'), path));

        Self {
            id: course.id,
            title: course.title,
            slug: course.slug,
            description: course.description,
            thumbnail: course.thumbnail,
            thumbnail_url,
            is_premium: course.is_premium,
            teacher: course.teacher,
            category: course.category,
            lessons: course.lessons,
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CourseEnvelope {
    pub data: CourseResource,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CourseDetailEnvelope {
    pub data: CourseResource,
    pub is_enrolled: bool,
    pub user_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub message: String,
}
