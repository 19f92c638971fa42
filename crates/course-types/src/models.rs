use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Teacher,
    Admin,
}

/// The owner of a course. Teachers are ordinary users referenced by `teacher_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub title: String,
    pub position: i64,
}

/// A course with its eagerly loaded relations.
///
/// `lessons` is only populated on the detail read.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub is_premium: bool,
    pub thumbnail: Option<String>,
    pub teacher: Teacher,
    pub category: Category,
    pub lessons: Option<Vec<Lesson>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
