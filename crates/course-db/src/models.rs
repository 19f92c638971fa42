//! Database row types — these map directly to SQLite rows.
//! Distinct from course-types API models to keep the DB layer independent.

/// A course joined with its teacher and category.
#[derive(Debug, Clone)]
pub struct CourseRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub category_id: i64,
    pub teacher_id: String,
    pub is_premium: bool,
    pub thumbnail: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub teacher_name: String,
    pub category_name: String,
    pub category_slug: String,
}

#[derive(Debug, Clone)]
pub struct LessonRow {
    pub id: i64,
    pub title: String,
    pub position: i64,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub slug: String,
    pub category_id: i64,
    pub teacher_id: String,
    pub is_premium: bool,
    pub thumbnail: Option<String>,
}

/// Column changes for a partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct CourseChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub is_premium: Option<bool>,
    pub thumbnail: Option<String>,
}
