use crate::filter::CourseFilter;
use crate::models::{CourseChanges, CourseRow, LessonRow, NewCourse};
use crate::Database;
use anyhow::Result;
use rusqlite::types::Value;
use rusqlite::{Connection, Row, params_from_iter};

const COURSE_COLUMNS: &str = "c.id, c.title, c.description, c.slug, c.category_id, c.teacher_id,
        c.is_premium, c.thumbnail, c.created_at, c.updated_at,
        u.name, cat.name, cat.slug";

const COURSE_JOINS: &str = "FROM courses c
         JOIN users u ON u.id = c.teacher_id
         JOIN categories cat ON cat.id = c.category_id";

impl Database {
    // -- Courses --

    /// One page of courses matching `filter`, ordered by id.
    pub fn list_courses(&self, filter: &CourseFilter, limit: u32, offset: u64) -> Result<Vec<CourseRow>> {
        self.with_conn(|conn| query_courses(conn, filter, limit, offset))
    }

    pub fn count_courses(&self, filter: &CourseFilter) -> Result<u64> {
        self.with_conn(|conn| {
            let (where_sql, params) = filter.where_clause();
            let sql = format!("SELECT COUNT(*) FROM courses c {}", where_sql);
            let count: i64 = conn.query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))?;
            Ok(count as u64)
        })
    }

    pub fn get_course(&self, id: i64) -> Result<Option<CourseRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} {} WHERE c.id = ?1", COURSE_COLUMNS, COURSE_JOINS);
            conn.query_row(&sql, [id], course_from_row).optional()
        })
    }

    pub fn insert_course(&self, course: &NewCourse) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO courses (title, description, slug, category_id, teacher_id, is_premium, thumbnail)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    course.title,
                    course.description,
                    course.slug,
                    course.category_id,
                    course.teacher_id,
                    course.is_premium,
                    course.thumbnail,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Apply a partial update. Returns false when the course does not exist.
    pub fn update_course(&self, id: i64, changes: &CourseChanges) -> Result<bool> {
        let mut sets: Vec<&str> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(title) = &changes.title {
            sets.push("title = ?");
            params.push(Value::Text(title.clone()));
        }
        if let Some(slug) = &changes.slug {
            sets.push("slug = ?");
            params.push(Value::Text(slug.clone()));
        }
        if let Some(description) = &changes.description {
            sets.push("description = ?");
            params.push(Value::Text(description.clone()));
        }
        if let Some(category_id) = changes.category_id {
            sets.push("category_id = ?");
            params.push(Value::Integer(category_id));
        }
        if let Some(is_premium) = changes.is_premium {
            sets.push("is_premium = ?");
            params.push(Value::Integer(is_premium as i64));
        }
        if let Some(thumbnail) = &changes.thumbnail {
            sets.push("thumbnail = ?");
            params.push(Value::Text(thumbnail.clone()));
        }
        sets.push("updated_at = datetime('now')");
        params.push(Value::Integer(id));

        let sql = format!("UPDATE courses SET {} WHERE id = ?", sets.join(", "));
        self.with_conn(|conn| {
            let affected = conn.execute(&sql, params_from_iter(params.iter()))?;
            Ok(affected > 0)
        })
    }

    /// Delete a course (lessons and enrollments cascade). Returns false when
    /// nothing was deleted.
    pub fn delete_course(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM courses WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
    }

    // -- Related records --

    pub fn get_lessons(&self, course_id: i64) -> Result<Vec<LessonRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, position FROM lessons
                 WHERE course_id = ?1
                 ORDER BY position, id",
            )?;
            let rows = stmt
                .query_map([course_id], |row| {
                    Ok(LessonRow {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        position: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// True iff the user has an enrollment for the course with `is_enrolled` set.
    pub fn is_enrolled(&self, user_id: &str, course_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(
                    SELECT 1 FROM enrollments
                    WHERE user_id = ?1 AND course_id = ?2 AND is_enrolled = 1
                 )",
                rusqlite::params![user_id, course_id],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    pub fn category_exists(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1)",
                [id],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    pub fn user_exists(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let exists: bool =
                conn.query_row("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)", [id], |row| row.get(0))?;
            Ok(exists)
        })
    }

    // -- Reference data. Owned by other parts of the platform; these writes
    // exist for provisioning and tests. --

    pub fn create_user(&self, id: &str, name: &str, email: &str, role: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, email, role) VALUES (?1, ?2, ?3, ?4)",
                (id, name, email, role),
            )?;
            Ok(())
        })
    }

    pub fn create_category(&self, name: &str, slug: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute("INSERT INTO categories (name, slug) VALUES (?1, ?2)", (name, slug))?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn create_lesson(&self, course_id: i64, title: &str, position: i64) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO lessons (course_id, title, position) VALUES (?1, ?2, ?3)",
                rusqlite::params![course_id, title, position],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Insert or overwrite the enrollment flag for (user, course).
    pub fn set_enrollment(&self, user_id: &str, course_id: i64, is_enrolled: bool) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO enrollments (user_id, course_id, is_enrolled) VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id, course_id) DO UPDATE SET is_enrolled = excluded.is_enrolled",
                rusqlite::params![user_id, course_id, is_enrolled],
            )?;
            Ok(())
        })
    }
}

fn query_courses(conn: &Connection, filter: &CourseFilter, limit: u32, offset: u64) -> Result<Vec<CourseRow>> {
    let (where_sql, mut params) = filter.where_clause();
    let sql = format!(
        "SELECT {} {} {} ORDER BY c.id ASC LIMIT ? OFFSET ?",
        COURSE_COLUMNS, COURSE_JOINS, where_sql
    );
    params.push(Value::Integer(limit as i64));
    params.push(Value::Integer(offset as i64));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), course_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<CourseRow> {
    Ok(CourseRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        slug: row.get(3)?,
        category_id: row.get(4)?,
        teacher_id: row.get(5)?,
        is_premium: row.get(6)?,
        thumbnail: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
        teacher_name: row.get(10)?,
        category_name: row.get(11)?,
        category_slug: row.get(12)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
