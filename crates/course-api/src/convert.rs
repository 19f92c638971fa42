use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use course_db::models::{CourseRow, LessonRow};
use course_types::models::{Category, Course, Lesson, Teacher};

/// Map a joined course row (and, for detail reads, its lessons) to the
/// domain model. Corrupt columns are logged and defaulted rather than failing
/// the whole request.
pub fn course_from_row(row: CourseRow, lessons: Option<Vec<LessonRow>>) -> Course {
    let teacher_id = row.teacher_id.parse().unwrap_or_else(|e| {
        warn!("Corrupt teacher_id '{}' on course {}: {}", row.teacher_id, row.id, e);
        Uuid::default()
    });

    Course {
        id: row.id,
        title: row.title,
        description: row.description,
        slug: row.slug,
        is_premium: row.is_premium,
        thumbnail: row.thumbnail,
        teacher: Teacher {
            id: teacher_id,
            name: row.teacher_name,
        },
        category: Category {
            id: row.category_id,
            name: row.category_name,
            slug: row.category_slug,
        },
        lessons: lessons.map(|rows| {
            rows.into_iter()
                .map(|l| Lesson {
                    id: l.id,
                    title: l.title,
                    position: l.position,
                })
                .collect()
        }),
        created_at: parse_timestamp(&row.created_at, row.id),
        updated_at: parse_timestamp(&row.updated_at, row.id),
    }
}

fn parse_timestamp(raw: &str, course_id: i64) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            // Parse as naive UTC and convert.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on course {}: {}", raw, course_id, e);
            DateTime::default()
        })
}
