use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                email       TEXT NOT NULL UNIQUE,
                role        TEXT NOT NULL DEFAULT 'student',
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE categories (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                slug        TEXT NOT NULL UNIQUE
            );

            CREATE TABLE courses (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                title       TEXT NOT NULL,
                description TEXT NOT NULL,
                slug        TEXT NOT NULL,
                category_id INTEGER NOT NULL REFERENCES categories(id),
                teacher_id  TEXT NOT NULL REFERENCES users(id),
                is_premium  INTEGER NOT NULL DEFAULT 0,
                thumbnail   TEXT,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_courses_category ON courses(category_id);
            CREATE INDEX idx_courses_teacher ON courses(teacher_id);

            CREATE TABLE lessons (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                course_id   INTEGER NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
                title       TEXT NOT NULL,
                position    INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX idx_lessons_course ON lessons(course_id, position);

            CREATE TABLE enrollments (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     TEXT NOT NULL REFERENCES users(id),
                course_id   INTEGER NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
                is_enrolled INTEGER NOT NULL DEFAULT 1,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(user_id, course_id)
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
