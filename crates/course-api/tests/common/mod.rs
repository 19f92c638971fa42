#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use course_api::state::{AppState, AppStateInner};
use course_db::Database;
use course_db::models::NewCourse;
use course_storage::Storage;
use course_types::api::Claims;
use course_types::models::Role;

pub const SECRET: &str = "test-secret";
pub const PUBLIC_URL: &str = "http://courses.test";

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub teacher: Uuid,
    pub other_teacher: Uuid,
    pub student: Uuid,
    pub admin: Uuid,
    pub category: i64,
    pub other_category: i64,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_in_memory().unwrap();
        let storage = Storage::new(dir.path().join("public")).await.unwrap();

        let teacher = Uuid::new_v4();
        let other_teacher = Uuid::new_v4();
        let student = Uuid::new_v4();
        let admin = Uuid::new_v4();
        db.create_user(&teacher.to_string(), "Grace Hopper", "grace@example.com", "teacher").unwrap();
        db.create_user(&other_teacher.to_string(), "Alan Turing", "alan@example.com", "teacher").unwrap();
        db.create_user(&student.to_string(), "Sam Student", "sam@example.com", "student").unwrap();
        db.create_user(&admin.to_string(), "Ada Admin", "ada@example.com", "admin").unwrap();
        let category = db.create_category("Programming", "programming").unwrap();
        let other_category = db.create_category("Design", "design").unwrap();

        let state: AppState = Arc::new(AppStateInner {
            db,
            storage,
            jwt_secret: SECRET.to_string(),
            public_url: PUBLIC_URL.to_string(),
        });
        let router = course_api::router(state.clone());

        Self {
            state,
            router,
            teacher,
            other_teacher,
            student,
            admin,
            category,
            other_category,
            _dir: dir,
        }
    }

    pub fn claims(&self, user: Uuid, role: Role) -> Claims {
        Claims {
            sub: user,
            name: "test user".into(),
            role,
            exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
        }
    }

    pub fn token(&self, user: Uuid, role: Role) -> String {
        encode(
            &Header::default(),
            &self.claims(user, role),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    pub fn seed_course(&self, title: &str, description: &str, category_id: i64, is_premium: bool) -> i64 {
        self.seed_course_for(self.teacher, title, description, category_id, is_premium, None)
    }

    pub fn seed_course_for(
        &self,
        teacher: Uuid,
        title: &str,
        description: &str,
        category_id: i64,
        is_premium: bool,
        thumbnail: Option<&str>,
    ) -> i64 {
        self.state
            .db
            .insert_course(&NewCourse {
                title: title.into(),
                description: description.into(),
                slug: course_api::slug::slugify(title),
                category_id,
                teacher_id: teacher.to_string(),
                is_premium,
                thumbnail: thumbnail.map(str::to_string),
            })
            .unwrap()
    }

    /// Put a real file into storage and return its relative path.
    pub async fn stored_file(&self, extension: &str) -> String {
        self.state.storage.store("courses", extension, b"old-image").await.unwrap()
    }

    /// File names currently under the thumbnail directory.
    pub fn thumbnail_files(&self) -> Vec<String> {
        match std::fs::read_dir(self.state.storage.root().join("courses")) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut req = Request::get(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        let req = Request::delete(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        self.send(req).await
    }

    pub async fn submit(&self, method: &str, uri: &str, token: Option<&str>, form: MultipartBody) -> (StatusCode, Value) {
        let (content_type, body) = form.finish();
        let mut req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(req.body(Body::from(body)).unwrap()).await
    }

    /// Install a trigger that makes every write of `event` on `courses` fail.
    pub fn refuse_course_writes(&self, event: &str) {
        let sql = format!(
            "CREATE TRIGGER refuse_course_{0} BEFORE {0} ON courses
             BEGIN SELECT RAISE(ABORT, 'course writes refused'); END;",
            event.to_ascii_lowercase()
        );
        self.state
            .db
            .with_conn(|conn| {
                conn.execute_batch(&sql)?;
                Ok(())
            })
            .unwrap();
    }

    pub fn course_count(&self) -> u64 {
        self.state.db.count_courses(&Default::default()).unwrap()
    }
}

/// Minimal `multipart/form-data` encoder for requests.
pub struct MultipartBody {
    boundary: String,
    buf: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: format!("----course-test-{}", Uuid::new_v4().simple()),
            buf: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    /// A part with a content type but no file name.
    pub fn part(mut self, name: &str, content_type: &str, data: &[u8]) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, content_type
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.buf.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (format!("multipart/form-data; boundary={}", self.boundary), self.buf)
    }
}
