use std::collections::BTreeMap;
use std::path::Path;

use bytes::Bytes;
use serde::Serialize;

use crate::form::{CourseForm, Upload};

pub const MAX_TITLE_CHARS: usize = 255;
/// 2048 KB
pub const MAX_THUMBNAIL_BYTES: usize = 2 * 1024 * 1024;

/// Accepted content types and the extension each is stored under.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/bmp", "bmp"),
];
const IMAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("jpg", "jpg"),
    ("jpeg", "jpg"),
    ("png", "png"),
    ("gif", "gif"),
    ("webp", "webp"),
    ("bmp", "bmp"),
];

/// Field name -> messages, serialized as the `errors` object of a 422.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// Validated input for creating a course.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreCourse {
    pub title: String,
    pub description: String,
    pub category_id: i64,
    pub is_premium: bool,
}

/// An upload that passed the image rule. `extension` is chosen here, never
/// taken verbatim from the client.
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub extension: &'static str,
    pub data: Bytes,
}

/// Validated input for a partial update; `None` means "not submitted".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateCourse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub is_premium: Option<bool>,
}

pub fn validate_store(form: CourseForm) -> Result<(StoreCourse, Option<Thumbnail>), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let title = required(&form, "title", &mut errors).and_then(|t| check_title(t, &mut errors));
    let description = required(&form, "description", &mut errors).map(str::to_string);
    let category_id = required(&form, "category_id", &mut errors)
        .and_then(|v| parse_integer("category_id", v, &mut errors));
    let is_premium = match form.text("is_premium") {
        Some(v) => parse_boolean("is_premium", v, &mut errors),
        None => Some(false),
    };
    let thumbnail = form
        .thumbnail
        .as_ref()
        .and_then(|upload| check_image("thumbnail", upload, &mut errors));

    match (title, description, category_id, is_premium) {
        (Some(title), Some(description), Some(category_id), Some(is_premium)) if errors.is_empty() => Ok((
            StoreCourse {
                title,
                description,
                category_id,
                is_premium,
            },
            thumbnail,
        )),
        _ => Err(errors),
    }
}

/// Every rule applies only when the field was submitted; a submitted but
/// blank required field is still an error.
pub fn validate_update(form: CourseForm) -> Result<(UpdateCourse, Option<Thumbnail>), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let mut update = UpdateCourse::default();

    if form.has("title") {
        update.title = required(&form, "title", &mut errors).and_then(|t| check_title(t, &mut errors));
    }
    if form.has("description") {
        update.description = required(&form, "description", &mut errors).map(str::to_string);
    }
    if form.has("category_id") {
        update.category_id = required(&form, "category_id", &mut errors)
            .and_then(|v| parse_integer("category_id", v, &mut errors));
    }
    if let Some(v) = form.text("is_premium") {
        update.is_premium = parse_boolean("is_premium", v, &mut errors);
    }
    let thumbnail = form
        .thumbnail
        .as_ref()
        .and_then(|upload| check_image("thumbnail", upload, &mut errors));

    errors.finish((update, thumbnail))
}

/// Strict boolean rule for submitted form values.
pub fn parse_bool_value(v: &str) -> Option<bool> {
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

fn label(field: &str) -> String {
    field.replace('_', " ")
}

fn required<'a>(form: &'a CourseForm, field: &str, errors: &mut ValidationErrors) -> Option<&'a str> {
    let value = form.text(field);
    if value.is_none() {
        errors.add(field, format!("The {} field is required.", label(field)));
    }
    value
}

fn check_title(title: &str, errors: &mut ValidationErrors) -> Option<String> {
    if title.chars().count() > MAX_TITLE_CHARS {
        errors.add(
            "title",
            format!("The title field must not be greater than {} characters.", MAX_TITLE_CHARS),
        );
        return None;
    }
    Some(title.to_string())
}

fn parse_integer(field: &str, v: &str, errors: &mut ValidationErrors) -> Option<i64> {
    match v.parse::<i64>() {
        Ok(n) => Some(n),
        Err(_) => {
            errors.add(field, format!("The {} field must be an integer.", label(field)));
            None
        }
    }
}

fn parse_boolean(field: &str, v: &str, errors: &mut ValidationErrors) -> Option<bool> {
    let parsed = parse_bool_value(v);
    if parsed.is_none() {
        errors.add(field, format!("The {} field must be true or false.", label(field)));
    }
    parsed
}

fn check_image(field: &str, upload: &Upload, errors: &mut ValidationErrors) -> Option<Thumbnail> {
    let extension = image_extension(upload);
    if extension.is_none() {
        errors.add(field, format!("The {} field must be an image.", label(field)));
    }
    if upload.data.len() > MAX_THUMBNAIL_BYTES {
        errors.add(
            field,
            format!(
                "The {} field must not be greater than {} kilobytes.",
                label(field),
                MAX_THUMBNAIL_BYTES / 1024
            ),
        );
        return None;
    }
    Some(Thumbnail {
        extension: extension?,
        data: upload.data.clone(),
    })
}

/// Storage extension for an image upload, or `None` when it is not one.
///
/// A declared content type must be an image type and decides the extension.
/// A file name extension, when present, must also be an image extension; it
/// only decides when the content type is missing or generic.
fn image_extension(upload: &Upload) -> Option<&'static str> {
    let from_name = match upload
        .file_name
        .as_deref()
        .and_then(|name| Path::new(name).extension())
    {
        Some(ext) => {
            let ext = ext.to_str()?.to_ascii_lowercase();
            Some(lookup(IMAGE_EXTENSIONS, &ext)?)
        }
        None => None,
    };

    let from_type = match upload.content_type.as_deref() {
        None | Some("application/octet-stream") => None,
        Some(ct) => Some(lookup(IMAGE_TYPES, &ct.to_ascii_lowercase())?),
    };

    from_type.or(from_name)
}

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, ext)| *ext)
}
