use course_db::CourseFilter;
use course_types::api::{ListCoursesQuery, PageMeta};
use course_types::models::Course;

use crate::convert::course_from_row;
use crate::error::ApiError;
use crate::state::{AppState, with_db};
use crate::validation::ValidationErrors;

pub const PER_PAGE: u32 = 16;

/// Parsed listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    pub filter: CourseFilter,
    pub page: u32,
}

#[derive(Debug)]
pub struct CoursePage {
    pub courses: Vec<Course>,
    pub meta: PageMeta,
}

impl ListParams {
    /// Presence rules differ per filter:
    /// `search`, `category` and `teacher` apply only when non-blank (and a
    /// `category` of `0` counts as blank); `is_premium` applies whenever the
    /// key is present, so `is_premium=false` selects free courses.
    pub fn from_query(query: &ListCoursesQuery) -> Result<Self, ValidationErrors> {
        let search = non_blank(&query.search).map(str::to_string);

        let category_id = match non_blank(&query.category).filter(|v| *v != "0") {
            Some(v) => Some(v.parse::<i64>().map_err(|_| {
                ValidationErrors::single("category", "The category filter must be an integer.")
            })?),
            None => None,
        };

        let is_premium = query.is_premium.as_deref().map(flag_is_true);
        let teacher_id = non_blank(&query.teacher).map(str::to_string);

        let page = query
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        Ok(Self {
            filter: CourseFilter {
                search,
                category_id,
                is_premium,
                teacher_id,
            },
            page,
        })
    }

    fn offset(&self) -> u64 {
        (self.page as u64 - 1) * PER_PAGE as u64
    }
}

/// Lenient flag reading for query strings: `1`, `true`, `on` and `yes` are
/// true, anything else (including an empty value) is false.
pub fn flag_is_true(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "on" | "yes")
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// One page of courses with teacher and category attached.
pub async fn list(state: &AppState, params: ListParams) -> Result<CoursePage, ApiError> {
    let offset = params.offset();
    let filter = params.filter.clone();

    let (rows, total) = with_db(state, move |db| {
        let total = db.count_courses(&filter)?;
        let rows = db.list_courses(&filter, PER_PAGE, offset)?;
        Ok((rows, total))
    })
    .await?;

    let count = rows.len() as u64;
    let meta = PageMeta {
        current_page: params.page,
        last_page: total.div_ceil(PER_PAGE as u64).max(1) as u32,
        per_page: PER_PAGE,
        total,
        from: (count > 0).then_some(offset + 1),
        to: (count > 0).then_some(offset + count),
    };

    Ok(CoursePage {
        courses: rows.into_iter().map(|row| course_from_row(row, None)).collect(),
        meta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> ListCoursesQuery {
        let mut q = ListCoursesQuery::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "search" => q.search = v,
                "category" => q.category = v,
                "is_premium" => q.is_premium = v,
                "teacher" => q.teacher = v,
                "page" => q.page = v,
                _ => unreachable!(),
            }
        }
        q
    }

    #[test]
    fn empty_query_has_no_filters() {
        let params = ListParams::from_query(&query(&[])).unwrap();
        assert_eq!(params.filter, CourseFilter::default());
        assert_eq!(params.page, 1);
    }

    #[test]
    fn blank_values_are_ignored_except_is_premium() {
        let params = ListParams::from_query(&query(&[
            ("search", ""),
            ("category", "0"),
            ("teacher", "  "),
            ("is_premium", ""),
        ]))
        .unwrap();
        assert_eq!(params.filter.search, None);
        assert_eq!(params.filter.category_id, None);
        assert_eq!(params.filter.teacher_id, None);
        assert_eq!(params.filter.is_premium, Some(false));
    }

    #[test]
    fn premium_flag_values() {
        for (raw, expected) in [("1", true), ("true", true), ("Yes", true), ("0", false), ("false", false), ("nope", false)] {
            let params = ListParams::from_query(&query(&[("is_premium", raw)])).unwrap();
            assert_eq!(params.filter.is_premium, Some(expected), "is_premium={}", raw);
        }
    }

    #[test]
    fn bad_category_is_a_validation_error() {
        let errors = ListParams::from_query(&query(&[("category", "abc")])).unwrap_err();
        assert!(errors.get("category").is_some());
    }

    #[test]
    fn page_defaults_and_offsets() {
        assert_eq!(ListParams::from_query(&query(&[("page", "0")])).unwrap().page, 1);
        assert_eq!(ListParams::from_query(&query(&[("page", "x")])).unwrap().page, 1);
        let third = ListParams::from_query(&query(&[("page", "3")])).unwrap();
        assert_eq!(third.offset(), 32);
    }
}
