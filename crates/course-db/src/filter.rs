use rusqlite::types::Value;

/// Listing filters. Each `Some` field contributes one predicate; `None`
/// means the filter is inactive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseFilter {
    /// Case-sensitive substring of title OR description.
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub is_premium: Option<bool>,
    pub teacher_id: Option<String>,
}

/// One SQL condition with its positional (`?`) parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub sql: &'static str,
    pub params: Vec<Value>,
}

impl CourseFilter {
    /// Predicates for the active filters, in a fixed order.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut out = Vec::new();

        if let Some(term) = &self.search {
            // instr() instead of LIKE: LIKE is case-insensitive for ASCII
            // and treats % and _ in the term as wildcards.
            out.push(Predicate {
                sql: "(instr(c.title, ?) > 0 OR instr(c.description, ?) > 0)",
                params: vec![Value::Text(term.clone()), Value::Text(term.clone())],
            });
        }
        if let Some(category_id) = self.category_id {
            out.push(Predicate {
                sql: "c.category_id = ?",
                params: vec![Value::Integer(category_id)],
            });
        }
        if let Some(is_premium) = self.is_premium {
            out.push(Predicate {
                sql: "c.is_premium = ?",
                params: vec![Value::Integer(is_premium as i64)],
            });
        }
        if let Some(teacher_id) = &self.teacher_id {
            out.push(Predicate {
                sql: "c.teacher_id = ?",
                params: vec![Value::Text(teacher_id.clone())],
            });
        }

        out
    }

    /// Render the predicates as a `WHERE` clause (empty when no filter is
    /// active) plus the flattened parameter list.
    pub fn where_clause(&self) -> (String, Vec<Value>) {
        let predicates = self.predicates();
        if predicates.is_empty() {
            return (String::new(), Vec::new());
        }

        let sql = predicates.iter().map(|p| p.sql).collect::<Vec<_>>().join(" AND ");
        let params = predicates.into_iter().flat_map(|p| p.params).collect();
        (format!("WHERE {}", sql), params)
    }
}
