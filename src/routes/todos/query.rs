//! Listing query: raw query-string parameters normalised into a store query.

use serde::Deserialize;

use super::model::Priority;
use crate::error::AppError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    DueDate,
    Priority,
    Title,
    Category,
    Completed,
}

impl SortField {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "createdAt" => SortField::CreatedAt,
            "dueDate" => SortField::DueDate,
            "priority" => SortField::Priority,
            "title" => SortField::Title,
            "category" => SortField::Category,
            "completed" => SortField::Completed,
            _ => return None,
        })
    }

    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::DueDate => "due_date",
            SortField::Priority => "priority",
            SortField::Title => "title",
            SortField::Category => "category",
            SortField::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Only the literal `desc` is descending.
    fn parse(value: &str) -> Self {
        if value == "desc" {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Equality and text filters shared by the count and the page fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoFilter {
    pub search_terms: Vec<String>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TodoQuery {
    pub filter: TodoFilter,
    pub page: i64,
    pub limit: i64,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for TodoQuery {
    fn default() -> Self {
        Self {
            filter: TodoFilter::default(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl TodoQuery {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            (total + self.limit - 1) / self.limit
        }
    }
}

/// Query string of `GET /api/todos`, as sent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub completed: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl TryFrom<ListParams> for TodoQuery {
    type Error = AppError;

    fn try_from(params: ListParams) -> Result<Self, Self::Error> {
        let priority = match non_empty(params.priority) {
            Some(p) => Some(
                p.parse::<Priority>()
                    .map_err(|e| AppError::BadRequest(e.to_string()))?,
            ),
            None => None,
        };

        let sort_by = match non_empty(params.sort_by) {
            Some(name) => SortField::parse(&name)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid sort field {name:?}")))?,
            None => SortField::default(),
        };

        Ok(TodoQuery {
            filter: TodoFilter {
                search_terms: params.search.as_deref().map(search_terms).unwrap_or_default(),
                priority,
                category: non_empty(params.category),
                completed: non_empty(params.completed).map(|c| c == "true"),
            },
            page: params.page.unwrap_or(DEFAULT_PAGE).max(1),
            limit: params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            sort_by,
            sort_order: non_empty(params.sort_order)
                .map(|o| SortOrder::parse(&o))
                .unwrap_or_default(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Lower-cased alphanumeric words of `text`, deduplicated, in order.
pub fn search_terms(text: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let word = word.to_lowercase();
        if !terms.contains(&word) {
            terms.push(word);
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(params: ListParams) -> TodoQuery {
        TodoQuery::try_from(params).unwrap()
    }

    #[test]
    fn defaults_apply_when_nothing_is_given() {
        assert_eq!(query(ListParams::default()), TodoQuery::default());
    }

    #[test]
    fn page_and_limit_are_clamped() {
        let q = query(ListParams {
            page: Some(-3),
            limit: Some(0),
            ..Default::default()
        });
        assert_eq!((q.page, q.limit), (1, 1));

        let q = query(ListParams {
            limit: Some(10_000),
            ..Default::default()
        });
        assert_eq!(q.limit, MAX_LIMIT);
    }

    #[test]
    fn total_pages_rounds_up() {
        let q = TodoQuery::default();
        assert_eq!(q.total_pages(0), 0);
        assert_eq!(q.total_pages(10), 1);
        assert_eq!(q.total_pages(25), 3);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let q = TodoQuery {
            page: 3,
            limit: 10,
            ..Default::default()
        };
        assert_eq!(q.offset(), 20);
    }

    #[test]
    fn completed_is_true_only_for_literal_true() {
        let parse = |v: &str| {
            query(ListParams {
                completed: Some(v.into()),
                ..Default::default()
            })
            .filter
            .completed
        };
        assert_eq!(parse("true"), Some(true));
        assert_eq!(parse("false"), Some(false));
        assert_eq!(parse("yes"), Some(false));
        assert_eq!(parse(""), None);
    }

    #[test]
    fn anything_but_desc_sorts_ascending() {
        let order = |v: &str| {
            query(ListParams {
                sort_order: Some(v.into()),
                ..Default::default()
            })
            .sort_order
        };
        assert_eq!(order("desc"), SortOrder::Desc);
        assert_eq!(order("asc"), SortOrder::Asc);
        assert_eq!(order("DESC"), SortOrder::Asc);
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        let err = TodoQuery::try_from(ListParams {
            sort_by: Some("password".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn unknown_priority_is_rejected() {
        let err = TodoQuery::try_from(ListParams {
            priority: Some("urgent".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn search_terms_split_and_lowercase() {
        assert_eq!(
            search_terms("Buy MILK, buy eggs!"),
            vec!["buy", "milk", "eggs"]
        );
        assert!(search_terms("  !!  ").is_empty());
    }
}
