//! Builds store-neutral queries for the report listing modes.
//!
//! Every query produced here leaves the photo out of the projection; only
//! single-report reads and the photo endpoint ever load image bytes.

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::reports::dtos::{
    CategoryProjection, ListReportsQuery, RelatedReportsQuery, ReportFiltersDto,
    ReportSortField, SearchReportsDto, SortDirection, TextSearchQuery, ALL_CATEGORIES,
    DEFAULT_LIST_LIMIT, DEFAULT_SEARCH_LIMIT, MAX_LIST_LIMIT,
};
use crate::features::reports::models::Report;

/// Text columns that may be filtered on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Item,
    Project,
    Author,
    Contractor,
    Subject,
    Remarks,
    Description,
    Action,
}

impl TextField {
    pub fn column(&self) -> &'static str {
        match self {
            TextField::Item => "r.item",
            TextField::Project => "r.project",
            TextField::Author => "r.author",
            TextField::Contractor => "r.contractor",
            TextField::Subject => "r.subject",
            TextField::Remarks => "r.remarks",
            TextField::Description => "r.description",
            TextField::Action => "r.action",
        }
    }

    #[cfg(test)]
    pub fn value<'a>(&self, report: &'a Report) -> &'a str {
        match self {
            TextField::Item => &report.item,
            TextField::Project => &report.project,
            TextField::Author => &report.author,
            TextField::Contractor => &report.contractor,
            TextField::Subject => &report.subject,
            TextField::Remarks => &report.remarks,
            TextField::Description => &report.description,
            TextField::Action => &report.action,
        }
    }
}

/// One condition of a report query; conditions are AND-ed
#[derive(Debug, Clone, PartialEq)]
pub enum ReportFilter {
    /// Field equals one of the values
    TextIn(TextField, Vec<String>),
    StatusIn(Vec<bool>),
    CategoryIn(Vec<Uuid>),
    /// Exclude one report
    IdNot(Uuid),
    /// Case-insensitive literal substring of `item`
    ItemContains(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: ReportSortField,
    pub direction: SortDirection,
}

/// Which parts of a report the store should return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    pub include_photo: bool,
    pub category: CategoryProjection,
}

impl Projection {
    fn listing(category: CategoryProjection) -> Self {
        Self {
            include_photo: false,
            category,
        }
    }
}

/// A store query: filter, sort, skip, limit and projection
#[derive(Debug, Clone, PartialEq)]
pub struct ReportQuery {
    pub filters: Vec<ReportFilter>,
    pub sort: Option<SortSpec>,
    pub skip: i64,
    pub limit: Option<i64>,
    pub projection: Projection,
}

fn clamp_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, MAX_LIST_LIMIT)
}

/// `GET /reports`: sorted, limited, category populated.
pub fn list_query(params: &ListReportsQuery) -> ReportQuery {
    ReportQuery {
        filters: Vec::new(),
        sort: Some(SortSpec {
            field: params.sort_by.unwrap_or_default(),
            direction: params.order.unwrap_or(SortDirection::Asc),
        }),
        skip: 0,
        limit: Some(clamp_limit(params.limit, DEFAULT_LIST_LIMIT)),
        projection: Projection::listing(CategoryProjection::Populated),
    }
}

/// Reports sharing `current`'s category, excluding `current` itself.
pub fn related_query(current: &Report, params: &RelatedReportsQuery) -> ReportQuery {
    ReportQuery {
        filters: vec![
            ReportFilter::IdNot(current.id),
            ReportFilter::CategoryIn(vec![current.category_id]),
        ],
        sort: None,
        skip: 0,
        limit: Some(clamp_limit(params.limit, DEFAULT_LIST_LIMIT)),
        projection: Projection::listing(CategoryProjection::Reduced),
    }
}

fn push_text(filters: &mut Vec<ReportFilter>, field: TextField, values: &[String]) {
    if !values.is_empty() {
        filters.push(ReportFilter::TextIn(field, values.to_vec()));
    }
}

fn is_empty_filter(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Array(values) => values.is_empty(),
        _ => false,
    }
}

/// Map the allow-listed filter fields to conditions, skipping empty lists.
/// A non-empty value under any other key is rejected.
pub fn filters_from(dto: &ReportFiltersDto) -> Result<Vec<ReportFilter>> {
    if let Some(key) = dto
        .other
        .iter()
        .find(|(_, value)| !is_empty_filter(value))
        .map(|(key, _)| key)
    {
        return Err(AppError::BadRequest(format!(
            "Unknown filter field '{}'",
            key
        )));
    }

    let mut filters = Vec::new();

    push_text(&mut filters, TextField::Item, &dto.item);
    push_text(&mut filters, TextField::Project, &dto.project);
    push_text(&mut filters, TextField::Author, &dto.author);
    push_text(&mut filters, TextField::Contractor, &dto.contractor);
    push_text(&mut filters, TextField::Subject, &dto.subject);
    push_text(&mut filters, TextField::Remarks, &dto.remarks);
    push_text(&mut filters, TextField::Description, &dto.description);
    push_text(&mut filters, TextField::Action, &dto.action);

    if !dto.status.is_empty() {
        filters.push(ReportFilter::StatusIn(dto.status.clone()));
    }
    if !dto.category.is_empty() {
        filters.push(ReportFilter::CategoryIn(dto.category.clone()));
    }

    Ok(filters)
}

/// `POST /reports/by/search`: filtered, sorted (desc by default), paginated.
pub fn filtered_search_query(dto: &SearchReportsDto) -> Result<ReportQuery> {
    Ok(ReportQuery {
        filters: filters_from(&dto.filters)?,
        sort: Some(SortSpec {
            field: dto.sort_by.unwrap_or_default(),
            direction: dto.order.unwrap_or(SortDirection::Desc),
        }),
        skip: dto.skip.unwrap_or(0).max(0),
        limit: Some(clamp_limit(dto.limit, DEFAULT_SEARCH_LIMIT)),
        projection: Projection::listing(CategoryProjection::Populated),
    })
}

/// `GET /reports/search`. Returns `None` when there is no search term.
pub fn text_search_query(params: &TextSearchQuery) -> Result<Option<ReportQuery>> {
    let Some(term) = params.search.as_deref().filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let mut filters = vec![ReportFilter::ItemContains(term.to_string())];

    if let Some(category) = params
        .category
        .as_deref()
        .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
    {
        let category_id = Uuid::parse_str(category)
            .map_err(|_| AppError::BadRequest(format!("Invalid category id '{}'", category)))?;
        filters.push(ReportFilter::CategoryIn(vec![category_id]));
    }

    Ok(Some(ReportQuery {
        filters,
        sort: None,
        skip: 0,
        limit: None,
        projection: Projection::listing(CategoryProjection::Id),
    }))
}

/// Escape `%`, `_` and `\` so a term matches literally inside `ILIKE`.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
