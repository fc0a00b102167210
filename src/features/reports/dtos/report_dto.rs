use std::collections::HashMap;

use base64::prelude::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::categories::dtos::CategoryResponseDto;
use crate::features::reports::models::{Photo, PopulatedReport};

/// Default page size for `GET /reports` and related reports
pub const DEFAULT_LIST_LIMIT: i64 = 6;

/// Default page size for `POST /reports/by/search`
pub const DEFAULT_SEARCH_LIMIT: i64 = 100;

/// Upper bound applied to every requested limit
pub const MAX_LIST_LIMIT: i64 = 1000;

/// Category value meaning "any category" in free-text search
pub const ALL_CATEGORIES: &str = "All";

// =============================================================================
// SORTING
// =============================================================================

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[serde(alias = "ascending", alias = "1")]
    Asc,
    #[serde(alias = "descending", alias = "-1")]
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Fields a listing may be sorted by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub enum ReportSortField {
    #[default]
    #[serde(rename = "_id")]
    Id,
    #[serde(rename = "item")]
    Item,
    #[serde(rename = "project")]
    Project,
    #[serde(rename = "author")]
    Author,
    #[serde(rename = "contractor")]
    Contractor,
    #[serde(rename = "subject")]
    Subject,
    #[serde(rename = "remarks")]
    Remarks,
    #[serde(rename = "description")]
    Description,
    #[serde(rename = "action")]
    Action,
    #[serde(rename = "status")]
    Status,
    #[serde(rename = "category")]
    Category,
    #[serde(rename = "createdAt")]
    CreatedAt,
    #[serde(rename = "updatedAt")]
    UpdatedAt,
}

impl ReportSortField {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ReportSortField::Id => "r.id",
            ReportSortField::Item => "r.item",
            ReportSortField::Project => "r.project",
            ReportSortField::Author => "r.author",
            ReportSortField::Contractor => "r.contractor",
            ReportSortField::Subject => "r.subject",
            ReportSortField::Remarks => "r.remarks",
            ReportSortField::Description => "r.description",
            ReportSortField::Action => "r.action",
            ReportSortField::Status => "r.status",
            ReportSortField::Category => "r.category_id",
            ReportSortField::CreatedAt => "r.created_at",
            ReportSortField::UpdatedAt => "r.updated_at",
        }
    }
}

// =============================================================================
// REQUEST DTOs
// =============================================================================

/// Query params for `GET /reports`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsQuery {
    /// Field to sort by (default: `_id`)
    #[param(value_type = Option<String>)]
    pub sort_by: Option<ReportSortField>,
    /// `asc` (default) or `desc`
    #[param(value_type = Option<String>)]
    pub order: Option<SortDirection>,
    /// Maximum number of reports (default: 6)
    pub limit: Option<i64>,
}

/// Query params for `GET /reports/related/{reportId}`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct RelatedReportsQuery {
    /// Maximum number of reports (default: 6)
    pub limit: Option<i64>,
}

/// Query params for `GET /reports/search`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct TextSearchQuery {
    /// Case-insensitive fragment of the report item
    pub search: Option<String>,
    /// Category id, or `All`
    pub category: Option<String>,
}

/// Allow-listed fields for `POST /reports/by/search`.
///
/// A field matches when its value equals any entry of the list. Empty lists are ignored.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ReportFiltersDto {
    pub item: Vec<String>,
    pub project: Vec<String>,
    pub author: Vec<String>,
    pub contractor: Vec<String>,
    pub subject: Vec<String>,
    pub remarks: Vec<String>,
    pub description: Vec<String>,
    pub action: Vec<String>,
    pub status: Vec<bool>,
    pub category: Vec<Uuid>,
    /// Keys outside the allow-list. Only empty lists are accepted here.
    #[serde(flatten)]
    pub other: HashMap<String, serde_json::Value>,
}

/// Request body for `POST /reports/by/search`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchReportsDto {
    /// `desc` (default) or `asc`
    #[schema(value_type = Option<String>, example = "desc")]
    pub order: Option<SortDirection>,
    /// Field to sort by (default: `_id`)
    #[schema(value_type = Option<String>, example = "createdAt")]
    pub sort_by: Option<ReportSortField>,
    /// Page size (default: 100)
    pub limit: Option<i64>,
    /// Number of reports to skip (default: 0)
    pub skip: Option<i64>,
    #[serde(default)]
    pub filters: ReportFiltersDto,
}

/// Multipart form accepted by create and update.
/// Note: This struct is for Swagger UI documentation only.
/// The actual handlers read the multipart stream directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct ReportFormDto {
    #[schema(example = "Valve")]
    pub item: String,
    #[schema(example = "P1")]
    pub project: String,
    pub author: String,
    pub subject: String,
    pub remarks: String,
    pub description: String,
    pub action: String,
    #[schema(example = "true")]
    pub status: String,
    pub contractor: String,
    /// Category id
    pub category: String,
    /// Optional image, at most 1,000,000 bytes
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub photo: Option<String>,
}

// =============================================================================
// RESPONSE DTOs
// =============================================================================

/// How the category of a listed report is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryProjection {
    /// Bare category id
    Id,
    /// `{ _id }` only
    Reduced,
    /// Full category document
    Populated,
}

/// Reduced category reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategorySummaryDto {
    #[serde(rename = "_id")]
    pub id: Uuid,
}

/// Category as it appears inside a report payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CategoryFieldDto {
    Populated(CategoryResponseDto),
    Reduced(CategorySummaryDto),
    Id(Uuid),
    /// Populated reference whose category no longer exists
    Missing,
}

/// Embedded photo, base64 encoded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDto {
    pub content_type: String,
    pub data: String,
}

impl From<Photo> for PhotoDto {
    fn from(p: Photo) -> Self {
        Self {
            content_type: p.content_type,
            data: BASE64_STANDARD.encode(p.data),
        }
    }
}

/// Response DTO for report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponseDto {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub item: String,
    pub project: String,
    pub author: String,
    pub subject: String,
    pub remarks: String,
    pub description: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    pub contractor: String,
    pub category: CategoryFieldDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<PhotoDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReportResponseDto {
    /// Render a report with the requested category shape
    pub fn project(populated: PopulatedReport, projection: CategoryProjection) -> Self {
        let PopulatedReport { report: r, category } = populated;

        let category = match (projection, category) {
            (CategoryProjection::Populated, Some(c)) => CategoryFieldDto::Populated(c.into()),
            (CategoryProjection::Populated, None) => CategoryFieldDto::Missing,
            (CategoryProjection::Reduced, _) => {
                CategoryFieldDto::Reduced(CategorySummaryDto { id: r.category_id })
            }
            (CategoryProjection::Id, _) => CategoryFieldDto::Id(r.category_id),
        };

        Self {
            id: r.id,
            item: r.item,
            project: r.project,
            author: r.author,
            subject: r.subject,
            remarks: r.remarks,
            description: r.description,
            action: r.action,
            status: r.status,
            contractor: r.contractor,
            category,
            photo: r.photo.map(PhotoDto::from),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }

    /// Drop the photo from the payload
    pub fn without_photo(mut self) -> Self {
        self.photo = None;
        self
    }
}

/// Response DTO for `POST /reports/by/search`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchReportsResponseDto {
    /// Number of reports in `data`
    pub size: usize,
    pub data: Vec<ReportResponseDto>,
}
