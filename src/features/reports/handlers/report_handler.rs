use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        FromRequestParts, Multipart, Path, State,
    },
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::guards::{RequireAdmin, RequireOwner};
use crate::features::reports::dtos::{
    CategoryProjection, ListReportsQuery, RelatedReportsQuery, ReportForm, ReportFormDto,
    ReportResponseDto, SearchReportsDto, SearchReportsResponseDto, TextSearchQuery,
};
use crate::features::reports::models::PopulatedReport;
use crate::features::reports::services::{ReportService, UploadedFile};
use crate::shared::types::{ErrorResponse, MessageResponse};

/// Route parameter naming the report a request targets
pub const REPORT_ID_PARAM: &str = "reportId";

const PHOTO_FIELD: &str = "photo";

/// State for report handlers
#[derive(Clone)]
pub struct ReportState {
    pub report_service: Arc<ReportService>,
}

/// The report named by the `reportId` route parameter, category joined.
///
/// A malformed id, a missing report and a store failure all reject with
/// "Report not found".
pub struct ResolvedReport(pub PopulatedReport);

impl FromRequestParts<ReportState> for ResolvedReport {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ReportState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let not_found = || AppError::NotFound("Report not found".to_string());

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| not_found())?;

        let id = params
            .get(REPORT_ID_PARAM)
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(not_found)?;

        state.report_service.get(id).await.map(ResolvedReport)
    }
}

fn upload_failed(err: MultipartError) -> AppError {
    tracing::warn!("Failed to parse report form: {}", err);
    AppError::BadRequest("Image could not be uploaded".to_string())
}

/// Collect the text parts and the optional photo of a report form
async fn read_report_form(
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<ReportForm> {
    let mut multipart = multipart.map_err(|e| {
        tracing::warn!("Rejected report form: {}", e);
        AppError::BadRequest("Image could not be uploaded".to_string())
    })?;

    let mut form = ReportForm::default();

    while let Some(field) = multipart.next_field().await.map_err(upload_failed)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == PHOTO_FIELD {
            let upload = UploadedFile::read_field(field)
                .await
                .map_err(upload_failed)?;
            // browsers send an empty part when no file was picked
            if upload.size > 0 {
                form.photo = Some(upload);
            }
            continue;
        }

        let value = field.text().await.map_err(upload_failed)?;
        if !form.set_text(&name, value) {
            tracing::debug!("Ignoring unknown report form field: {}", name);
        }
    }

    Ok(form)
}

/// Get a report by id
#[utoipa::path(
    get,
    path = "/api/report/{reportId}",
    params(
        ("reportId" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ReportResponseDto),
        (status = 400, description = "Report not found", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn read(ResolvedReport(report): ResolvedReport) -> Json<ReportResponseDto> {
    Json(ReportResponseDto::project(report, CategoryProjection::Populated).without_photo())
}

/// Create a report
#[utoipa::path(
    post,
    path = "/api/report/create/{userId}",
    params(
        ("userId" = String, Path, description = "ID of the signed-in user")
    ),
    request_body(content = ReportFormDto, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Report created", body = ReportResponseDto),
        (status = 400, description = "Invalid form", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn create(
    RequireOwner(user): RequireOwner,
    State(state): State<ReportState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ReportResponseDto>> {
    let form = read_report_form(multipart).await?;
    let (input, photo) = form.into_new_report()?;

    let report = state.report_service.create(input, photo).await?;
    tracing::debug!("Report {} created by {}", report.report.id, user.sub);

    Ok(Json(ReportResponseDto::project(
        report,
        CategoryProjection::Id,
    )))
}

/// Update a report (admin only)
#[utoipa::path(
    put,
    path = "/api/report/{reportId}/{userId}",
    params(
        ("reportId" = Uuid, Path, description = "Report ID"),
        ("userId" = String, Path, description = "ID of the signed-in user")
    ),
    request_body(content = ReportFormDto, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Report updated", body = ReportResponseDto),
        (status = 400, description = "Invalid form or report not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn update(
    ResolvedReport(current): ResolvedReport,
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<ReportState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ReportResponseDto>> {
    let form = read_report_form(multipart).await?;
    let (changes, photo) = form.into_changes()?;

    let report = state
        .report_service
        .update(current, changes, photo)
        .await?;

    Ok(Json(ReportResponseDto::project(
        report,
        CategoryProjection::Populated,
    )))
}

/// Delete a report (admin only)
#[utoipa::path(
    delete,
    path = "/api/report/{reportId}/{userId}",
    params(
        ("reportId" = Uuid, Path, description = "Report ID"),
        ("userId" = String, Path, description = "ID of the signed-in user")
    ),
    responses(
        (status = 200, description = "Report deleted", body = MessageResponse),
        (status = 400, description = "Report not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn remove(
    ResolvedReport(current): ResolvedReport,
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<ReportState>,
) -> Result<Json<MessageResponse>> {
    state.report_service.remove(&current.report).await?;
    Ok(Json(MessageResponse::new("Report deleted successfully")))
}

/// List reports
#[utoipa::path(
    get,
    path = "/api/reports",
    params(ListReportsQuery),
    responses(
        (status = 200, description = "Reports, photos excluded", body = Vec<ReportResponseDto>),
        (status = 400, description = "Reports not found", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn list(
    State(state): State<ReportState>,
    AppQuery(params): AppQuery<ListReportsQuery>,
) -> Result<Json<Vec<ReportResponseDto>>> {
    let reports = state.report_service.list(&params).await?;
    Ok(Json(reports))
}

/// Search reports by item
#[utoipa::path(
    get,
    path = "/api/reports/search",
    params(TextSearchQuery),
    responses(
        (status = 200, description = "Matching reports, empty without a search term", body = Vec<ReportResponseDto>),
        (status = 400, description = "Reports not found", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn list_search(
    State(state): State<ReportState>,
    AppQuery(params): AppQuery<TextSearchQuery>,
) -> Result<Json<Vec<ReportResponseDto>>> {
    let reports = state.report_service.list_search(&params).await?;
    Ok(Json(reports))
}

/// List reports in the same category as a report
#[utoipa::path(
    get,
    path = "/api/reports/related/{reportId}",
    params(
        ("reportId" = Uuid, Path, description = "Report ID"),
        RelatedReportsQuery
    ),
    responses(
        (status = 200, description = "Related reports", body = Vec<ReportResponseDto>),
        (status = 400, description = "Report not found", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn list_related(
    ResolvedReport(current): ResolvedReport,
    State(state): State<ReportState>,
    AppQuery(params): AppQuery<RelatedReportsQuery>,
) -> Result<Json<Vec<ReportResponseDto>>> {
    let reports = state
        .report_service
        .list_related(&current.report, &params)
        .await?;
    Ok(Json(reports))
}

/// List the categories used by reports
#[utoipa::path(
    get,
    path = "/api/reports/categories",
    responses(
        (status = 200, description = "Category ids", body = Vec<Uuid>),
        (status = 400, description = "Reports not found", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn list_categories(State(state): State<ReportState>) -> Result<Json<Vec<Uuid>>> {
    let categories = state.report_service.list_categories().await?;
    Ok(Json(categories))
}

/// Filter reports
#[utoipa::path(
    post,
    path = "/api/reports/by/search",
    request_body = SearchReportsDto,
    responses(
        (status = 200, description = "One page of matching reports", body = SearchReportsResponseDto),
        (status = 400, description = "Invalid filters or reports not found", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn list_by_search(
    State(state): State<ReportState>,
    AppJson(dto): AppJson<SearchReportsDto>,
) -> Result<Json<SearchReportsResponseDto>> {
    let result = state.report_service.list_by_search(&dto).await?;
    Ok(Json(result))
}

/// Serve the photo of a report
#[utoipa::path(
    get,
    path = "/api/report/photo/{reportId}",
    params(
        ("reportId" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Raw image bytes"),
        (status = 400, description = "Report not found", body = ErrorResponse),
        (status = 404, description = "Report has no photo")
    ),
    tag = "reports"
)]
pub async fn photo(ResolvedReport(report): ResolvedReport) -> Response {
    let Some(photo) = report.report.photo.filter(|p| !p.is_empty()) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let content_type = HeaderValue::from_str(&photo.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    ([(header::CONTENT_TYPE, content_type)], photo.data).into_response()
}
