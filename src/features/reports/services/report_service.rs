use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::reports::dtos::{
    ListReportsQuery, RelatedReportsQuery, ReportResponseDto, SearchReportsDto,
    SearchReportsResponseDto, TextSearchQuery,
};
use crate::features::reports::models::{NewReport, PopulatedReport, Report, ReportChanges};
use crate::features::reports::repositories::ReportRepository;

use super::photo_codec::{apply_photo, UploadedFile};
use super::query_builder::{self, ReportQuery};

/// Service for report operations
pub struct ReportService {
    repo: Arc<dyn ReportRepository>,
}

impl ReportService {
    pub fn new(repo: Arc<dyn ReportRepository>) -> Self {
        Self { repo }
    }

    /// Load a report with its category; every failure reads "Report not found".
    pub async fn get(&self, id: Uuid) -> Result<PopulatedReport> {
        self.repo
            .find_by_id(id)
            .await
            .and_then(|found| found.ok_or_else(|| AppError::NotFound(format!("Report {}", id))))
            .map_err(AppError::report_not_found)
    }

    /// Create a report, embedding the photo when one was uploaded
    pub async fn create(
        &self,
        input: NewReport,
        photo: Option<UploadedFile>,
    ) -> Result<PopulatedReport> {
        let mut report = Report::new(input);
        if let Some(upload) = photo {
            apply_photo(upload, &mut report.photo)?;
        }
        report.validate()?;

        self.repo.insert(&report).await?;

        tracing::info!(
            "Created report: {} in category: {}",
            report.id,
            report.category_id
        );

        Ok(PopulatedReport {
            report,
            category: None,
        })
    }

    /// Merge the supplied fields into `current` and save it.
    ///
    /// Returns the saved report with its (possibly new) category joined.
    pub async fn update(
        &self,
        current: PopulatedReport,
        changes: ReportChanges,
        photo: Option<UploadedFile>,
    ) -> Result<PopulatedReport> {
        let mut report = current.report;
        report.apply(changes);
        if let Some(upload) = photo {
            apply_photo(upload, &mut report.photo)?;
        }
        report.updated_at = Utc::now();
        report.validate()?;

        if !self.repo.update(&report).await? {
            return Err(AppError::NotFound("Report not found".to_string()));
        }

        tracing::info!("Updated report: {}", report.id);

        self.get(report.id).await
    }

    pub async fn remove(&self, report: &Report) -> Result<()> {
        if !self.repo.delete(report.id).await? {
            return Err(AppError::NotFound("Report not found".to_string()));
        }

        tracing::info!("Deleted report: {}", report.id);
        Ok(())
    }

    async fn run(&self, query: ReportQuery) -> Result<Vec<ReportResponseDto>> {
        let reports = self.repo.find(&query).await?;
        Ok(reports
            .into_iter()
            .map(|r| ReportResponseDto::project(r, query.projection.category).without_photo())
            .collect())
    }

    /// Sorted, limited listing
    pub async fn list(&self, params: &ListReportsQuery) -> Result<Vec<ReportResponseDto>> {
        self.run(query_builder::list_query(params))
            .await
            .map_err(AppError::reports_not_found)
    }

    /// Reports sharing the category of `current`
    pub async fn list_related(
        &self,
        current: &Report,
        params: &RelatedReportsQuery,
    ) -> Result<Vec<ReportResponseDto>> {
        self.run(query_builder::related_query(current, params))
            .await
            .map_err(AppError::reports_not_found)
    }

    /// Categories in use by at least one report
    pub async fn list_categories(&self) -> Result<Vec<Uuid>> {
        self.repo
            .distinct_categories()
            .await
            .map_err(AppError::reports_not_found)
    }

    /// Filtered, paginated listing
    pub async fn list_by_search(&self, dto: &SearchReportsDto) -> Result<SearchReportsResponseDto> {
        let query = query_builder::filtered_search_query(dto)?;
        let data = self
            .run(query)
            .await
            .map_err(AppError::reports_not_found)?;

        Ok(SearchReportsResponseDto {
            size: data.len(),
            data,
        })
    }

    /// Free-text search on `item`, optionally within one category
    pub async fn list_search(&self, params: &TextSearchQuery) -> Result<Vec<ReportResponseDto>> {
        let Some(query) = query_builder::text_search_query(params)? else {
            return Ok(Vec::new());
        };

        self.run(query).await.map_err(AppError::reports_not_found)
    }
}
