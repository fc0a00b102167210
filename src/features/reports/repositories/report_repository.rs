use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::reports::models::{PopulatedReport, Report};
use crate::features::reports::services::ReportQuery;

/// Persistence port for reports.
///
/// Implementations own every storage detail; query shapes come in as
/// [`ReportQuery`] values so no SQL leaks into the service layer.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Load one report, photo included, with its category joined.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PopulatedReport>>;

    /// Run a listing query.
    async fn find(&self, query: &ReportQuery) -> Result<Vec<PopulatedReport>>;

    /// Distinct category ids referenced by any report.
    async fn distinct_categories(&self) -> Result<Vec<Uuid>>;

    async fn insert(&self, report: &Report) -> Result<()>;

    /// Overwrite a stored report. Returns `false` when no row matched.
    async fn update(&self, report: &Report) -> Result<bool>;

    /// Returns `false` when no row matched.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}
