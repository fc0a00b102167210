use std::cmp::Ordering;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::Category;
use crate::features::reports::dtos::{ReportSortField, SortDirection};
use crate::features::reports::models::{PopulatedReport, Report};
use crate::features::reports::repositories::ReportRepository;
use crate::features::reports::services::{ReportFilter, ReportQuery, SortSpec, TextField};

/// In-process report store for router tests
#[derive(Default)]
pub struct MemoryReportRepository {
    categories: RwLock<Vec<Category>>,
    reports: RwLock<Vec<Report>>,
}

impl MemoryReportRepository {
    pub fn with_categories(categories: Vec<Category>) -> Self {
        Self {
            categories: RwLock::new(categories),
            reports: RwLock::new(Vec::new()),
        }
    }

    pub async fn stored(&self, id: Uuid) -> Option<Report> {
        self.reports.read().await.iter().find(|r| r.id == id).cloned()
    }

    async fn populate(&self, report: Report) -> PopulatedReport {
        let category = self
            .categories
            .read()
            .await
            .iter()
            .find(|c| c.id == report.category_id)
            .cloned();
        PopulatedReport { report, category }
    }

    async fn check_category(&self, id: Uuid) -> Result<()> {
        if self.categories.read().await.iter().any(|c| c.id == id) {
            Ok(())
        } else {
            Err(AppError::BadRequest("Category not found".to_string()))
        }
    }
}

fn matches(report: &Report, filter: &ReportFilter) -> bool {
    match filter {
        ReportFilter::TextIn(field, values) => values.iter().any(|v| v == field.value(report)),
        ReportFilter::StatusIn(values) => report.status.is_some_and(|s| values.contains(&s)),
        ReportFilter::CategoryIn(ids) => ids.contains(&report.category_id),
        ReportFilter::IdNot(id) => report.id != *id,
        ReportFilter::ItemContains(term) => report
            .item
            .to_lowercase()
            .contains(&term.to_lowercase()),
    }
}

/// Ascending order with missing values after present ones, as Postgres sorts NULLs
fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare(a: &Report, b: &Report, field: ReportSortField) -> Ordering {
    let text = |f: TextField| f.value(a).cmp(f.value(b));
    let ord = match field {
        ReportSortField::Id => a.id.cmp(&b.id),
        ReportSortField::Item => text(TextField::Item),
        ReportSortField::Project => text(TextField::Project),
        ReportSortField::Author => text(TextField::Author),
        ReportSortField::Contractor => text(TextField::Contractor),
        ReportSortField::Subject => text(TextField::Subject),
        ReportSortField::Remarks => text(TextField::Remarks),
        ReportSortField::Description => text(TextField::Description),
        ReportSortField::Action => text(TextField::Action),
        ReportSortField::Status => nulls_last(a.status, b.status),
        ReportSortField::Category => a.category_id.cmp(&b.category_id),
        ReportSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        ReportSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    };
    ord.then_with(|| a.id.cmp(&b.id))
}

fn sort(reports: &mut [Report], spec: SortSpec) {
    reports.sort_by(|a, b| {
        let ord = compare(a, b, spec.field);
        match spec.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

#[async_trait]
impl ReportRepository for MemoryReportRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PopulatedReport>> {
        match self.stored(id).await {
            Some(report) => Ok(Some(self.populate(report).await)),
            None => Ok(None),
        }
    }

    async fn find(&self, query: &ReportQuery) -> Result<Vec<PopulatedReport>> {
        let mut found: Vec<Report> = self
            .reports
            .read()
            .await
            .iter()
            .filter(|r| query.filters.iter().all(|f| matches(r, f)))
            .cloned()
            .collect();

        if let Some(spec) = query.sort {
            sort(&mut found, spec);
        }

        let skip = usize::try_from(query.skip).unwrap_or(0);
        let limit = query
            .limit
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(usize::MAX);

        let mut page = Vec::new();
        for mut report in found.into_iter().skip(skip).take(limit) {
            if !query.projection.include_photo {
                report.photo = None;
            }
            page.push(self.populate(report).await);
        }
        Ok(page)
    }

    async fn distinct_categories(&self) -> Result<Vec<Uuid>> {
        let mut ids: Vec<Uuid> = self
            .reports
            .read()
            .await
            .iter()
            .map(|r| r.category_id)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn insert(&self, report: &Report) -> Result<()> {
        self.check_category(report.category_id).await?;
        self.reports.write().await.push(report.clone());
        Ok(())
    }

    async fn update(&self, report: &Report) -> Result<bool> {
        self.check_category(report.category_id).await?;
        let mut reports = self.reports.write().await;
        match reports.iter_mut().find(|r| r.id == report.id) {
            Some(stored) => {
                *stored = report.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut reports = self.reports.write().await;
        let before = reports.len();
        reports.retain(|r| r.id != id);
        Ok(reports.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::dtos::CategoryProjection;
    use crate::features::reports::models::NewReport;
    use crate::features::reports::services::Projection;

    fn report(item: &str, status: Option<bool>, category_id: Uuid) -> Report {
        Report::new(NewReport {
            item: item.to_string(),
            project: "P1".to_string(),
            author: "A".to_string(),
            subject: "leak".to_string(),
            remarks: "urgent".to_string(),
            description: "d".to_string(),
            action: "fix".to_string(),
            status,
            contractor: "C".to_string(),
            category_id,
        })
    }

    fn by_status(direction: SortDirection) -> ReportQuery {
        ReportQuery {
            filters: Vec::new(),
            sort: Some(SortSpec {
                field: ReportSortField::Status,
                direction,
            }),
            skip: 0,
            limit: None,
            projection: Projection {
                include_photo: false,
                category: CategoryProjection::Id,
            },
        }
    }

    #[tokio::test]
    async fn test_status_sort_puts_missing_values_last() {
        let category_id = Uuid::now_v7();
        let repo = MemoryReportRepository::with_categories(vec![Category {
            id: category_id,
            name: "Plumbing".to_string(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }]);
        for (item, status) in [("Unset", None), ("Open", Some(false)), ("Done", Some(true))] {
            repo.insert(&report(item, status, category_id)).await.unwrap();
        }

        let items = |found: Vec<PopulatedReport>| -> Vec<String> {
            found.into_iter().map(|p| p.report.item).collect()
        };

        let asc = repo.find(&by_status(SortDirection::Asc)).await.unwrap();
        assert_eq!(items(asc), vec!["Open", "Done", "Unset"]);

        let desc = repo.find(&by_status(SortDirection::Desc)).await.unwrap();
        assert_eq!(items(desc), vec!["Unset", "Done", "Open"]);
    }
}
