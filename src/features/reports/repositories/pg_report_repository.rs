use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::Category;
use crate::features::reports::models::{Photo, PopulatedReport, Report};
use crate::features::reports::repositories::ReportRepository;
use crate::features::reports::services::{like_pattern, ReportFilter, ReportQuery};

const REPORT_COLUMNS: &str = r#"
    r.id, r.item, r.project, r.author, r.subject, r.remarks, r.description,
    r.action, r.status, r.contractor, r.category_id, r.created_at, r.updated_at,
    c.name AS category_name,
    c.created_at AS category_created_at,
    c.updated_at AS category_updated_at
"#;

const PHOTO_COLUMNS: &str = ", r.photo_data, r.photo_content_type";
const NO_PHOTO_COLUMNS: &str = ", NULL::bytea AS photo_data, NULL::text AS photo_content_type";

#[derive(Debug, FromRow)]
struct ReportRow {
    id: Uuid,
    item: String,
    project: String,
    author: String,
    subject: String,
    remarks: String,
    description: String,
    action: String,
    status: Option<bool>,
    contractor: String,
    category_id: Uuid,
    photo_data: Option<Vec<u8>>,
    photo_content_type: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_name: Option<String>,
    category_created_at: Option<DateTime<Utc>>,
    category_updated_at: Option<DateTime<Utc>>,
}

impl From<ReportRow> for PopulatedReport {
    fn from(row: ReportRow) -> Self {
        let category = match (
            row.category_name,
            row.category_created_at,
            row.category_updated_at,
        ) {
            (Some(name), Some(created_at), Some(updated_at)) => Some(Category {
                id: row.category_id,
                name,
                created_at,
                updated_at,
            }),
            _ => None,
        };

        let photo = match (row.photo_data, row.photo_content_type) {
            (Some(data), Some(content_type)) => Some(Photo { data, content_type }),
            _ => None,
        };

        PopulatedReport {
            report: Report {
                id: row.id,
                item: row.item,
                project: row.project,
                author: row.author,
                subject: row.subject,
                remarks: row.remarks,
                description: row.description,
                action: row.action,
                status: row.status,
                contractor: row.contractor,
                category_id: row.category_id,
                photo,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            category,
        }
    }
}

fn select_reports(include_photo: bool) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(REPORT_COLUMNS);
    qb.push(if include_photo {
        PHOTO_COLUMNS
    } else {
        NO_PHOTO_COLUMNS
    });
    qb.push(" FROM reports r LEFT JOIN categories c ON c.id = r.category_id");
    qb
}

fn push_filters(qb: &mut QueryBuilder<'static, Postgres>, filters: &[ReportFilter]) {
    for (i, filter) in filters.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });

        match filter {
            ReportFilter::TextIn(field, values) => {
                qb.push(field.column())
                    .push(" = ANY(")
                    .push_bind(values.clone())
                    .push(")");
            }
            ReportFilter::StatusIn(values) => {
                qb.push("r.status = ANY(")
                    .push_bind(values.clone())
                    .push(")");
            }
            ReportFilter::CategoryIn(ids) => {
                qb.push("r.category_id = ANY(")
                    .push_bind(ids.clone())
                    .push(")");
            }
            ReportFilter::IdNot(id) => {
                qb.push("r.id <> ").push_bind(*id);
            }
            ReportFilter::ItemContains(term) => {
                qb.push("r.item ILIKE ").push_bind(like_pattern(term));
            }
        }
    }
}

/// PostgreSQL-backed report store
pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PopulatedReport>> {
        let mut qb = select_reports(true);
        qb.push(" WHERE r.id = ").push_bind(id);

        let row = qb
            .build_query_as::<ReportRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch report {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(row.map(PopulatedReport::from))
    }

    async fn find(&self, query: &ReportQuery) -> Result<Vec<PopulatedReport>> {
        let mut qb = select_reports(query.projection.include_photo);
        push_filters(&mut qb, &query.filters);

        if let Some(sort) = query.sort {
            qb.push(" ORDER BY ")
                .push(sort.field.as_sql())
                .push(" ")
                .push(sort.direction.as_sql());
            // keep pages stable when the sort key repeats
            qb.push(", r.id ").push(sort.direction.as_sql());
        }
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }
        if query.skip > 0 {
            qb.push(" OFFSET ").push_bind(query.skip);
        }

        let rows = qb
            .build_query_as::<ReportRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list reports: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(rows.into_iter().map(PopulatedReport::from).collect())
    }

    async fn distinct_categories(&self) -> Result<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT DISTINCT category_id FROM reports ORDER BY category_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list report categories: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn insert(&self, report: &Report) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reports (
                id, item, project, author, subject, remarks, description, action,
                status, contractor, category_id, photo_data, photo_content_type,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(report.id)
        .bind(&report.item)
        .bind(&report.project)
        .bind(&report.author)
        .bind(&report.subject)
        .bind(&report.remarks)
        .bind(&report.description)
        .bind(&report.action)
        .bind(report.status)
        .bind(&report.contractor)
        .bind(report.category_id)
        .bind(report.photo.as_ref().map(|p| p.data.as_slice()))
        .bind(report.photo.as_ref().map(|p| p.content_type.as_str()))
        .bind(report.created_at)
        .bind(report.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert report: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn update(&self, report: &Report) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE reports
            SET item = $2, project = $3, author = $4, subject = $5, remarks = $6,
                description = $7, action = $8, status = $9, contractor = $10,
                category_id = $11, photo_data = $12, photo_content_type = $13,
                updated_at = $14
            WHERE id = $1
            "#,
        )
        .bind(report.id)
        .bind(&report.item)
        .bind(&report.project)
        .bind(&report.author)
        .bind(&report.subject)
        .bind(&report.remarks)
        .bind(&report.description)
        .bind(&report.action)
        .bind(report.status)
        .bind(&report.contractor)
        .bind(report.category_id)
        .bind(report.photo.as_ref().map(|p| p.data.as_slice()))
        .bind(report.photo.as_ref().map(|p| p.content_type.as_str()))
        .bind(report.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update report {}: {:?}", report.id, e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete report {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::dtos::{CategoryProjection, ReportSortField, SortDirection};
    use crate::features::reports::services::{Projection, SortSpec, TextField};

    fn sql_for(query: &ReportQuery) -> String {
        let mut qb = select_reports(query.projection.include_photo);
        push_filters(&mut qb, &query.filters);
        qb.sql().to_string()
    }

    #[test]
    fn test_listing_excludes_photo_bytes() {
        let query = ReportQuery {
            filters: vec![],
            sort: Some(SortSpec {
                field: ReportSortField::Id,
                direction: SortDirection::Asc,
            }),
            skip: 0,
            limit: Some(6),
            projection: Projection {
                include_photo: false,
                category: CategoryProjection::Populated,
            },
        };
        let sql = sql_for(&query);
        assert!(sql.contains("NULL::bytea AS photo_data"));
        assert!(!sql.contains("r.photo_data"));
        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn test_filters_are_bound_not_inlined() {
        let query = ReportQuery {
            filters: vec![
                ReportFilter::TextIn(TextField::Item, vec!["x'; DROP TABLE reports;--".into()]),
                ReportFilter::ItemContains("va%".into()),
            ],
            sort: None,
            skip: 0,
            limit: None,
            projection: Projection {
                include_photo: false,
                category: CategoryProjection::Id,
            },
        };
        let sql = sql_for(&query);
        assert!(sql.contains("WHERE r.item = ANY($1)"));
        assert!(sql.contains("AND r.item ILIKE $2"));
        assert!(!sql.contains("DROP TABLE"));
    }
}
