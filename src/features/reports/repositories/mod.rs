#[cfg(test)]
mod memory_report_repository;
mod pg_report_repository;
mod report_repository;

#[cfg(test)]
pub use memory_report_repository::MemoryReportRepository;
pub use pg_report_repository::PgReportRepository;
pub use report_repository::ReportRepository;
