mod photo_codec;
mod query_builder;
mod report_service;

pub use photo_codec::UploadedFile;
pub use query_builder::{like_pattern, ReportFilter, ReportQuery};
#[cfg(test)]
pub use query_builder::{Projection, SortSpec, TextField};
pub use report_service::ReportService;
