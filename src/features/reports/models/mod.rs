mod photo;
mod report;

pub use photo::{Photo, MAX_PHOTO_SIZE};
pub use report::{NewReport, PopulatedReport, Report, ReportChanges};
