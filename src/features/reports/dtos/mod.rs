mod report_dto;
mod report_form;

pub use report_dto::*;
pub use report_form::ReportForm;
