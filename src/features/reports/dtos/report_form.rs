use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{NewReport, ReportChanges};
use crate::features::reports::services::UploadedFile;

/// Raw values of a create/update multipart form
#[derive(Debug, Default)]
pub struct ReportForm {
    pub item: Option<String>,
    pub project: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub remarks: Option<String>,
    pub description: Option<String>,
    pub action: Option<String>,
    pub status: Option<String>,
    pub contractor: Option<String>,
    pub category: Option<String>,
    pub photo: Option<UploadedFile>,
}

impl ReportForm {
    /// Store a text part; returns false for names the form does not know
    pub fn set_text(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "item" => &mut self.item,
            "project" => &mut self.project,
            "author" => &mut self.author,
            "subject" => &mut self.subject,
            "remarks" => &mut self.remarks,
            "description" => &mut self.description,
            "action" => &mut self.action,
            "status" => &mut self.status,
            "contractor" => &mut self.contractor,
            "category" => &mut self.category,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Require every field and split off the photo.
    pub fn into_new_report(self) -> Result<(NewReport, Option<UploadedFile>)> {
        fn required(value: Option<String>) -> Result<String> {
            value
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::BadRequest("All fields are required".to_string()))
        }

        let item = required(self.item)?;
        let project = required(self.project)?;
        let author = required(self.author)?;
        let subject = required(self.subject)?;
        let remarks = required(self.remarks)?;
        let description = required(self.description)?;
        let action = required(self.action)?;
        let status = required(self.status)?;
        let contractor = required(self.contractor)?;
        let category = required(self.category)?;

        let report = NewReport {
            item,
            project,
            author,
            subject,
            remarks,
            description,
            action,
            status: Some(parse_status(&status)?),
            contractor,
            category_id: parse_category(&category)?,
        };

        Ok((report, self.photo))
    }

    /// Keep whatever was supplied and split off the photo.
    pub fn into_changes(self) -> Result<(ReportChanges, Option<UploadedFile>)> {
        let changes = ReportChanges {
            item: self.item,
            project: self.project,
            author: self.author,
            subject: self.subject,
            remarks: self.remarks,
            description: self.description,
            action: self.action,
            status: self.status.as_deref().map(parse_status).transpose()?,
            contractor: self.contractor,
            category_id: self.category.as_deref().map(parse_category).transpose()?,
        };

        Ok((changes, self.photo))
    }
}

fn parse_status(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(AppError::Validation(vec![
            "status: Status must be true or false".to_string(),
        ])),
    }
}

fn parse_category(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        AppError::Validation(vec!["category: Category must be a valid id".to_string()])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_form(category: &str) -> ReportForm {
        let mut form = ReportForm::default();
        for (name, value) in [
            ("item", "Valve"),
            ("project", "P1"),
            ("author", "A"),
            ("subject", "leak"),
            ("remarks", "urgent"),
            ("description", "d"),
            ("action", "fix"),
            ("status", "true"),
            ("contractor", "C"),
            ("category", category),
        ] {
            assert!(form.set_text(name, value.to_string()));
        }
        form
    }

    #[test]
    fn test_unknown_part_name() {
        let mut form = ReportForm::default();
        assert!(!form.set_text("sold", "3".to_string()));
    }

    #[test]
    fn test_complete_form() {
        let id = Uuid::now_v7();
        let (report, photo) = full_form(&id.to_string()).into_new_report().unwrap();
        assert_eq!(report.item, "Valve");
        assert_eq!(report.status, Some(true));
        assert_eq!(report.category_id, id);
        assert!(photo.is_none());
    }

    #[test]
    fn test_each_missing_field_is_rejected() {
        let id = Uuid::now_v7().to_string();
        for missing in [
            "item",
            "project",
            "author",
            "subject",
            "remarks",
            "description",
            "action",
            "status",
            "contractor",
            "category",
        ] {
            let mut form = full_form(&id);
            form.set_text(missing, String::new());
            match form.into_new_report() {
                Err(AppError::BadRequest(msg)) => assert_eq!(msg, "All fields are required"),
                other => panic!("{} accepted: {:?}", missing, other.map(|_| ())),
            }
        }
    }

    #[test]
    fn test_false_status_counts_as_present() {
        let mut form = full_form(&Uuid::now_v7().to_string());
        form.set_text("status", "false".to_string());
        let (report, _) = form.into_new_report().unwrap();
        assert_eq!(report.status, Some(false));
    }

    #[test]
    fn test_status_spellings() {
        for (raw, expected) in [
            ("true", true),
            ("1", true),
            ("yes", true),
            ("Yes", true),
            ("false", false),
            ("0", false),
            ("no", false),
            (" NO ", false),
        ] {
            assert_eq!(parse_status(raw).unwrap(), expected, "{}", raw);
        }
        assert!(matches!(parse_status("maybe"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_bad_category_is_a_validation_error() {
        let result = full_form("not-an-id").into_new_report();
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_changes_keep_only_supplied_fields() {
        let mut form = ReportForm::default();
        form.set_text("remarks", "done".to_string());
        form.set_text("status", "false".to_string());
        let (changes, _) = form.into_changes().unwrap();
        assert_eq!(changes.remarks.as_deref(), Some("done"));
        assert_eq!(changes.status, Some(false));
        assert!(changes.item.is_none());
        assert!(changes.category_id.is_none());
    }
}
