use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use super::photo::{validate_photo, Photo};
use crate::features::categories::models::Category;
use crate::shared::validation::validate_not_blank;

/// A stored report
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct Report {
    pub id: Uuid,
    #[validate(
        custom(function = "validate_not_blank", message = "Item is required"),
        length(max = 32, message = "Item must not exceed 32 characters")
    )]
    pub item: String,
    #[validate(
        custom(function = "validate_not_blank", message = "Project is required"),
        length(max = 32, message = "Project must not exceed 32 characters")
    )]
    pub project: String,
    #[validate(
        custom(function = "validate_not_blank", message = "Author is required"),
        length(max = 32, message = "Author must not exceed 32 characters")
    )]
    pub author: String,
    #[validate(
        custom(function = "validate_not_blank", message = "Subject is required"),
        length(max = 2000, message = "Subject must not exceed 2000 characters")
    )]
    pub subject: String,
    #[validate(
        custom(function = "validate_not_blank", message = "Remarks is required"),
        length(max = 2000, message = "Remarks must not exceed 2000 characters")
    )]
    pub remarks: String,
    #[validate(
        custom(function = "validate_not_blank", message = "Description is required"),
        length(max = 2000, message = "Description must not exceed 2000 characters")
    )]
    pub description: String,
    #[validate(
        custom(function = "validate_not_blank", message = "Action is required"),
        length(max = 2000, message = "Action must not exceed 2000 characters")
    )]
    pub action: String,
    pub status: Option<bool>,
    #[validate(
        custom(function = "validate_not_blank", message = "Contractor is required"),
        length(max = 32, message = "Contractor must not exceed 32 characters")
    )]
    pub contractor: String,
    pub category_id: Uuid,
    #[validate(custom(function = "validate_photo"))]
    pub photo: Option<Photo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    /// Build an unsaved report; the id is time ordered so `_id` sorts by insertion.
    pub fn new(input: NewReport) -> Self {
        let now = Utc::now();
        let mut report = Self {
            id: Uuid::now_v7(),
            item: input.item,
            project: input.project,
            author: input.author,
            subject: input.subject,
            remarks: input.remarks,
            description: input.description,
            action: input.action,
            status: input.status,
            contractor: input.contractor,
            category_id: input.category_id,
            photo: None,
            created_at: now,
            updated_at: now,
        };
        report.trim_short_fields();
        report
    }

    /// Shallow merge: only supplied fields overwrite stored values.
    pub fn apply(&mut self, changes: ReportChanges) {
        let ReportChanges {
            item,
            project,
            author,
            subject,
            remarks,
            description,
            action,
            status,
            contractor,
            category_id,
        } = changes;

        if let Some(v) = item {
            self.item = v;
        }
        if let Some(v) = project {
            self.project = v;
        }
        if let Some(v) = author {
            self.author = v;
        }
        if let Some(v) = subject {
            self.subject = v;
        }
        if let Some(v) = remarks {
            self.remarks = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = action {
            self.action = v;
        }
        if let Some(v) = status {
            self.status = Some(v);
        }
        if let Some(v) = contractor {
            self.contractor = v;
        }
        if let Some(v) = category_id {
            self.category_id = v;
        }
        self.trim_short_fields();
    }

    fn trim_short_fields(&mut self) {
        for field in [
            &mut self.item,
            &mut self.project,
            &mut self.author,
            &mut self.contractor,
        ] {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_string();
            }
        }
    }
}

/// Field values for a report about to be created
#[derive(Debug, Clone)]
pub struct NewReport {
    pub item: String,
    pub project: String,
    pub author: String,
    pub subject: String,
    pub remarks: String,
    pub description: String,
    pub action: String,
    pub status: Option<bool>,
    pub contractor: String,
    pub category_id: Uuid,
}

/// Fields supplied by an update request
#[derive(Debug, Clone, Default)]
pub struct ReportChanges {
    pub item: Option<String>,
    pub project: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub remarks: Option<String>,
    pub description: Option<String>,
    pub action: Option<String>,
    pub status: Option<bool>,
    pub contractor: Option<String>,
    pub category_id: Option<Uuid>,
}

/// A report together with its category, when the category was loaded
#[derive(Debug, Clone)]
pub struct PopulatedReport {
    pub report: Report,
    pub category: Option<Category>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::models::MAX_PHOTO_SIZE;

    fn input() -> NewReport {
        NewReport {
            item: "Valve".to_string(),
            project: "P1".to_string(),
            author: "A".to_string(),
            subject: "leak".to_string(),
            remarks: "urgent".to_string(),
            description: "d".to_string(),
            action: "fix".to_string(),
            status: Some(true),
            contractor: "C".to_string(),
            category_id: Uuid::now_v7(),
        }
    }

    #[test]
    fn test_valid_report() {
        assert!(Report::new(input()).validate().is_ok());
    }

    #[test]
    fn test_short_fields_are_trimmed() {
        let mut data = input();
        data.item = "  Valve  ".to_string();
        data.subject = "  leak  ".to_string();
        let report = Report::new(data);
        assert_eq!(report.item, "Valve");
        // long text keeps its whitespace
        assert_eq!(report.subject, "  leak  ");
    }

    #[test]
    fn test_blank_field_rejected() {
        let mut data = input();
        data.remarks = "   ".to_string();
        let errors = Report::new(data).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("remarks"));
    }

    #[test]
    fn test_length_limits_count_characters() {
        let mut data = input();
        data.item = "é".repeat(32);
        assert!(Report::new(data.clone()).validate().is_ok());

        data.item = "x".repeat(33);
        let errors = Report::new(data).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("item"));

        let mut data = input();
        data.description = "x".repeat(2001);
        let errors = Report::new(data).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("description"));
    }

    #[test]
    fn test_oversized_photo_rejected() {
        let mut report = Report::new(input());
        report.photo = Some(Photo {
            data: vec![0; MAX_PHOTO_SIZE + 1],
            content_type: "image/png".to_string(),
        });
        let errors = report.validate().unwrap_err();
        let field_errors = errors.field_errors();
        assert_eq!(
            field_errors["photo"][0].message.as_deref(),
            Some("Image should be less than 1mb in size")
        );

        report.photo = Some(Photo {
            data: vec![0; MAX_PHOTO_SIZE],
            content_type: "image/png".to_string(),
        });
        assert!(report.validate().is_ok());
    }

    #[test]
    fn test_apply_only_touches_supplied_fields() {
        let mut report = Report::new(input());
        let before = report.clone();

        report.apply(ReportChanges {
            remarks: Some("resolved".to_string()),
            status: Some(false),
            ..Default::default()
        });

        assert_eq!(report.remarks, "resolved");
        assert_eq!(report.status, Some(false));
        assert_eq!(report.item, before.item);
        assert_eq!(report.project, before.project);
        assert_eq!(report.category_id, before.category_id);
        assert_eq!(report.created_at, before.created_at);
    }
}
