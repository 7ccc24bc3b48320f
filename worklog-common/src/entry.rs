use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One logged unit of work: `hours_worked` hours spent on `project_name`
/// on `work_date` by the owning user.
///
/// Field names match the `work_entries` table columns, so the struct
/// serializes straight into PostgREST requests and responses. Entries are
/// append-only; duplicates for the same project and date are legal and
/// additive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkEntry {
    pub user_id: Uuid,
    pub project_name: String,
    pub work_date: NaiveDate,
    pub hours_worked: f64,
}

/// Raw form input before validation.
#[derive(Debug, Clone, Default)]
pub struct EntryDraft {
    pub project_name: String,
    pub work_date: String,
    pub hours_worked: String,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Project name must not be empty")]
    EmptyProject,
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Hours must be a number")]
    InvalidHours,
    #[error("Hours must not be negative")]
    NegativeHours,
}

impl EntryDraft {
    /// Validate the draft and attach the owning user, producing a row ready
    /// for insertion. Rejects empty project names, unparsable dates, and
    /// non-numeric or negative hours.
    pub fn validate(&self, user_id: Uuid) -> Result<WorkEntry, ValidationError> {
        let project_name = self.project_name.trim();
        if project_name.is_empty() {
            return Err(ValidationError::EmptyProject);
        }

        let work_date = NaiveDate::parse_from_str(self.work_date.trim(), "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(self.work_date.clone()))?;

        let hours_worked: f64 = self
            .hours_worked
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidHours)?;
        // "NaN" parses successfully, so check it separately.
        if hours_worked.is_nan() {
            return Err(ValidationError::InvalidHours);
        }
        if hours_worked < 0.0 {
            return Err(ValidationError::NegativeHours);
        }

        Ok(WorkEntry {
            user_id,
            project_name: project_name.to_string(),
            work_date,
            hours_worked,
        })
    }
}
