//! Communication template repository for `SQLite` persistence.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::catalog::ResponseTrigger;
use crate::models::template::{CommunicationTemplate, TemplateStatus};
use crate::{AppError, Result};

use super::db::Database;

/// Repository wrapper around `SQLite` for communication template records.
#[derive(Clone)]
pub struct TemplateRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct TemplateRow {
    id: String,
    title: String,
    content: String,
    category: String,
    trigger_kind: String,
    status: String,
    created_by: String,
    created_at: String,
    reviewed_by: Option<String>,
    reviewed_at: Option<String>,
    review_comments: Option<String>,
    confidence: f64,
}

impl TemplateRow {
    /// Convert a database row into the domain model.
    fn into_template(self) -> Result<CommunicationTemplate> {
        let trigger = ResponseTrigger::parse(&self.trigger_kind)
            .ok_or_else(|| AppError::Db(format!("invalid trigger: {}", self.trigger_kind)))?;
        let status = TemplateStatus::parse(&self.status)
            .ok_or_else(|| AppError::Db(format!("invalid template status: {}", self.status)))?;
        let created_at = parse_timestamp("created_at", &self.created_at)?;
        let reviewed_at = self
            .reviewed_at
            .as_deref()
            .map(|s| parse_timestamp("reviewed_at", s))
            .transpose()?;

        Ok(CommunicationTemplate {
            id: self.id,
            title: self.title,
            content: self.content,
            category: self.category,
            trigger,
            status,
            created_by: self.created_by,
            created_at,
            reviewed_by: self.reviewed_by,
            reviewed_at,
            review_comments: self.review_comments,
            confidence: self.confidence,
        })
    }
}

fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Db(format!("invalid {field}: {e}")))
}

impl TemplateRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a new template record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the database insert fails.
    pub async fn create(&self, template: &CommunicationTemplate) -> Result<CommunicationTemplate> {
        sqlx::query(
            "INSERT INTO communication_template (id, title, content, category, trigger_kind,
             status, created_by, created_at, reviewed_by, reviewed_at, review_comments, confidence)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )
        .bind(&template.id)
        .bind(&template.title)
        .bind(&template.content)
        .bind(&template.category)
        .bind(template.trigger.as_str())
        .bind(template.status.as_str())
        .bind(&template.created_by)
        .bind(template.created_at.to_rfc3339())
        .bind(&template.reviewed_by)
        .bind(template.reviewed_at.map(|dt| dt.to_rfc3339()))
        .bind(&template.review_comments)
        .bind(template.confidence)
        .execute(self.db.as_ref())
        .await?;

        Ok(template.clone())
    }

    /// Retrieve a template by identifier.
    ///
    /// Returns `Ok(None)` if the template does not exist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<CommunicationTemplate>> {
        let row: Option<TemplateRow> =
            sqlx::query_as("SELECT * FROM communication_template WHERE id = ?1")
                .bind(id)
                .fetch_optional(self.db.as_ref())
                .await?;

        row.map(TemplateRow::into_template).transpose()
    }

    /// List templates awaiting review, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_pending(&self) -> Result<Vec<CommunicationTemplate>> {
        self.list_by_status(TemplateStatus::Pending).await
    }

    /// List templates in `status`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_by_status(&self, status: TemplateStatus) -> Result<Vec<CommunicationTemplate>> {
        let rows: Vec<TemplateRow> = sqlx::query_as(
            "SELECT * FROM communication_template WHERE status = ?1 ORDER BY created_at, id",
        )
        .bind(status.as_str())
        .fetch_all(self.db.as_ref())
        .await?;

        rows.into_iter().map(TemplateRow::into_template).collect()
    }

    /// List every template answering `trigger`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_for_trigger(&self, trigger: ResponseTrigger) -> Result<Vec<CommunicationTemplate>> {
        let rows: Vec<TemplateRow> = sqlx::query_as(
            "SELECT * FROM communication_template WHERE trigger_kind = ?1 ORDER BY created_at, id",
        )
        .bind(trigger.as_str())
        .fetch_all(self.db.as_ref())
        .await?;

        rows.into_iter().map(TemplateRow::into_template).collect()
    }

    /// Persist a status transition produced by template governance.
    ///
    /// The write only applies while the stored status still equals
    /// `expected`, so two reviewers racing on the same template cannot both
    /// succeed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the template does not exist,
    /// `AppError::InvalidTransition` if its status moved on since it was
    /// read, or `AppError::Db` if the update fails.
    pub async fn save_transition(
        &self,
        expected: TemplateStatus,
        updated: &CommunicationTemplate,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE communication_template
             SET status = ?1, reviewed_by = ?2, reviewed_at = ?3, review_comments = ?4
             WHERE id = ?5 AND status = ?6",
        )
        .bind(updated.status.as_str())
        .bind(&updated.reviewed_by)
        .bind(updated.reviewed_at.map(|dt| dt.to_rfc3339()))
        .bind(&updated.review_comments)
        .bind(&updated.id)
        .bind(expected.as_str())
        .execute(self.db.as_ref())
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        match self.get_by_id(&updated.id).await? {
            None => Err(AppError::NotFound(format!(
                "template {} not found",
                updated.id
            ))),
            Some(current) => Err(AppError::InvalidTransition(format!(
                "template {} is {}, expected {}",
                updated.id, current.status, expected
            ))),
        }
    }

    /// Delete rejected templates reviewed before `cutoff`.
    ///
    /// Approved templates stay, since they remain dispatchable.
    ///
    /// Returns the number of purged rows.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the delete fails.
    pub async fn purge_rejected_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM communication_template
             WHERE status = 'rejected'
               AND reviewed_at IS NOT NULL AND reviewed_at < ?1",
        )
        .bind(cutoff.to_rfc3339())
        .execute(self.db.as_ref())
        .await?;

        Ok(result.rows_affected())
    }
}
