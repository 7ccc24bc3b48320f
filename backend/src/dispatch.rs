//! The monthly dispatch run: enumerate active users, then for each one
//! fetch last month's entries, render the PDF, and mail it.
//!
//! Failures before the per-user loop abort the run; failures inside one
//! iteration are logged and never cross the loop boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use worklog_common::ReportMonth;

use crate::mail::{ReportMail, SendGridClient};
use crate::report;
use crate::store::{StoreError, SupabaseClient, UserIdentity};

#[derive(Clone)]
pub struct Dispatcher {
    store: SupabaseClient,
    mailer: SendGridClient,
    sender_email: String,
}

/// Fatal dispatch errors. Everything that happens after the user list is
/// known stays inside the per-user loop as a [`UserOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Failed to enumerate active users: {0}")]
    Enumeration(#[from] StoreError),
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "type": "enumeration_failed",
                "message": self.to_string()
            }
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// What happened to one user within a dispatch run.
#[derive(Debug)]
enum UserOutcome {
    Sent,
    NoEntries,
    Failed(String),
}

/// Per-run tally, one count per user processed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Dispatcher {
    pub fn new(store: SupabaseClient, mailer: SendGridClient, sender_email: String) -> Self {
        Self {
            store,
            mailer,
            sender_email,
        }
    }

    /// Distinct users with at least one work entry ever. Fatal on failure:
    /// without the list there is no run.
    pub async fn active_users(&self) -> Result<Vec<Uuid>, DispatchError> {
        Ok(self.store.distinct_user_ids().await?)
    }

    /// Enumerate and process in one call. The HTTP trigger splits the two
    /// so it can respond once the loop is kicked off; tests and schedulers
    /// that want the final tally use this.
    pub async fn run(&self, month: ReportMonth) -> Result<DispatchSummary, DispatchError> {
        let users = self.active_users().await?;
        tracing::info!(users = users.len(), month = %month, "starting dispatch run");
        Ok(self.process_users(&users, month).await)
    }

    /// Sequential per-user loop. Each iteration resolves identity, queries
    /// the month, renders, and awaits the send; its outcome is logged and
    /// folded into the summary, never propagated.
    pub async fn process_users(&self, users: &[Uuid], month: ReportMonth) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        for &user_id in users {
            match self.process_user(user_id, month).await {
                UserOutcome::Sent => summary.sent += 1,
                UserOutcome::NoEntries => {
                    summary.skipped += 1;
                    tracing::debug!(%user_id, month = %month, "no entries in target month, skipping");
                }
                UserOutcome::Failed(reason) => {
                    summary.failed += 1;
                    tracing::warn!(%user_id, %reason, "skipping user after failure");
                }
            }
        }

        tracing::info!(
            sent = summary.sent,
            skipped = summary.skipped,
            failed = summary.failed,
            month = %month,
            "dispatch run finished"
        );
        summary
    }

    async fn process_user(&self, user_id: Uuid, month: ReportMonth) -> UserOutcome {
        let identity = match self.store.user_identity(user_id).await {
            Ok(identity) => identity,
            Err(e) => return UserOutcome::Failed(format!("identity lookup failed: {}", e)),
        };

        let entries = match self.store.entries_for_month(user_id, month).await {
            Ok(entries) => entries,
            Err(e) => return UserOutcome::Failed(format!("entry query failed: {}", e)),
        };

        // A user with no entries in the target month gets no email.
        if entries.is_empty() {
            return UserOutcome::NoEntries;
        }

        let pdf = report::render(&identity, month, &entries);
        let mail = ReportMail {
            to_email: identity.email.clone(),
            to_name: identity.display_name.clone(),
            subject: format!("Monthly Hours Report - {}", month),
            html_body: html_body(&identity, month),
            attachment_name: report::attachment_filename(month),
            pdf,
        };

        match self.mailer.send_report(&self.sender_email, &mail).await {
            Ok(()) => {
                tracing::info!(email = %identity.email, month = %month, "report sent");
                UserOutcome::Sent
            }
            Err(e) => UserOutcome::Failed(format!("mail send failed: {}", e)),
        }
    }
}

fn html_body(identity: &UserIdentity, month: ReportMonth) -> String {
    format!(
        "<p>Hello {},</p>\n\
         <p>Please find attached your report of hours worked for {}.</p>\n\
         <p>Thank you!</p>\n\
         <p>Your Worklog Team</p>",
        identity.display_name, month
    )
}
