use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use serde::Serialize;

use worklog_common::ReportMonth;

use crate::dispatch::DispatchError;
use crate::AppState;

#[derive(Serialize)]
struct DispatchKickoff {
    message: &'static str,
    target_month: String,
    users: usize,
}

/// POST /send-monthly-report - dispatch last month's reports.
///
/// Enumerates the active users up front so an enumeration failure still
/// surfaces as a 500, then detaches the per-user processing and responds.
/// The individual sends are awaited inside the detached run, not here.
async fn send_monthly_report(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DispatchKickoff>, DispatchError> {
    let month = ReportMonth::preceding(Utc::now().date_naive());
    let users = state.dispatcher.active_users().await?;
    let user_count = users.len();

    let dispatcher = state.dispatcher.clone();
    tokio::spawn(async move {
        dispatcher.process_users(&users, month).await;
    });

    Ok(Json(DispatchKickoff {
        message: "Monthly report dispatch started",
        target_month: month.to_string(),
        users: user_count,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/send-monthly-report", post(send_monthly_report))
        .with_state(state)
}
