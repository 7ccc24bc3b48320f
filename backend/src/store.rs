use reqwest::Client;
use serde::Deserialize;
use uuid::Uuid;

use worklog_common::{ReportMonth, WorkEntry};

/// Client for the Supabase data store and auth admin API.
///
/// Authenticates with the service-role key for both the PostgREST reads on
/// `work_entries` and the admin user lookup, so row-level security does not
/// apply here. The browser client uses the anon key and its own session
/// instead.
#[derive(Clone)]
pub struct SupabaseClient {
    http_client: Client,
    base_url: String,
    service_role_key: String,
}

/// Row shape of `select=user_id` on `work_entries`.
#[derive(Debug, Deserialize)]
struct UserIdRow {
    user_id: Uuid,
}

/// Auth admin user object, reduced to the fields the dispatcher needs.
#[derive(Debug, Deserialize)]
struct AdminUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

#[derive(Debug, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    full_name: Option<String>,
}

/// A report recipient as resolved from the identity provider.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Supabase error: {0}")]
    Supabase(String),
}

impl SupabaseClient {
    pub fn new(base_url: &str, service_role_key: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_role_key: service_role_key.to_string(),
        }
    }

    /// Distinct user ids across ALL work entries, in first-seen order.
    ///
    /// Deliberately unfiltered by month: users with no activity ever are the
    /// ones we must not contact, and the per-user month query prunes the
    /// rest.
    pub async fn distinct_user_ids(&self) -> Result<Vec<Uuid>, StoreError> {
        let url = format!("{}/rest/v1/work_entries", self.base_url);

        tracing::debug!("Querying distinct users: {}", url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("select", "user_id")])
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .send()
            .await
            .map_err(|e| StoreError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Supabase(format!("{}: {}", status, body)));
        }

        let rows: Vec<UserIdRow> = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        let mut user_ids = Vec::new();
        for row in rows {
            if !user_ids.contains(&row.user_id) {
                user_ids.push(row.user_id);
            }
        }
        Ok(user_ids)
    }

    /// A user's entries within the month, ordered by date ascending.
    pub async fn entries_for_month(
        &self,
        user_id: Uuid,
        month: ReportMonth,
    ) -> Result<Vec<WorkEntry>, StoreError> {
        let url = format!("{}/rest/v1/work_entries", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("select", "user_id,project_name,work_date,hours_worked".to_string()),
                ("user_id", format!("eq.{}", user_id)),
                ("work_date", format!("gte.{}", month.first_day())),
                ("work_date", format!("lte.{}", month.last_day())),
                ("order", "work_date.asc".to_string()),
            ])
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .send()
            .await
            .map_err(|e| StoreError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Supabase(format!("{}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }

    /// Resolve a user's email and display name via the auth admin API.
    /// The display name falls back to the email when the profile carries no
    /// full name.
    pub async fn user_identity(&self, user_id: Uuid) -> Result<UserIdentity, StoreError> {
        let url = format!("{}/auth/v1/admin/users/{}", self.base_url, user_id);

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .send()
            .await
            .map_err(|e| StoreError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Supabase(format!("{}: {}", status, body)));
        }

        let user: AdminUser = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        let email = user
            .email
            .ok_or_else(|| StoreError::InvalidResponse(format!("user {} has no email", user.id)))?;
        let display_name = user
            .user_metadata
            .and_then(|m| m.full_name)
            .unwrap_or_else(|| email.clone());

        Ok(UserIdentity {
            id: user.id,
            email,
            display_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supabase_client_url_normalization() {
        let client = SupabaseClient::new("https://project.supabase.co/", "key");
        assert_eq!(client.base_url, "https://project.supabase.co");
    }
}
