//! Client-side Supabase service: auth endpoints plus the PostgREST reads
//! and writes on `work_entries`. Requests carry the anon key and the
//! signed-in user's access token, so row-level security applies.

use reqwest::Client;
use serde::Deserialize;
use uuid::Uuid;

use worklog_common::WorkEntry;

#[derive(Clone)]
pub struct SupabaseService {
    http_client: Client,
    base_url: String,
    anon_key: String,
}

/// Signed-in user as returned by `/auth/v1/user`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    full_name: Option<String>,
}

impl AuthUser {
    /// Name shown in the header; falls back to the email.
    pub fn display_name(&self) -> String {
        self.user_metadata
            .as_ref()
            .and_then(|metadata| metadata.full_name.clone())
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| self.id.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Supabase error: {0}")]
    Supabase(String),
}

impl SupabaseService {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    /// Service wired to the configured project.
    pub fn from_config() -> Self {
        Self::new(&crate::config::supabase_url(), &crate::config::supabase_anon_key())
    }

    /// URL that starts the federated OAuth flow. Supabase redirects the
    /// browser back to `redirect_to` with tokens in the URL fragment.
    pub fn authorize_url(&self, provider: &str, redirect_to: &str) -> String {
        format!(
            "{}/auth/v1/authorize?provider={}&redirect_to={}",
            self.base_url, provider, redirect_to
        )
    }

    pub async fn fetch_user(&self, access_token: &str) -> Result<AuthUser, SupabaseError> {
        let url = format!("{}/auth/v1/user", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| SupabaseError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SupabaseError::Supabase(format!("{}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| SupabaseError::InvalidResponse(e.to_string()))
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let url = format!("{}/auth/v1/logout", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| SupabaseError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SupabaseError::Supabase(format!("{}: {}", status, body)));
        }

        Ok(())
    }

    /// Insert one validated entry. The row carries the session user's id;
    /// row-level security rejects anything else.
    pub async fn insert_entry(
        &self,
        access_token: &str,
        entry: &WorkEntry,
    ) -> Result<(), SupabaseError> {
        let url = format!("{}/rest/v1/work_entries", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(access_token)
            .json(entry)
            .send()
            .await
            .map_err(|e| SupabaseError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SupabaseError::Supabase(format!("{}: {}", status, body)));
        }

        Ok(())
    }

    /// The user's whole history, most recent date first. Grouping by month
    /// happens client-side.
    pub async fn list_entries(
        &self,
        access_token: &str,
        user_id: Uuid,
    ) -> Result<Vec<WorkEntry>, SupabaseError> {
        let url = format!("{}/rest/v1/work_entries", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("select", "user_id,project_name,work_date,hours_worked".to_string()),
                ("user_id", format!("eq.{}", user_id)),
                ("order", "work_date.desc".to_string()),
            ])
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| SupabaseError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SupabaseError::Supabase(format!("{}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| SupabaseError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: Option<&str>, full_name: Option<&str>) -> AuthUser {
        AuthUser {
            id: Uuid::nil(),
            email: email.map(str::to_string),
            user_metadata: full_name.map(|name| UserMetadata {
                full_name: Some(name.to_string()),
            }),
        }
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        assert_eq!(
            user(Some("ana@example.com"), Some("Ana Silva")).display_name(),
            "Ana Silva"
        );
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        assert_eq!(user(Some("ana@example.com"), None).display_name(), "ana@example.com");
    }

    #[test]
    fn test_authorize_url_names_provider_and_redirect() {
        let service = SupabaseService::new("http://localhost:54321/", "anon");
        assert_eq!(
            service.authorize_url("google", "http://localhost:3000"),
            "http://localhost:54321/auth/v1/authorize?provider=google&redirect_to=http://localhost:3000"
        );
    }
}
