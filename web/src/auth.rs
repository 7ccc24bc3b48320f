//! Session state for the browser client.
//!
//! The access token lives in `localStorage`; on startup a token freshly
//! delivered in the OAuth callback fragment wins over a stored one, and
//! the user is re-fetched to validate whichever token was found.

use leptos::prelude::*;
#[cfg(target_arch = "wasm32")]
use leptos::task::spawn_local;

use crate::supabase::AuthUser;
#[cfg(target_arch = "wasm32")]
use crate::supabase::SupabaseService;

#[cfg(target_arch = "wasm32")]
const ACCESS_TOKEN_KEY: &str = "worklog_access_token";

/// A signed-in Supabase session.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub user: AuthUser,
}

#[derive(Clone, Copy)]
pub struct AuthContext {
    session: RwSignal<Option<Session>>,
    loading: RwSignal<bool>,
}

impl AuthContext {
    pub fn new() -> Self {
        Self {
            session: RwSignal::new(None),
            loading: RwSignal::new(true),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.get().is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.session.get().map(|session| session.user)
    }

    pub fn access_token(&self) -> Option<String> {
        self.session.get().map(|session| session.access_token)
    }

    pub fn display_name(&self) -> String {
        self.session
            .get()
            .map(|session| session.user.display_name())
            .unwrap_or_default()
    }

    pub fn set_session(&self, session: Option<Session>) {
        self.session.set(session);
        self.loading.set(false);
    }

    /// Redirect to the federated sign-in flow; Supabase sends the browser
    /// back with tokens in the URL fragment.
    pub fn sign_in_with_google(&self) {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(window) = web_sys::window() {
                let origin = window.location().origin().unwrap_or_default();
                let url = SupabaseService::from_config().authorize_url("google", &origin);
                let _ = window.location().set_href(&url);
            }
        }
    }

    pub fn sign_out(&self) {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(token) = self.access_token() {
                spawn_local(async move {
                    if let Err(e) = SupabaseService::from_config().sign_out(&token).await {
                        web_sys::console::warn_1(&format!("Sign-out call failed: {}", e).into());
                    }
                });
            }
            if let Some(storage) = local_storage() {
                let _ = storage.remove_item(ACCESS_TOKEN_KEY);
            }
        }
        self.session.set(None);
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Provide auth context to the application.
#[component]
pub fn AuthProvider(children: Children) -> impl IntoView {
    let auth = AuthContext::new();

    #[cfg(target_arch = "wasm32")]
    {
        let auth_clone = auth;
        Effect::new(move || {
            spawn_local(async move {
                restore_session(auth_clone).await;
            });
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        auth.loading.set(false);
    }

    provide_context(auth);

    children()
}

/// Get auth context from anywhere in the component tree.
pub fn use_auth() -> AuthContext {
    expect_context::<AuthContext>()
}

/// Extract the access token from an OAuth implicit-grant callback fragment
/// like `#access_token=...&refresh_token=...`.
fn token_from_fragment(hash: &str) -> Option<String> {
    hash.trim_start_matches('#')
        .split('&')
        .find_map(|pair| pair.strip_prefix("access_token="))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|window| window.local_storage().ok().flatten())
}

#[cfg(target_arch = "wasm32")]
async fn restore_session(auth: AuthContext) {
    let fragment_token = web_sys::window()
        .and_then(|window| window.location().hash().ok())
        .and_then(|hash| token_from_fragment(&hash));

    let access_token = match fragment_token {
        Some(token) => {
            if let Some(storage) = local_storage() {
                let _ = storage.set_item(ACCESS_TOKEN_KEY, &token);
            }
            if let Some(window) = web_sys::window() {
                let _ = window.location().set_hash("");
            }
            Some(token)
        }
        None => local_storage().and_then(|storage| storage.get_item(ACCESS_TOKEN_KEY).ok().flatten()),
    };

    let Some(access_token) = access_token else {
        auth.set_session(None);
        return;
    };

    match SupabaseService::from_config().fetch_user(&access_token).await {
        Ok(user) => auth.set_session(Some(Session { access_token, user })),
        Err(e) => {
            web_sys::console::warn_1(&format!("Session restore failed: {}", e).into());
            if let Some(storage) = local_storage() {
                let _ = storage.remove_item(ACCESS_TOKEN_KEY);
            }
            auth.set_session(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_fragment_finds_access_token() {
        assert_eq!(
            token_from_fragment("#access_token=abc&refresh_token=def&token_type=bearer"),
            Some("abc".to_string())
        );
    }

    #[test]
    fn test_token_from_fragment_rejects_missing_or_empty() {
        assert_eq!(token_from_fragment(""), None);
        assert_eq!(token_from_fragment("#refresh_token=def"), None);
        assert_eq!(token_from_fragment("#access_token="), None);
    }
}
