//! Configuration for the web app.
//!
//! The Supabase project coordinates are baked in at build time; the
//! defaults point at a local `supabase start` stack.

/// Supabase project URL.
pub fn supabase_url() -> String {
    option_env!("WORKLOG_SUPABASE_URL")
        .unwrap_or("http://localhost:54321")
        .to_string()
}

/// Supabase anon (publishable) key. Safe to embed; row-level security
/// scopes what it can reach.
pub fn supabase_anon_key() -> String {
    option_env!("WORKLOG_SUPABASE_ANON_KEY")
        .unwrap_or("anon-key-for-local-development")
        .to_string()
}
