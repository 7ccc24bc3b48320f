use leptos::prelude::*;

use crate::auth::{use_auth, AuthProvider};
use crate::components::entry_form::EntryForm;
use crate::components::history::HistoryPanel;

#[component]
pub fn App() -> impl IntoView {
    view! {
        <AuthProvider>
            <main class="container">
                <h1>"Worklog"</h1>
                <AuthGate/>
            </main>
        </AuthProvider>
    }
}

/// Two mutually exclusive states: signed out shows the auth controls,
/// signed in shows the entry form and the history.
#[component]
fn AuthGate() -> impl IntoView {
    let auth = use_auth();

    view! {
        {move || {
            if auth.is_loading() {
                view! { <p class="loading">"Loading..."</p> }.into_any()
            } else if auth.is_authenticated() {
                view! { <SignedIn/> }.into_any()
            } else {
                view! { <SignedOut/> }.into_any()
            }
        }}
    }
}

#[component]
fn SignedOut() -> impl IntoView {
    let auth = use_auth();

    view! {
        <section class="auth-section">
            <p>"Sign in to log your hours."</p>
            <button class="btn-primary" on:click=move |_| auth.sign_in_with_google()>
                "Sign in with Google"
            </button>
        </section>
    }
}

#[component]
fn SignedIn() -> impl IntoView {
    let auth = use_auth();
    // Bumped after every saved entry so the history reloads.
    let history_version = RwSignal::new(0u32);

    view! {
        <section class="app-section">
            <header class="user-bar">
                <span class="user-name">{move || auth.display_name()}</span>
                <button class="btn-secondary" on:click=move |_| auth.sign_out()>
                    "Sign out"
                </button>
            </header>
            <EntryForm history_version=history_version/>
            <HistoryPanel history_version=history_version/>
        </section>
    }
}
