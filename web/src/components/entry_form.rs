use chrono::Local;
use leptos::prelude::*;
use leptos::task::spawn_local;

use worklog_common::EntryDraft;

use crate::auth::use_auth;
use crate::components::alert;
use crate::supabase::SupabaseService;

/// Work entry form. Validation happens before any network call; a rejected
/// draft surfaces as an alert and nothing is written.
#[component]
pub fn EntryForm(history_version: RwSignal<u32>) -> impl IntoView {
    let auth = use_auth();

    let (project_name, set_project_name) = signal(String::new());
    let (work_date, set_work_date) =
        signal(Local::now().date_naive().format("%Y-%m-%d").to_string());
    let (hours_worked, set_hours_worked) = signal(String::new());
    let (saving, set_saving) = signal(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        let Some(user) = auth.user() else {
            alert("Please sign in to log hours.");
            return;
        };
        let Some(token) = auth.access_token() else {
            return;
        };

        let draft = EntryDraft {
            project_name: project_name.get(),
            work_date: work_date.get(),
            hours_worked: hours_worked.get(),
        };
        let entry = match draft.validate(user.id) {
            Ok(entry) => entry,
            Err(e) => {
                alert(&format!("Please fill in all fields correctly: {}", e));
                return;
            }
        };

        set_saving.set(true);
        spawn_local(async move {
            match SupabaseService::from_config().insert_entry(&token, &entry).await {
                Ok(()) => {
                    alert("Hours saved.");
                    set_project_name.set(String::new());
                    set_hours_worked.set(String::new());
                    history_version.update(|version| *version += 1);
                }
                Err(e) => alert(&format!("Failed to save hours: {}", e)),
            }
            set_saving.set(false);
        });
    };

    view! {
        <form class="entry-form" on:submit=on_submit>
            <div class="form-field">
                <label>"Project"</label>
                <input
                    type="text"
                    placeholder="Project name"
                    prop:value=move || project_name.get()
                    on:input=move |ev| set_project_name.set(event_target_value(&ev))
                />
            </div>

            <div class="form-field">
                <label>"Date"</label>
                <input
                    type="date"
                    prop:value=move || work_date.get()
                    on:input=move |ev| set_work_date.set(event_target_value(&ev))
                />
            </div>

            <div class="form-field">
                <label>"Hours"</label>
                <input
                    type="number"
                    step="0.25"
                    placeholder="0.0"
                    prop:value=move || hours_worked.get()
                    on:input=move |ev| set_hours_worked.set(event_target_value(&ev))
                />
            </div>

            <button type="submit" class="btn-primary" disabled=move || saving.get()>
                "Log hours"
            </button>
        </form>
    }
}
