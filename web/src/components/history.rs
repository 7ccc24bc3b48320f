use leptos::prelude::*;
use leptos::task::spawn_local;

use worklog_common::{group_by_month, WorkEntry};

use crate::auth::use_auth;
use crate::supabase::SupabaseService;

/// Read-only history panel: one header per calendar month in the order the
/// store returns them (most recent date first), entries listed untouched
/// under their month.
#[component]
pub fn HistoryPanel(history_version: RwSignal<u32>) -> impl IntoView {
    let auth = use_auth();

    let (entries, set_entries) = signal::<Vec<WorkEntry>>(Vec::new());
    let (error, set_error) = signal::<Option<String>>(None);

    Effect::new(move || {
        // Re-run on every saved entry and on session changes.
        let _ = history_version.get();
        let Some(user) = auth.user() else {
            set_entries.set(Vec::new());
            return;
        };
        let Some(token) = auth.access_token() else {
            return;
        };

        spawn_local(async move {
            match SupabaseService::from_config().list_entries(&token, user.id).await {
                Ok(list) => {
                    set_error.set(None);
                    set_entries.set(list);
                }
                Err(e) => set_error.set(Some(format!("Failed to load history: {}", e))),
            }
        });
    });

    view! {
        <section class="history">
            <h3>"History"</h3>
            {move || error.get().map(|message| view! { <p class="error">{message}</p> })}
            {move || {
                let entries = entries.get();
                if entries.is_empty() {
                    view! { <p class="empty">"No work entries yet."</p> }.into_any()
                } else {
                    group_by_month(&entries)
                        .into_iter()
                        .map(|group| {
                            view! {
                                <h4>{format!("{} / {}", group.month.name(), group.month.year())}</h4>
                                <ul>
                                    {group
                                        .entries
                                        .iter()
                                        .map(|entry| view! { <li>{entry_line(entry)}</li> })
                                        .collect_view()}
                                </ul>
                            }
                        })
                        .collect_view()
                        .into_any()
                }
            }}
        </section>
    }
}

fn entry_line(entry: &WorkEntry) -> String {
    format!(
        "{}: {} - {} horas",
        entry.work_date.format("%d/%m/%Y"),
        entry.project_name,
        entry.hours_worked
    )
}
