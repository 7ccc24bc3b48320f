mod app;
mod auth;
mod components;
mod config;
mod supabase;

use app::App;

fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
