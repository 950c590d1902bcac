use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::views::{HistoryView, HomeView, SettingsView, TestView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/test", TestView)] Test {},
        #[route("/history", HistoryView)] History {},
        #[route("/settings", SettingsView)] Settings {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    rsx! {
        nav { class: "sidebar",
            h1 { "Trainer" }
            ul {
                li { Link { to: Route::Home {}, "Home" } }
                li { Link { to: Route::Test {}, "Practice Test" } }
                li { Link { to: Route::History {}, "History" } }
                li { Link { to: Route::Settings {}, "Settings" } }
            }
        }
    }
}
