use dioxus::prelude::*;
use dioxus_router::Link;

use crate::routes::Route;

#[component]
pub fn HomeView() -> Element {
    rsx! {
        div { class: "page",
            h2 { "Home" }
            p { "Timed practice tests with per-question timing and mistake tracking." }
            ul {
                li { Link { to: Route::Test {}, "Start a practice test" } }
                li { Link { to: Route::History {}, "Review past attempts" } }
            }
        }
    }
}
