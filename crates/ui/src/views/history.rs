use dioxus::prelude::*;

use trainer_core::model::HistoryEntry;

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{format_date, format_mmss};

#[derive(Clone, Debug, PartialEq)]
struct HistoryRowVm {
    test_type: String,
    score_label: String,
    time_label: String,
    date_label: String,
}

impl HistoryRowVm {
    fn from_entry(entry: &HistoryEntry) -> Self {
        Self {
            test_type: entry.test_type.clone(),
            score_label: format!("{}/{}", entry.completed_questions, entry.total_questions),
            time_label: format_mmss(entry.total_time_secs.round() as u32),
            date_label: format_date(entry.date_taken),
        }
    }
}

#[component]
pub fn HistoryView() -> Element {
    let ctx = use_context::<AppContext>();
    let catalog = ctx.catalog();

    let resource = use_resource(move || {
        let catalog = catalog.clone();
        async move {
            let entries = catalog.history().await.map_err(|_| ViewError::Unknown)?;
            let rows: Vec<HistoryRowVm> = entries.iter().map(HistoryRowVm::from_entry).collect();
            Ok::<_, ViewError>(rows)
        }
    });

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page",
            h2 { "History" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(rows) => rsx! {
                    if rows.is_empty() {
                        p { "No tests taken yet." }
                    } else {
                        table { class: "history-table",
                            thead {
                                tr {
                                    th { "Date" }
                                    th { "Type" }
                                    th { "Score" }
                                    th { "Time" }
                                }
                            }
                            tbody {
                                for row in rows {
                                    tr {
                                        td { "{row.date_label}" }
                                        td { "{row.test_type}" }
                                        td { "{row.score_label}" }
                                        td { "{row.time_label}" }
                                    }
                                }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                },
            }
        }
    }
}
