use std::collections::BTreeMap;

use dioxus::document::eval;
use dioxus::prelude::*;
use keyboard_types::{Code, Key};

use trainer_core::model::{Screen, TestConfigDraft, TestType};

use super::scripts::countdown_script;
use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ProgressVm, ResultsVm, TestOutcome, TestVm};

#[derive(Clone, Debug, PartialEq)]
enum TestIntent {
    Advance,
    Tick,
    EndNow,
    Flag { category: String, subcategory: String },
}

type CategoryMap = BTreeMap<String, Vec<String>>;

/// Render snapshot of the session.
///
/// The view-model is checked out of its signal while a request runs, so the
/// screen renders from this snapshot instead of reading the view-model
/// directly; otherwise every tick would flash the setup screen.
#[derive(Clone, Debug, PartialEq)]
struct DisplayVm {
    screen: Screen,
    remaining_label: String,
    progress: Option<ProgressVm>,
}

impl DisplayVm {
    fn initial() -> Self {
        Self {
            screen: Screen::Setup,
            remaining_label: "0:00".to_string(),
            progress: None,
        }
    }

    fn from_vm(vm: &TestVm) -> Self {
        Self {
            screen: vm.screen(),
            remaining_label: vm.remaining_label(),
            progress: vm.progress(),
        }
    }
}

#[component]
pub fn TestView() -> Element {
    let ctx = use_context::<AppContext>();
    let backend = ctx.backend();
    let clock = ctx.clock();
    let catalog = ctx.catalog();

    let vm = use_signal(|| Some(TestVm::new(backend, clock)));
    let mut display = use_signal(DisplayVm::initial);
    let error = use_signal(|| None::<ViewError>);
    let results = use_signal(|| None::<ResultsVm>);

    // Setup form.
    let mut test_type = use_signal(|| TestType::Multiplication);
    let mut questions_input = use_signal(|| "20".to_string());
    let mut minutes_input = use_signal(|| "5".to_string());
    let mut auto_advance = use_signal(|| false);
    let mut form_error = use_signal(|| None::<String>);

    // Flag-wrong dialog.
    let mut show_flag_dialog = use_signal(|| false);
    let mut flag_category = use_signal(String::new);
    let mut flag_subcategory = use_signal(String::new);

    let categories_resource = use_resource(move || {
        let catalog = catalog.clone();
        async move { Ok::<_, ViewError>(catalog.categories().await) }
    });
    let categories_state = view_state_from_resource(categories_resource);

    let dispatch_intent = use_callback(move |intent: TestIntent| {
        let mut vm = vm;
        let mut display = display;
        let mut error = error;
        let mut results = results;
        spawn(async move {
            let mut local_vm = {
                let mut guard = vm.write();
                guard.take()
            };
            // A second event arriving while a request runs finds the slot
            // empty and is dropped, not queued.
            let Some(mut vm_value) = local_vm.take() else {
                return;
            };

            let outcome = match intent {
                TestIntent::Advance => vm_value.advance().await,
                TestIntent::Tick => vm_value.tick().await,
                TestIntent::EndNow => vm_value.end_now().await,
                TestIntent::Flag {
                    category,
                    subcategory,
                } => vm_value.flag_wrong(&category, &subcategory).await,
            };

            let loaded = match outcome {
                Ok(TestOutcome::Completed) => Some(vm_value.load_results().await),
                Ok(TestOutcome::Continue) => None,
                Err(err) => {
                    error.set(Some(err));
                    None
                }
            };

            let snapshot = DisplayVm::from_vm(&vm_value);

            // Always put the view-model back so the UI stays usable after errors.
            {
                let mut guard = vm.write();
                *guard = Some(vm_value);
            }
            display.set(snapshot);

            match loaded {
                Some(Ok(data)) => {
                    error.set(None);
                    results.set(Some(data));
                }
                Some(Err(err)) => error.set(Some(err)),
                None => {}
            }
        });
    });

    let on_start = use_callback(move |()| {
        let mut vm = vm;
        let mut display = display;
        let mut error = error;
        let mut form_error = form_error;
        let mut results = results;

        let total_questions: u32 = match questions_input().trim().parse() {
            Ok(value) => value,
            Err(_) => {
                form_error.set(Some("Questions must be a whole number.".to_string()));
                return;
            }
        };
        let minutes: u32 = match minutes_input().trim().parse() {
            Ok(value) => value,
            Err(_) => {
                form_error.set(Some("Time limit must be a whole number of minutes.".to_string()));
                return;
            }
        };
        let draft = TestConfigDraft {
            test_type: test_type(),
            total_questions,
            time_limit_secs: minutes.saturating_mul(60),
            auto_advance_on_wrong: auto_advance(),
        };
        let config = match draft.validate() {
            Ok(config) => config,
            Err(err) => {
                form_error.set(Some(err.to_string()));
                return;
            }
        };
        form_error.set(None);

        spawn(async move {
            let mut local_vm = {
                let mut guard = vm.write();
                guard.take()
            };
            let Some(mut vm_value) = local_vm.take() else {
                return;
            };

            let result = vm_value.start(config).await;
            let snapshot = DisplayVm::from_vm(&vm_value);

            {
                let mut guard = vm.write();
                *guard = Some(vm_value);
            }
            display.set(snapshot);

            match result {
                Ok(()) => {
                    error.set(None);
                    results.set(None);
                }
                Err(err) => error.set(Some(err)),
            }
        });
    });

    // The results fetch can fail after a successful submit; the panel stays
    // empty until this re-runs the fetch against the cached test id.
    let on_retry_results = use_callback(move |()| {
        let mut vm = vm;
        let mut display = display;
        let mut error = error;
        let mut results = results;
        spawn(async move {
            let mut local_vm = {
                let mut guard = vm.write();
                guard.take()
            };
            let Some(mut vm_value) = local_vm.take() else {
                return;
            };

            let loaded = vm_value.load_results().await;
            let snapshot = DisplayVm::from_vm(&vm_value);

            {
                let mut guard = vm.write();
                *guard = Some(vm_value);
            }
            display.set(snapshot);

            match loaded {
                Ok(data) => {
                    error.set(None);
                    results.set(Some(data));
                }
                Err(err) => error.set(Some(err)),
            }
        });
    });

    let on_new_test = use_callback(move |()| {
        let mut vm = vm;
        let mut display = display;
        let mut results = results;
        let mut error = error;
        if let Some(vm_value) = vm.write().as_mut() {
            vm_value.reset();
        }
        display.set(DisplayVm::initial());
        results.set(None);
        error.set(None);
        show_flag_dialog.set(false);
    });

    let confirm_flag = use_callback(move |()| {
        let category = flag_category();
        let subcategory = flag_subcategory();
        if category.is_empty() {
            return;
        }
        show_flag_dialog.set(false);
        dispatch_intent.call(TestIntent::Flag {
            category,
            subcategory,
        });
    });

    let on_key = use_callback(move |evt: KeyboardEvent| {
        if display.peek().screen != Screen::Test {
            return;
        }
        // Holding a key down must not spray events into the session.
        if evt.data.is_auto_repeating() {
            return;
        }

        if evt.data.key() == Key::Escape {
            evt.prevent_default();
            show_flag_dialog.set(false);
            return;
        }

        if evt.data.code() == Code::Space {
            evt.prevent_default();
            // Space belongs to the dialog while it is open.
            if show_flag_dialog() {
                return;
            }
            dispatch_intent.call(TestIntent::Advance);
            return;
        }

        if let Key::Character(value) = evt.data.key() {
            match value.as_str() {
                "w" | "W" => {
                    evt.prevent_default();
                    if !show_flag_dialog() {
                        show_flag_dialog.set(true);
                    }
                }
                "e" | "E" => {
                    evt.prevent_default();
                    if !show_flag_dialog() {
                        dispatch_intent.call(TestIntent::EndNow);
                    }
                }
                _ => {}
            }
        }
    });

    // Keep exactly one 1 Hz interval alive while the test screen is up. The
    // script clicks the hidden tick button, which funnels back through the
    // controller like any other event.
    use_effect(move || {
        let snapshot = display();
        let timer_key = snapshot.progress.map_or_else(
            || format!("{:?}", snapshot.screen),
            |progress| format!("{:?}:{}", snapshot.screen, progress.total_questions),
        );
        let js = countdown_script(&timer_key, snapshot.screen == Screen::Test);
        let _ = eval(&js);
    });

    // Keyboard events land on the root; grab focus whenever the test starts.
    use_effect(move || {
        if display().screen == Screen::Test {
            let _ = eval("document.getElementById(\"test-root\")?.focus();");
        }
    });

    let snapshot = display();

    rsx! {
        div { class: "page test-page", id: "test-root", tabindex: "0", onkeydown: on_key,
            button {
                id: "test-tick",
                class: "visually-hidden",
                tabindex: "-1",
                r#type: "button",
                onclick: move |_| dispatch_intent.call(TestIntent::Tick),
            }

            if let Some(err) = error() {
                div { class: "banner banner-error",
                    p { "{err.message()}" }
                }
            }

            match snapshot.screen {
                Screen::Setup => rsx! {
                    SetupForm {
                        test_type: test_type(),
                        questions_input: questions_input(),
                        minutes_input: minutes_input(),
                        auto_advance: auto_advance(),
                        form_error: form_error(),
                        on_test_type: move |value| test_type.set(value),
                        on_questions: move |value| questions_input.set(value),
                        on_minutes: move |value| minutes_input.set(value),
                        on_auto_advance: move |value| auto_advance.set(value),
                        on_start: move |()| on_start.call(()),
                    }
                },
                Screen::Test => rsx! {
                    section { class: "test-running",
                        header { class: "test-header",
                            span { class: "test-timer", id: "test-timer-label",
                                "{snapshot.remaining_label}"
                            }
                            if let Some(progress) = snapshot.progress {
                                span { class: "test-progress",
                                    "Question {progress.current_question} of {progress.total_questions}"
                                }
                                span { class: "test-flagged", "Flagged: {progress.wrong_flagged}" }
                            }
                        }
                        p { class: "test-hint",
                            "Space: next question | W: flag wrong | E: end test"
                        }
                        div { class: "test-actions",
                            button {
                                class: "btn btn-primary",
                                r#type: "button",
                                onclick: move |_| dispatch_intent.call(TestIntent::Advance),
                                "Next question"
                            }
                            button {
                                class: "btn btn-secondary",
                                r#type: "button",
                                onclick: move |_| show_flag_dialog.set(true),
                                "Flag wrong"
                            }
                            button {
                                class: "btn btn-danger",
                                r#type: "button",
                                onclick: move |_| dispatch_intent.call(TestIntent::EndNow),
                                "End test"
                            }
                        }
                        if show_flag_dialog() {
                            FlagDialog {
                                categories_state: categories_state.clone(),
                                selected_category: flag_category(),
                                selected_subcategory: flag_subcategory(),
                                on_category: move |value| flag_category.set(value),
                                on_subcategory: move |value| flag_subcategory.set(value),
                                on_confirm: move |()| confirm_flag.call(()),
                                on_cancel: move |()| show_flag_dialog.set(false),
                            }
                        }
                    }
                },
                Screen::Results => rsx! {
                    if let Some(data) = results() {
                        ResultsPanel { data, on_new_test: move |()| on_new_test.call(()) }
                    } else {
                        section { class: "test-results",
                            p { "Results are not available yet." }
                            div { class: "test-actions",
                                button {
                                    class: "btn btn-primary",
                                    r#type: "button",
                                    onclick: move |_| on_retry_results.call(()),
                                    "Retry"
                                }
                                button {
                                    class: "btn btn-secondary",
                                    r#type: "button",
                                    onclick: move |_| on_new_test.call(()),
                                    "New test"
                                }
                            }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn SetupForm(
    test_type: TestType,
    questions_input: String,
    minutes_input: String,
    auto_advance: bool,
    form_error: Option<String>,
    on_test_type: EventHandler<TestType>,
    on_questions: EventHandler<String>,
    on_minutes: EventHandler<String>,
    on_auto_advance: EventHandler<bool>,
    on_start: EventHandler<()>,
) -> Element {
    rsx! {
        section { class: "test-setup",
            h2 { "Start a practice test" }
            form {
                onsubmit: move |evt| {
                    evt.prevent_default();
                    on_start.call(());
                },
                label { r#for: "setup-type", "Test type" }
                select {
                    id: "setup-type",
                    value: "{test_type}",
                    onchange: move |evt| {
                        if let Ok(parsed) = evt.value().parse::<TestType>() {
                            on_test_type.call(parsed);
                        }
                    },
                    for option in TestType::all() {
                        option { value: "{option}", selected: *option == test_type, "{option.label()}" }
                    }
                }
                label { r#for: "setup-questions", "Number of questions" }
                input {
                    id: "setup-questions",
                    r#type: "number",
                    min: "1",
                    max: "500",
                    value: "{questions_input}",
                    oninput: move |evt| on_questions.call(evt.value()),
                }
                label { r#for: "setup-minutes", "Time limit (minutes)" }
                input {
                    id: "setup-minutes",
                    r#type: "number",
                    min: "1",
                    value: "{minutes_input}",
                    oninput: move |evt| on_minutes.call(evt.value()),
                }
                label { class: "checkbox-row",
                    input {
                        r#type: "checkbox",
                        checked: auto_advance,
                        onchange: move |evt| on_auto_advance.call(evt.checked()),
                    }
                    "Move on automatically when a question is flagged wrong"
                }
                if let Some(message) = form_error {
                    p { class: "form-error", "{message}" }
                }
                button { class: "btn btn-primary", r#type: "submit", "Start test" }
            }
        }
    }
}

#[component]
fn FlagDialog(
    categories_state: ViewState<CategoryMap>,
    selected_category: String,
    selected_subcategory: String,
    on_category: EventHandler<String>,
    on_subcategory: EventHandler<String>,
    on_confirm: EventHandler<()>,
    on_cancel: EventHandler<()>,
) -> Element {
    let subcategories = match &categories_state {
        ViewState::Ready(map) => map
            .get(&selected_category)
            .cloned()
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    rsx! {
        div { class: "dialog-overlay",
            div { class: "dialog", role: "dialog", aria_modal: "true",
                h3 { "Flag question as wrong" }
                match categories_state {
                    ViewState::Ready(map) => rsx! {
                        label { r#for: "flag-category", "Category" }
                        select {
                            id: "flag-category",
                            value: "{selected_category}",
                            onchange: {
                                let map = map.clone();
                                move |evt: FormEvent| {
                                    let value = evt.value();
                                    let first_sub = map
                                        .get(&value)
                                        .and_then(|subs| subs.first())
                                        .cloned()
                                        .unwrap_or_default();
                                    on_category.call(value);
                                    on_subcategory.call(first_sub);
                                }
                            },
                            option { value: "", disabled: true, selected: selected_category.is_empty(), "Pick a category" }
                            for name in map.keys() {
                                option {
                                    value: "{name}",
                                    selected: *name == selected_category,
                                    "{name}"
                                }
                            }
                        }
                        label { r#for: "flag-subcategory", "Subcategory" }
                        select {
                            id: "flag-subcategory",
                            value: "{selected_subcategory}",
                            onchange: move |evt: FormEvent| on_subcategory.call(evt.value()),
                            for name in subcategories.iter() {
                                option {
                                    value: "{name}",
                                    selected: *name == selected_subcategory,
                                    "{name}"
                                }
                            }
                        }
                    },
                    _ => rsx! {
                        p { "Loading categories..." }
                    },
                }
                div { class: "dialog-actions",
                    button {
                        class: "btn btn-primary",
                        r#type: "button",
                        disabled: selected_category.is_empty(),
                        onclick: move |_| on_confirm.call(()),
                        "Flag"
                    }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| on_cancel.call(()),
                        "Cancel"
                    }
                }
            }
        }
    }
}

#[component]
fn ResultsPanel(data: ResultsVm, on_new_test: EventHandler<()>) -> Element {
    rsx! {
        section { class: "test-results",
            h2 { "Results" }
            p { class: "results-summary",
                "{data.test_type}: {data.completed} of {data.total} questions ({data.completion_pct}%)"
            }
            p { "Total time: {data.total_time_label} | Average: {data.average_label} per question" }

            if data.rows.is_empty() {
                p { "No questions were completed." }
            } else {
                table { class: "results-table",
                    thead {
                        tr {
                            th { "Question" }
                            th { "Time" }
                            th { "Pace (avg of last 3)" }
                        }
                    }
                    tbody {
                        for row in data.rows.iter() {
                            tr {
                                td { "{row.question}" }
                                td { "{row.time_label}" }
                                td { "{row.trend_label}" }
                            }
                        }
                    }
                }
            }

            if !data.wrong_rows.is_empty() {
                h3 { "Flagged wrong" }
                ul { class: "wrong-list",
                    for wrong in data.wrong_rows.iter() {
                        li {
                            "Question {wrong.question}: {wrong.category} / {wrong.subcategory}"
                        }
                    }
                }
            }

            button {
                class: "btn btn-primary",
                r#type: "button",
                onclick: move |_| on_new_test.call(()),
                "New test"
            }
        }
    }
}
