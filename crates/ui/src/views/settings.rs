use dioxus::document::eval;
use dioxus::prelude::*;

use trainer_core::model::{Theme, UserSettingsDraft};

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SaveState {
    Idle,
    Saving,
    Saved,
    Error,
}

fn apply_theme(theme: Theme) {
    let js = format!(
        "document.documentElement.dataset.theme = {:?};",
        theme.as_str()
    );
    let _ = eval(&js);
}

#[component]
pub fn SettingsView() -> Element {
    let ctx = use_context::<AppContext>();
    let settings_service = ctx.settings();

    let mut theme = use_signal(|| Theme::Light);
    let mut sound_enabled = use_signal(|| true);
    let mut save_state = use_signal(|| SaveState::Idle);
    let mut loaded = use_signal(|| false);

    let service_for_resource = settings_service.clone();
    let resource = use_resource(move || {
        let service = service_for_resource.clone();
        async move {
            let settings = service.load().await.map_err(|_| ViewError::Unknown)?;
            Ok::<_, ViewError>((settings.theme(), settings.sound_enabled()))
        }
    });
    let state = view_state_from_resource(resource);

    // Seed the form once from the persisted values, then let the user own it.
    use_effect(move || {
        let value = resource
            .value()
            .read()
            .as_ref()
            .and_then(|value| value.as_ref().ok())
            .copied();
        if let Some((saved_theme, saved_sound)) = value {
            if !loaded() {
                loaded.set(true);
                theme.set(saved_theme);
                sound_enabled.set(saved_sound);
                apply_theme(saved_theme);
            }
        }
    });

    let on_save = use_callback(move |()| {
        let service = settings_service.clone();
        let mut save_state = save_state;
        spawn(async move {
            save_state.set(SaveState::Saving);
            let draft = UserSettingsDraft {
                theme: Some(theme().as_str().to_string()),
                sound_enabled: Some(sound_enabled()),
            };
            match service.save(draft).await {
                Ok(saved) => {
                    apply_theme(saved.theme());
                    save_state.set(SaveState::Saved);
                }
                Err(_) => save_state.set(SaveState::Error),
            }
        });
    });

    let status_label = match save_state() {
        SaveState::Saving => Some("Saving..."),
        SaveState::Saved => Some("Saved"),
        SaveState::Error => Some("Couldn't save"),
        SaveState::Idle => None,
    };

    rsx! {
        div { class: "page",
            h2 { "Settings" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                },
                ViewState::Ready(_) => rsx! {
                    form {
                        onsubmit: move |evt| {
                            evt.prevent_default();
                            on_save.call(());
                        },
                        label { r#for: "settings-theme", "Theme" }
                        select {
                            id: "settings-theme",
                            value: "{theme()}",
                            onchange: move |evt| {
                                if let Ok(parsed) = evt.value().parse::<Theme>() {
                                    theme.set(parsed);
                                    save_state.set(SaveState::Idle);
                                }
                            },
                            option { value: "light", selected: theme() == Theme::Light, "Light" }
                            option { value: "dark", selected: theme() == Theme::Dark, "Dark" }
                        }
                        label { class: "checkbox-row",
                            input {
                                r#type: "checkbox",
                                checked: sound_enabled(),
                                onchange: move |evt| {
                                    sound_enabled.set(evt.checked());
                                    save_state.set(SaveState::Idle);
                                },
                            }
                            "Play sounds"
                        }
                        button { class: "btn btn-primary", r#type: "submit", "Save" }
                        if let Some(label) = status_label {
                            span { class: "save-status", "{label}" }
                        }
                    }
                },
            }
        }
    }
}
