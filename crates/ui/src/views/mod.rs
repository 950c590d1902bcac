mod history;
mod home;
mod settings;
mod state;
mod test;

pub use history::HistoryView;
pub use home::HomeView;
pub use settings::SettingsView;
pub use state::{ViewError, ViewState, view_state_from_resource};
pub use test::TestView;
