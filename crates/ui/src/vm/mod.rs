mod test_vm;
mod time_fmt;

pub use test_vm::{ProgressVm, ResultRowVm, ResultsVm, TestOutcome, TestVm, WrongRowVm};
pub use time_fmt::{format_date, format_mmss, format_secs, moving_average};
