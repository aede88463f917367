pub mod sm2;
pub mod study_queue;

pub use sm2::{calculate_binary, calculate_graded, ScheduleState, Sm2Result, MAX_EASE_FACTOR, MAX_INTERVAL_DAYS, MIN_EASE_FACTOR};
pub use study_queue::{CardPhase, HistoryEntry, StudyRun};
