pub mod quiz;
pub mod vocabulary;

pub use quiz::{MultipleChoiceQuestion, QuizDirection, Rating, ScheduleResult, SelectionStrategy};
pub use vocabulary::{
  NewVocabulary, ProgressRecord, SessionDelta, StudySession, TrackedItem, VocabularyItem,
  DEFAULT_EASE_FACTOR,
};
