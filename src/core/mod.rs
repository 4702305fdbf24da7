pub mod errors;
pub mod models;

pub use errors::QuizgenError;
pub use models::{
    BatchReport,
    CardId,
    DeckId,
    FailReason,
    ItemOutcome,
    NoteId,
    NoteTypeId,
    QuizRequest,
    RunCounters,
    SkipReason,
    TargetDeck,
    VocabEntry,
    VocabSet,
    QUIZ_TAG,
};
