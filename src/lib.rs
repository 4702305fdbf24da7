//! Quiz card generation over an Anki-style vocabulary collection.
//!
//! For each vocabulary note in a source deck, the batch assembles a
//! multiple-choice quiz field (the correct meaning plus randomly sampled
//! distractor meanings) and commits the result as a new tagged note in a
//! target deck. The host application owns all storage and is reached
//! through [`collection::CollectionStore`].

pub mod collection;
pub mod config;
pub mod core;
pub mod quiz;

pub use collection::CollectionStore;
pub use config::QuizConfig;
pub use self::core::{
    BatchReport,
    QuizRequest,
    QuizgenError,
    TargetDeck,
};
pub use quiz::{
    run_quiz_batch,
    CancelToken,
    NullProgress,
    ProgressSink,
};
