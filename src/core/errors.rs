use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuizgenError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Failed to migrate target note type schema: {0}")]
    SchemaMigration(String),

    #[error("Collection storage error: {0}")]
    Storage(String),

    #[error("Deck not found: {0}")]
    DeckNotFound(u64),

    #[error("Note type not found: {0}")]
    NoteTypeNotFound(u64),

    #[error("Note not found: {0}")]
    NoteNotFound(u64),

    #[error("Card not found: {0}")]
    CardNotFound(u64),

    #[error("QuizgenError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for QuizgenError {
    fn from(error: std::io::Error) -> Self {
        QuizgenError::Io(Box::new(error))
    }
}
