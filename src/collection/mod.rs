//! Interface to the host collection store. The host owns all persistence:
//! decks, note types and notes live in its storage, and this crate only
//! reads them and commits newly built quiz notes through this trait.

use std::collections::HashMap;

use crate::core::{
    CardId,
    DeckId,
    NoteId,
    NoteTypeId,
    QuizgenError,
};

pub mod memory;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckInfo {
    pub id: DeckId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteTypeInfo {
    pub id: NoteTypeId,
    pub name: String,
    /// Field names in schema order.
    pub fields: Vec<String>,
}

/// A note as read from the host: its type, tags and named field values.
#[derive(Debug, Clone)]
pub struct NoteInfo {
    pub id: NoteId,
    pub note_type: NoteTypeId,
    pub tags: Vec<String>,
    pub fields: HashMap<String, String>,
}

impl NoteInfo {
    pub fn get_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A note to be committed to the host.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub note_type: NoteTypeId,
    pub deck: DeckId,
    pub tags: Vec<String>,
    pub fields: HashMap<String, String>,
}

/// Capability surface of the host collection. Synchronous by design: the
/// batch runs to completion on the invoking thread (see `ProgressSink` for
/// the UI yield point).
pub trait CollectionStore {
    fn decks(&self) -> Result<Vec<DeckInfo>, QuizgenError>;

    fn note_types(&self) -> Result<Vec<NoteTypeInfo>, QuizgenError>;

    /// All card ids contained in a deck, optionally including sub-decks.
    fn card_ids_in_deck(
        &self,
        deck: DeckId,
        include_subdecks: bool,
    ) -> Result<Vec<CardId>, QuizgenError>;

    fn note_of_card(&self, card: CardId) -> Result<NoteId, QuizgenError>;

    fn note(&self, id: NoteId) -> Result<NoteInfo, QuizgenError>;

    /// Commits a new note and returns its host-assigned identity.
    fn add_note(&mut self, note: NewNote) -> Result<NoteId, QuizgenError>;

    /// Appends a field to a note type's schema. Callers are expected to
    /// check for an existing field of the same name first.
    fn add_field(&mut self, note_type: NoteTypeId, field: &str) -> Result<(), QuizgenError>;

    fn deck_id_for_name(&self, name: &str) -> Result<Option<DeckId>, QuizgenError>;

    fn create_deck(&mut self, name: &str) -> Result<DeckId, QuizgenError>;
}
