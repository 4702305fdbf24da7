//! In-memory implementation of [`CollectionStore`]. Backs the test suite and
//! doubles as a reference host for embedders without a real collection.
//!
//! Deck names follow the host convention where `"Parent::Child"` is a
//! sub-deck of `"Parent"`.

use std::{
    cell::Cell,
    collections::HashMap,
};

use super::{
    CollectionStore,
    DeckInfo,
    NewNote,
    NoteInfo,
    NoteTypeInfo,
};
use crate::core::{
    CardId,
    DeckId,
    NoteId,
    NoteTypeId,
    QuizgenError,
};

#[derive(Debug, Clone)]
struct StoredNote {
    note_type: NoteTypeId,
    tags: Vec<String>,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy)]
struct StoredCard {
    note: NoteId,
    deck: DeckId,
}

#[derive(Debug, Default)]
pub struct MemoryCollection {
    decks: HashMap<DeckId, String>,
    note_types: HashMap<NoteTypeId, NoteTypeInfo>,
    notes: HashMap<NoteId, StoredNote>,
    cards: HashMap<CardId, StoredCard>,
    next_id: u64,
    fail_next_commits: usize,
    fail_next_add_fields: usize,
    note_read_countdown: Cell<Option<usize>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self { next_id: 1, ..Self::default() }
    }

    fn fresh_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add_deck(&mut self, name: &str) -> DeckId {
        let id = self.fresh_id();
        self.decks.insert(id, name.to_string());
        id
    }

    pub fn add_note_type(&mut self, name: &str, fields: &[&str]) -> NoteTypeId {
        let id = self.fresh_id();
        self.note_types.insert(
            id,
            NoteTypeInfo {
                id,
                name: name.to_string(),
                fields: fields.iter().map(|f| f.to_string()).collect(),
            },
        );
        id
    }

    /// Inserts a note with a single card in `deck`.
    pub fn insert_note(
        &mut self,
        note_type: NoteTypeId,
        deck: DeckId,
        tags: &[&str],
        fields: &[(&str, &str)],
    ) -> NoteId {
        let note_id = self.fresh_id();
        self.notes.insert(
            note_id,
            StoredNote {
                note_type,
                tags: tags.iter().map(|t| t.to_string()).collect(),
                fields: fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            },
        );
        self.attach_card(note_id, deck);
        note_id
    }

    /// Adds another card referencing an existing note, e.g. a reversed card.
    pub fn attach_card(&mut self, note: NoteId, deck: DeckId) -> CardId {
        let card_id = self.fresh_id();
        self.cards.insert(card_id, StoredCard { note, deck });
        card_id
    }

    /// Makes the next `count` calls to `add_note` fail with a storage error.
    pub fn fail_next_commits(&mut self, count: usize) {
        self.fail_next_commits = count;
    }

    /// Makes the next `count` calls to `add_field` fail with a storage error.
    pub fn fail_next_add_fields(&mut self, count: usize) {
        self.fail_next_add_fields = count;
    }

    /// Makes exactly one `note` read fail: the first one after `after`
    /// further successful reads.
    pub fn fail_note_read_after(&mut self, after: usize) {
        self.note_read_countdown.set(Some(after));
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    fn deck_name(&self, deck: DeckId) -> Result<&str, QuizgenError> {
        self.decks.get(&deck).map(String::as_str).ok_or(QuizgenError::DeckNotFound(deck))
    }
}

impl CollectionStore for MemoryCollection {
    fn decks(&self) -> Result<Vec<DeckInfo>, QuizgenError> {
        let mut decks: Vec<DeckInfo> = self
            .decks
            .iter()
            .map(|(id, name)| DeckInfo { id: *id, name: name.clone() })
            .collect();
        decks.sort_by_key(|d| d.id);
        Ok(decks)
    }

    fn note_types(&self) -> Result<Vec<NoteTypeInfo>, QuizgenError> {
        let mut types: Vec<NoteTypeInfo> = self.note_types.values().cloned().collect();
        types.sort_by_key(|t| t.id);
        Ok(types)
    }

    fn card_ids_in_deck(
        &self,
        deck: DeckId,
        include_subdecks: bool,
    ) -> Result<Vec<CardId>, QuizgenError> {
        let name = self.deck_name(deck)?;
        let subdeck_prefix = format!("{}::", name);

        let mut card_ids: Vec<CardId> = self
            .cards
            .iter()
            .filter(|(_, card)| {
                if card.deck == deck {
                    return true;
                }
                if !include_subdecks {
                    return false;
                }
                self.decks
                    .get(&card.deck)
                    .map(|n| n.starts_with(&subdeck_prefix))
                    .unwrap_or(false)
            })
            .map(|(id, _)| *id)
            .collect();
        card_ids.sort_unstable();
        Ok(card_ids)
    }

    fn note_of_card(&self, card: CardId) -> Result<NoteId, QuizgenError> {
        self.cards.get(&card).map(|c| c.note).ok_or(QuizgenError::CardNotFound(card))
    }

    fn note(&self, id: NoteId) -> Result<NoteInfo, QuizgenError> {
        if let Some(left) = self.note_read_countdown.get() {
            if left == 0 {
                self.note_read_countdown.set(None);
                return Err(QuizgenError::Storage("injected read failure".to_string()));
            }
            self.note_read_countdown.set(Some(left - 1));
        }

        let stored = self.notes.get(&id).ok_or(QuizgenError::NoteNotFound(id))?;
        Ok(NoteInfo {
            id,
            note_type: stored.note_type,
            tags: stored.tags.clone(),
            fields: stored.fields.clone(),
        })
    }

    fn add_note(&mut self, note: NewNote) -> Result<NoteId, QuizgenError> {
        if self.fail_next_commits > 0 {
            self.fail_next_commits -= 1;
            return Err(QuizgenError::Storage("injected commit failure".to_string()));
        }
        if !self.note_types.contains_key(&note.note_type) {
            return Err(QuizgenError::NoteTypeNotFound(note.note_type));
        }
        if !self.decks.contains_key(&note.deck) {
            return Err(QuizgenError::DeckNotFound(note.deck));
        }

        let note_id = self.fresh_id();
        self.notes.insert(
            note_id,
            StoredNote { note_type: note.note_type, tags: note.tags, fields: note.fields },
        );
        self.attach_card(note_id, note.deck);
        Ok(note_id)
    }

    fn add_field(&mut self, note_type: NoteTypeId, field: &str) -> Result<(), QuizgenError> {
        if self.fail_next_add_fields > 0 {
            self.fail_next_add_fields -= 1;
            return Err(QuizgenError::Storage("injected schema failure".to_string()));
        }
        let info = self
            .note_types
            .get_mut(&note_type)
            .ok_or(QuizgenError::NoteTypeNotFound(note_type))?;
        info.fields.push(field.to_string());
        Ok(())
    }

    fn deck_id_for_name(&self, name: &str) -> Result<Option<DeckId>, QuizgenError> {
        Ok(self.decks.iter().find(|(_, n)| n.as_str() == name).map(|(id, _)| *id))
    }

    fn create_deck(&mut self, name: &str) -> Result<DeckId, QuizgenError> {
        Ok(self.add_deck(name))
    }
}
