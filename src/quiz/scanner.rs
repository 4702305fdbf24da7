use std::collections::HashSet;

use tracing::debug;

use super::encoding;
use crate::{
    collection::CollectionStore,
    core::{
        DeckId,
        NoteId,
        NoteTypeId,
        QuizgenError,
        QUIZ_TAG,
    },
};

/// Scans the target deck for previously generated quiz notes and recovers
/// the set of vocabulary terms they already cover.
///
/// Only notes of the target type bearing the marker tag are considered;
/// anything else in the deck is an unrelated note, not an error. A covered
/// term is either the note's own copied vocabulary field or any term in its
/// decoded distractor list. Content that fails to decode is ignored pair by
/// pair.
pub fn existing_terms(
    store: &impl CollectionStore,
    target_deck: DeckId,
    target_note_type: NoteTypeId,
    quiz_field: &str,
    vocab_field: &str,
) -> Result<HashSet<String>, QuizgenError> {
    let mut terms: HashSet<String> = HashSet::new();
    let mut seen: HashSet<NoteId> = HashSet::new();

    for card_id in store.card_ids_in_deck(target_deck, true)? {
        let note_id = store.note_of_card(card_id)?;
        if !seen.insert(note_id) {
            continue;
        }

        let note = store.note(note_id)?;
        if note.note_type != target_note_type || !note.has_tag(QUIZ_TAG) {
            continue;
        }

        let Some(content) = note.get_field(quiz_field) else {
            continue;
        };

        if let Some(own_term) = note.get_field(vocab_field) {
            if !own_term.is_empty() {
                terms.insert(own_term.to_string());
            }
        }

        let decoded = encoding::decode_terms(content);
        if decoded.is_empty() && !content.is_empty() {
            debug!(note_id, "quiz field did not decode to any terms, ignoring");
        }
        terms.extend(decoded);
    }

    Ok(terms)
}
