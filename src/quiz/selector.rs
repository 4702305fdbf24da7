use std::collections::HashSet;

use crate::{
    collection::CollectionStore,
    core::{
        DeckId,
        NoteId,
        NoteTypeId,
        QuizgenError,
    },
};

/// Card ids are walked in bounded batches so a host driving progress from
/// the same thread is never handed one huge blocking step.
pub const CARD_BATCH_SIZE: usize = 100;

/// Unique ids of all notes of `note_type` anywhere under `deck`, sub-decks
/// included. Notes spanning several cards appear once. Sorted for stable
/// processing order.
pub fn unique_note_ids(
    store: &impl CollectionStore,
    deck: DeckId,
    note_type: NoteTypeId,
) -> Result<Vec<NoteId>, QuizgenError> {
    let card_ids = store.card_ids_in_deck(deck, true)?;

    let mut seen: HashSet<NoteId> = HashSet::new();
    let mut note_ids: Vec<NoteId> = Vec::new();

    for batch in card_ids.chunks(CARD_BATCH_SIZE) {
        for &card_id in batch {
            let note_id = store.note_of_card(card_id)?;
            if !seen.insert(note_id) {
                continue;
            }
            if store.note(note_id)?.note_type == note_type {
                note_ids.push(note_id);
            }
        }
    }

    note_ids.sort_unstable();
    Ok(note_ids)
}
