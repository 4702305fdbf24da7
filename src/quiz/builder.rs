use std::collections::{
    HashMap,
    HashSet,
};

use tracing::warn;

use super::{
    encoding,
    sampler,
};
use crate::{
    collection::{
        CollectionStore,
        NewNote,
        NoteInfo,
    },
    core::{
        DeckId,
        FailReason,
        ItemOutcome,
        QuizRequest,
        SkipReason,
        VocabEntry,
        VocabSet,
        QUIZ_TAG,
    },
};

/// Everything the per-item step needs besides the source note itself.
/// Built once by the batch driver and shared across the whole run.
pub struct BuildContext<'a> {
    pub request: &'a QuizRequest,
    pub quiz_field: &'a str,
    pub target_deck: DeckId,
    /// Field names of the target note type, in schema order.
    pub target_fields: &'a [String],
    pub pool: &'a [VocabEntry],
    pub vocab_set: &'a VocabSet,
}

/// Runs one source note through the `pending -> {skipped | built | failed}`
/// state machine and commits the quiz note on the built path.
///
/// `covered_terms` is the running existing-term set: seeded by the scanner
/// when skip-existing is on, grown with every built term either way so the
/// same term is never generated twice within one batch.
pub fn build_item(
    store: &mut impl CollectionStore,
    ctx: &BuildContext<'_>,
    note: &NoteInfo,
    covered_terms: &mut HashSet<String>,
) -> ItemOutcome {
    let term = note.get_field(&ctx.request.vocab_field).unwrap_or_default();
    let meaning = note.get_field(&ctx.request.meaning_field).unwrap_or_default();
    if term.is_empty() || meaning.is_empty() {
        return ItemOutcome::Skipped(SkipReason::EmptyFields);
    }

    if covered_terms.contains(term) {
        return ItemOutcome::Skipped(SkipReason::AlreadyCovered);
    }

    let sampled = match sampler::sample_distractors(
        ctx.pool,
        note.id,
        term,
        ctx.request.distractor_count,
    ) {
        Ok(sampled) => sampled,
        Err(_) => return ItemOutcome::Skipped(SkipReason::InsufficientDistractors),
    };

    let pairs: Vec<(&str, &str)> = sampled
        .iter()
        .filter_map(|entry| {
            let meaning = ctx.vocab_set.get(&entry.term).map(String::as_str)?;
            if entry.term.is_empty() || meaning.is_empty() {
                return None;
            }
            Some((entry.term.as_str(), meaning))
        })
        .collect();

    if pairs.is_empty() {
        return ItemOutcome::Failed(FailReason::NoUsablePairs);
    }

    // Copy every field the source note and the target type share by name,
    // then overwrite the quiz field with the encoded distractor list.
    let mut fields: HashMap<String, String> = ctx
        .target_fields
        .iter()
        .filter_map(|name| {
            note.get_field(name).map(|value| (name.clone(), value.to_string()))
        })
        .collect();
    fields.insert(ctx.quiz_field.to_string(), encoding::encode_pairs(pairs));

    let new_note = NewNote {
        note_type: ctx.request.target_note_type,
        deck: ctx.target_deck,
        tags: vec![QUIZ_TAG.to_string()],
        fields,
    };

    match store.add_note(new_note) {
        Ok(_) => {
            covered_terms.insert(term.to_string());
            ItemOutcome::Built
        }
        Err(e) => {
            warn!(note_id = note.id, error = %e, "quiz note commit rejected by host store");
            ItemOutcome::Failed(FailReason::Commit(e.to_string()))
        }
    }
}
