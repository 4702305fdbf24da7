use rand::seq::IndexedRandom;

use crate::core::{
    NoteId,
    VocabEntry,
};

/// Declared condition for a pool too small to sample from. The owning item
/// is skipped, not failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsufficientDistractors {
    pub eligible: usize,
    pub requested: usize,
}

/// Picks exactly `count` distinct distractor candidates for one item,
/// uniformly at random without replacement.
///
/// The item itself is excluded by id, and so is every entry sharing its
/// term, so a term can never appear as its own distractor through a
/// different card. Sampling is independent per item; nothing about earlier
/// picks in the same batch is taken into account.
pub fn sample_distractors<'a>(
    pool: &'a [VocabEntry],
    self_id: NoteId,
    self_term: &str,
    count: usize,
) -> Result<Vec<&'a VocabEntry>, InsufficientDistractors> {
    let eligible: Vec<&VocabEntry> =
        pool.iter().filter(|e| e.note_id != self_id && e.term != self_term).collect();

    if eligible.len() < count {
        return Err(InsufficientDistractors { eligible: eligible.len(), requested: count });
    }

    let mut rng = rand::rng();
    Ok(eligible.choose_multiple(&mut rng, count).copied().collect())
}
