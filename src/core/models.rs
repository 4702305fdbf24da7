use std::collections::HashMap;

pub type DeckId = u64;
pub type NoteTypeId = u64;
pub type NoteId = u64;
pub type CardId = u64;

/// Tag attached to every generated quiz note, used to recognize them on later scans.
pub const QUIZ_TAG: &str = "quiz_generated";

/// One usable source item: a note with a non-empty term and meaning.
/// Elements of the distractor candidate pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabEntry {
    pub note_id: NoteId,
    pub term: String,
    pub meaning: String,
}

/// Working index built once per run, term -> meaning. Never persisted.
pub type VocabSet = HashMap<String, String>;

/// Where generated notes are committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetDeck {
    Existing(DeckId),
    /// Find or create the deck named by `QuizConfig::default_quiz_deck_name`.
    CreateDefault,
}

/// Everything the batch needs, as surfaced by the host shell.
#[derive(Debug, Clone)]
pub struct QuizRequest {
    pub source_deck: DeckId,
    pub source_note_type: NoteTypeId,
    pub vocab_field: String,
    pub meaning_field: String,
    pub target_note_type: NoteTypeId,
    pub target_deck: TargetDeck,
    pub skip_existing: bool,
    pub distractor_count: usize,
}

impl QuizRequest {
    pub const MIN_DISTRACTORS: usize = 1;
    pub const MAX_DISTRACTORS: usize = 10;

    /// Clamps the distractor count into the supported 1..=10 range.
    pub fn normalized(mut self) -> Self {
        self.distractor_count =
            self.distractor_count.clamp(Self::MIN_DISTRACTORS, Self::MAX_DISTRACTORS);
        self
    }
}

/// Running tri-count over one batch. Reset at the start of every invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunCounters {
    pub fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Built => self.created += 1,
            ItemOutcome::Skipped(_) => self.skipped += 1,
            ItemOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn processed(&self) -> usize {
        self.created + self.skipped + self.failed
    }
}

/// Final report of one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn from_counters(counters: RunCounters, cancelled: bool) -> Self {
        Self {
            created: counters.created,
            skipped: counters.skipped,
            failed: counters.failed,
            cancelled,
        }
    }

    /// A run that created nothing is surfaced to the user as a no-op.
    pub fn is_noop(&self) -> bool {
        self.created == 0
    }
}

/// Per-item result of the card builder. Skips and failures are values,
/// not errors: the batch driver aggregates them and keeps going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Built,
    Skipped(SkipReason),
    Failed(FailReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Vocabulary or meaning field missing or empty on the source note.
    EmptyFields,
    /// Term already covered by an existing quiz note or earlier in this batch.
    AlreadyCovered,
    /// Eligible candidate pool smaller than the requested distractor count.
    InsufficientDistractors,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailReason {
    /// The source note could not be read back from the host store.
    Read(String),
    /// Every sampled candidate turned out unusable, so no quiz string could be built.
    NoUsablePairs,
    /// The host store rejected the note commit.
    Commit(String),
}
