//! The quiz generation batch: selector -> scanner -> per-item sampling and
//! card building, run synchronously on the invoking thread.

use std::{
    collections::HashSet,
    sync::{
        atomic::{
            AtomicBool,
            Ordering,
        },
        Arc,
    },
};

use tracing::{
    info,
    warn,
};

use crate::{
    collection::CollectionStore,
    config::QuizConfig,
    core::{
        BatchReport,
        DeckId,
        FailReason,
        ItemOutcome,
        NoteId,
        NoteTypeId,
        QuizRequest,
        QuizgenError,
        RunCounters,
        TargetDeck,
        VocabEntry,
        VocabSet,
    },
};

pub mod builder;
pub mod encoding;
pub mod sampler;
pub mod scanner;
pub mod selector;

/// Host-UI yield point: called after every processed item so a shell can
/// repaint a progress bar. Purely a scheduling nicety.
pub trait ProgressSink {
    fn on_progress(&mut self, processed: usize, total: usize, counters: &RunCounters);
}

/// Sink for hosts that do not render progress.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_progress(&mut self, _processed: usize, _total: usize, _counters: &RunCounters) {}
}

/// Cooperative cancellation flag, checked between items. A cancelled batch
/// keeps everything committed so far and reports `cancelled = true`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Runs one full quiz generation batch.
///
/// Pre-flight failures (missing configuration, schema migration) abort
/// before any note is created. Per-item skips and failures are contained
/// and aggregated; the final report carries the tri-count. A report with
/// zero created notes is the no-op case the shell surfaces to the user.
pub fn run_quiz_batch(
    store: &mut impl CollectionStore,
    request: QuizRequest,
    config: &QuizConfig,
    progress: &mut dyn ProgressSink,
    cancel: &CancelToken,
) -> Result<BatchReport, QuizgenError> {
    let request = request.normalized();
    validate_request(&request, config)?;

    let quiz_field = config.quiz_field_name.as_str();
    ensure_quiz_field(store, request.target_note_type, quiz_field)?;
    let target_deck = resolve_target_deck(store, request.target_deck, config)?;

    let note_ids =
        selector::unique_note_ids(store, request.source_deck, request.source_note_type)?;
    if note_ids.is_empty() {
        info!("no matching source notes, nothing to generate");
        return Ok(BatchReport::default());
    }

    let mut covered_terms: HashSet<String> = if request.skip_existing {
        scanner::existing_terms(
            store,
            target_deck,
            request.target_note_type,
            quiz_field,
            &request.vocab_field,
        )?
    } else {
        HashSet::new()
    };

    let (pool, vocab_set) =
        build_vocab_pool(store, &note_ids, &request.vocab_field, &request.meaning_field)?;
    let target_fields = note_type_fields(store, request.target_note_type)?;

    info!(
        source_notes = note_ids.len(),
        pool = pool.len(),
        already_covered = covered_terms.len(),
        distractors = request.distractor_count,
        "starting quiz batch"
    );

    let total = note_ids.len();
    let mut counters = RunCounters::default();
    let mut cancelled = false;

    for &note_id in &note_ids {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        // A note that cannot be read back mid-batch is one failed item,
        // not an abort: notes built so far stay committed.
        let note = match store.note(note_id) {
            Ok(note) => note,
            Err(e) => {
                warn!(note_id, error = %e, "source note read failed, item marked failed");
                counters.record(&ItemOutcome::Failed(FailReason::Read(e.to_string())));
                progress.on_progress(counters.processed(), total, &counters);
                continue;
            }
        };
        let ctx = builder::BuildContext {
            request: &request,
            quiz_field,
            target_deck,
            target_fields: &target_fields,
            pool: &pool,
            vocab_set: &vocab_set,
        };
        let outcome = builder::build_item(store, &ctx, &note, &mut covered_terms);
        counters.record(&outcome);
        progress.on_progress(counters.processed(), total, &counters);
    }

    info!(
        created = counters.created,
        skipped = counters.skipped,
        failed = counters.failed,
        cancelled,
        "quiz batch finished"
    );
    Ok(BatchReport::from_counters(counters, cancelled))
}

/// Makes sure the target note type carries the generated quiz field,
/// adding it once if absent. Idempotent: a re-run detects the existing
/// field and leaves the schema alone.
pub fn ensure_quiz_field(
    store: &mut impl CollectionStore,
    note_type: NoteTypeId,
    quiz_field: &str,
) -> Result<(), QuizgenError> {
    let fields = note_type_fields(store, note_type)?;
    if fields.iter().any(|f| f == quiz_field) {
        return Ok(());
    }

    store
        .add_field(note_type, quiz_field)
        .map_err(|e| QuizgenError::SchemaMigration(e.to_string()))
}

fn validate_request(request: &QuizRequest, config: &QuizConfig) -> Result<(), QuizgenError> {
    if request.vocab_field.is_empty() {
        return Err(QuizgenError::MissingConfiguration("vocabulary field".to_string()));
    }
    if request.meaning_field.is_empty() {
        return Err(QuizgenError::MissingConfiguration("meaning field".to_string()));
    }
    if config.quiz_field_name.is_empty() {
        return Err(QuizgenError::MissingConfiguration("quiz field name".to_string()));
    }
    Ok(())
}

fn resolve_target_deck(
    store: &mut impl CollectionStore,
    target: TargetDeck,
    config: &QuizConfig,
) -> Result<DeckId, QuizgenError> {
    match target {
        TargetDeck::Existing(id) => Ok(id),
        TargetDeck::CreateDefault => {
            let name = config.default_quiz_deck_name.as_str();
            if name.is_empty() {
                return Err(QuizgenError::MissingConfiguration(
                    "default quiz deck name".to_string(),
                ));
            }
            match store.deck_id_for_name(name)? {
                Some(id) => Ok(id),
                None => store.create_deck(name),
            }
        }
    }
}

fn note_type_fields(
    store: &impl CollectionStore,
    note_type: NoteTypeId,
) -> Result<Vec<String>, QuizgenError> {
    store
        .note_types()?
        .into_iter()
        .find(|t| t.id == note_type)
        .map(|t| t.fields)
        .ok_or(QuizgenError::NoteTypeNotFound(note_type))
}

/// Reads every unique source note once and keeps the usable ones as the
/// candidate pool, alongside the term -> meaning index for distractor
/// meaning lookup. Rebuilt every invocation, never persisted.
fn build_vocab_pool(
    store: &impl CollectionStore,
    note_ids: &[NoteId],
    vocab_field: &str,
    meaning_field: &str,
) -> Result<(Vec<VocabEntry>, VocabSet), QuizgenError> {
    let mut pool = Vec::with_capacity(note_ids.len());
    let mut vocab_set = VocabSet::new();

    for &note_id in note_ids {
        let note = store.note(note_id)?;
        let term = note.get_field(vocab_field).unwrap_or_default();
        let meaning = note.get_field(meaning_field).unwrap_or_default();
        if term.is_empty() || meaning.is_empty() {
            continue;
        }

        vocab_set.insert(term.to_string(), meaning.to_string());
        pool.push(VocabEntry {
            note_id,
            term: term.to_string(),
            meaning: meaning.to_string(),
        });
    }

    Ok((pool, vocab_set))
}
