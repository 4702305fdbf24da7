//! End-to-end batch runs over the in-memory collection.

use quizgen::{
    collection::{
        memory::MemoryCollection,
        CollectionStore,
    },
    core::{
        NoteId,
        RunCounters,
        QUIZ_TAG,
    },
    quiz::encoding,
    run_quiz_batch,
    CancelToken,
    NullProgress,
    ProgressSink,
    QuizConfig,
    QuizRequest,
    TargetDeck,
};

struct Fixture {
    col: MemoryCollection,
    request: QuizRequest,
    config: QuizConfig,
    target_deck: u64,
}

/// Source deck with `terms.len()` vocabulary notes (term -> "meaning of
/// term"), a separate target deck and a target note type sharing Front/Back
/// with the source type. The Quiz field is left for the batch to add.
fn fixture(terms: &[&str], distractor_count: usize) -> Fixture {
    let mut col = MemoryCollection::new();
    let source_deck = col.add_deck("Vocab");
    let target_deck = col.add_deck("Quiz Notes");
    let source_type = col.add_note_type("Vocab", &["Front", "Back"]);
    let target_type = col.add_note_type("Quiz", &["Front", "Back"]);

    for &term in terms {
        let meaning = format!("meaning of {}", term);
        col.insert_note(source_type, source_deck, &[], &[("Front", term), ("Back", &meaning)]);
    }

    let request = QuizRequest {
        source_deck,
        source_note_type: source_type,
        vocab_field: "Front".to_string(),
        meaning_field: "Back".to_string(),
        target_note_type: target_type,
        target_deck: TargetDeck::Existing(target_deck),
        skip_existing: false,
        distractor_count,
    };

    Fixture { col, request, config: QuizConfig::default(), target_deck }
}

fn generated_notes(col: &MemoryCollection, deck: u64) -> Vec<quizgen::collection::NoteInfo> {
    let mut seen: Vec<NoteId> = col
        .card_ids_in_deck(deck, true)
        .unwrap()
        .into_iter()
        .map(|c| col.note_of_card(c).unwrap())
        .collect();
    seen.sort_unstable();
    seen.dedup();
    seen.into_iter().map(|id| col.note(id).unwrap()).collect()
}

#[test]
fn five_items_with_enough_distractors_all_build() {
    let mut fx = fixture(&["a", "b", "c", "d", "e"], 3);

    let report = run_quiz_batch(
        &mut fx.col,
        fx.request.clone(),
        &fx.config,
        &mut NullProgress,
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!((report.created, report.skipped, report.failed), (5, 0, 0));
    assert!(!report.is_noop());

    for note in generated_notes(&fx.col, fx.target_deck) {
        assert!(note.has_tag(QUIZ_TAG));

        let own_term = note.get_field("Front").unwrap();
        let pairs = encoding::decode_pairs(note.get_field("Quiz").unwrap());
        assert_eq!(pairs.len(), 3, "every built note decodes to exactly K pairs");
        assert!(
            pairs.iter().all(|(term, _)| term != own_term),
            "a term must never appear as its own distractor"
        );
        for (term, meaning) in &pairs {
            assert_eq!(meaning, &format!("meaning of {}", term));
        }
    }
}

#[test]
fn undersized_pool_skips_every_item() {
    let mut fx = fixture(&["a", "b", "c"], 3);

    let report = run_quiz_batch(
        &mut fx.col,
        fx.request.clone(),
        &fx.config,
        &mut NullProgress,
        &CancelToken::new(),
    )
    .unwrap();

    // Each item's eligible pool is 2 < 3.
    assert_eq!((report.created, report.skipped, report.failed), (0, 3, 0));
    assert!(report.is_noop());
    assert!(generated_notes(&fx.col, fx.target_deck).is_empty());
}

#[test]
fn second_run_with_skip_existing_creates_nothing() {
    let mut fx = fixture(&["a", "b", "c", "d", "e"], 3);
    fx.request.skip_existing = true;

    let first = run_quiz_batch(
        &mut fx.col,
        fx.request.clone(),
        &fx.config,
        &mut NullProgress,
        &CancelToken::new(),
    )
    .unwrap();
    assert_eq!(first.created, 5);

    let second = run_quiz_batch(
        &mut fx.col,
        fx.request.clone(),
        &fx.config,
        &mut NullProgress,
        &CancelToken::new(),
    )
    .unwrap();
    assert_eq!((second.created, second.skipped, second.failed), (0, 5, 0));
    assert_eq!(generated_notes(&fx.col, fx.target_deck).len(), 5);
}

#[test]
fn notes_with_empty_fields_are_skipped() {
    let mut fx = fixture(&["a", "b", "c", "d"], 2);
    let source_type = fx.request.source_note_type;
    let source_deck = fx.request.source_deck;
    fx.col.insert_note(source_type, source_deck, &[], &[("Front", "e"), ("Back", "")]);
    fx.col.insert_note(source_type, source_deck, &[], &[("Back", "orphan meaning")]);

    let report = run_quiz_batch(
        &mut fx.col,
        fx.request.clone(),
        &fx.config,
        &mut NullProgress,
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!((report.created, report.skipped, report.failed), (4, 2, 0));
}

#[test]
fn duplicate_terms_build_only_once_per_batch() {
    let mut fx = fixture(&["a", "b", "c", "d"], 2);
    let source_type = fx.request.source_note_type;
    let source_deck = fx.request.source_deck;
    // A second note for an already present term.
    fx.col.insert_note(source_type, source_deck, &[], &[("Front", "a"), ("Back", "other")]);

    let report = run_quiz_batch(
        &mut fx.col,
        fx.request.clone(),
        &fx.config,
        &mut NullProgress,
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(report.created, 4);
    assert_eq!(report.skipped, 1);
}

#[test]
fn commit_rejection_fails_the_item_and_continues() {
    let mut fx = fixture(&["a", "b", "c", "d", "e"], 3);
    fx.col.fail_next_commits(1);

    let report = run_quiz_batch(
        &mut fx.col,
        fx.request.clone(),
        &fx.config,
        &mut NullProgress,
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!((report.created, report.skipped, report.failed), (4, 0, 1));
}

#[test]
fn mid_batch_note_read_failure_fails_the_item_and_continues() {
    let mut fx = fixture(&["a", "b", "c", "d", "e"], 3);
    // The selector and the pool build each read the five notes once, so
    // reads 1-10 are pre-flight; the 12th read is the second item of the
    // build loop.
    fx.col.fail_note_read_after(11);

    let report = run_quiz_batch(
        &mut fx.col,
        fx.request.clone(),
        &fx.config,
        &mut NullProgress,
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!((report.created, report.skipped, report.failed), (4, 0, 1));
    assert!(!report.cancelled);
    assert_eq!(generated_notes(&fx.col, fx.target_deck).len(), 4);
}

#[test]
fn schema_migration_failure_aborts_before_any_item() {
    let mut fx = fixture(&["a", "b", "c", "d", "e"], 3);
    fx.col.fail_next_add_fields(1);

    let err = run_quiz_batch(
        &mut fx.col,
        fx.request.clone(),
        &fx.config,
        &mut NullProgress,
        &CancelToken::new(),
    )
    .unwrap_err();

    assert!(matches!(err, quizgen::QuizgenError::SchemaMigration(_)));
    assert!(generated_notes(&fx.col, fx.target_deck).is_empty());
}

#[test]
fn default_target_deck_is_created_once() {
    let mut fx = fixture(&["a", "b", "c", "d", "e"], 3);
    fx.request.target_deck = TargetDeck::CreateDefault;
    fx.request.skip_existing = true;

    let first = run_quiz_batch(
        &mut fx.col,
        fx.request.clone(),
        &fx.config,
        &mut NullProgress,
        &CancelToken::new(),
    )
    .unwrap();
    assert_eq!(first.created, 5);

    // "Quiz Notes" already existed in the fixture, so it was reused.
    let deck = fx.col.deck_id_for_name("Quiz Notes").unwrap().unwrap();
    assert_eq!(deck, fx.target_deck);
    assert_eq!(generated_notes(&fx.col, fx.target_deck).len(), 5);

    let second = run_quiz_batch(
        &mut fx.col,
        fx.request.clone(),
        &fx.config,
        &mut NullProgress,
        &CancelToken::new(),
    )
    .unwrap();
    assert_eq!(second.created, 0);
}

#[test]
fn quiz_field_is_added_to_the_target_schema_idempotently() {
    let mut fx = fixture(&["a", "b", "c", "d", "e"], 3);

    run_quiz_batch(
        &mut fx.col,
        fx.request.clone(),
        &fx.config,
        &mut NullProgress,
        &CancelToken::new(),
    )
    .unwrap();
    run_quiz_batch(
        &mut fx.col,
        fx.request.clone(),
        &fx.config,
        &mut NullProgress,
        &CancelToken::new(),
    )
    .unwrap();

    let target = fx
        .col
        .note_types()
        .unwrap()
        .into_iter()
        .find(|t| t.id == fx.request.target_note_type)
        .unwrap();
    assert_eq!(target.fields.iter().filter(|f| f.as_str() == "Quiz").count(), 1);
}

#[test]
fn sub_deck_notes_are_selected() {
    let mut fx = fixture(&["a", "b", "c"], 2);
    let sub_deck = fx.col.add_deck("Vocab::Extra");
    let source_type = fx.request.source_note_type;
    fx.col.insert_note(source_type, sub_deck, &[], &[("Front", "d"), ("Back", "4")]);

    let report = run_quiz_batch(
        &mut fx.col,
        fx.request.clone(),
        &fx.config,
        &mut NullProgress,
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(report.created, 4);
}

struct CancelAfterFirst {
    token: CancelToken,
    calls: usize,
}

impl ProgressSink for CancelAfterFirst {
    fn on_progress(&mut self, _processed: usize, _total: usize, _counters: &RunCounters) {
        self.calls += 1;
        self.token.cancel();
    }
}

#[test]
fn cancellation_stops_between_items_and_keeps_committed_notes() {
    let mut fx = fixture(&["a", "b", "c", "d", "e"], 3);
    let token = CancelToken::new();
    let mut progress = CancelAfterFirst { token: token.clone(), calls: 0 };

    let report =
        run_quiz_batch(&mut fx.col, fx.request.clone(), &fx.config, &mut progress, &token)
            .unwrap();

    assert!(report.cancelled);
    assert_eq!(progress.calls, 1);
    assert_eq!(report.created + report.skipped + report.failed, 1);
    assert_eq!(generated_notes(&fx.col, fx.target_deck).len(), report.created);
}

struct CountingProgress {
    calls: Vec<(usize, usize)>,
}

impl ProgressSink for CountingProgress {
    fn on_progress(&mut self, processed: usize, total: usize, _counters: &RunCounters) {
        self.calls.push((processed, total));
    }
}

#[test]
fn progress_is_reported_after_every_item() {
    let mut fx = fixture(&["a", "b", "c", "d", "e"], 3);
    let mut progress = CountingProgress { calls: Vec::new() };

    run_quiz_batch(
        &mut fx.col,
        fx.request.clone(),
        &fx.config,
        &mut progress,
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(progress.calls.len(), 5);
    assert_eq!(progress.calls.last(), Some(&(5, 5)));
}

#[test]
fn empty_source_deck_is_a_noop() {
    let mut fx = fixture(&[], 3);

    let report = run_quiz_batch(
        &mut fx.col,
        fx.request.clone(),
        &fx.config,
        &mut NullProgress,
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(report, quizgen::BatchReport::default());
    assert!(report.is_noop());
}

#[test]
fn missing_field_selection_aborts_before_any_mutation() {
    let mut fx = fixture(&["a", "b", "c", "d", "e"], 3);
    fx.request.vocab_field = String::new();

    let err = run_quiz_batch(
        &mut fx.col,
        fx.request.clone(),
        &fx.config,
        &mut NullProgress,
        &CancelToken::new(),
    )
    .unwrap_err();

    assert!(matches!(err, quizgen::QuizgenError::MissingConfiguration(_)));
    assert!(generated_notes(&fx.col, fx.target_deck).is_empty());
}

#[test]
fn oversized_distractor_count_is_clamped_to_ten() {
    let mut fx = fixture(
        &["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l"],
        25,
    );

    let report = run_quiz_batch(
        &mut fx.col,
        fx.request.clone(),
        &fx.config,
        &mut NullProgress,
        &CancelToken::new(),
    )
    .unwrap();

    // 12 items, pool of 11 others each, clamped K = 10.
    assert_eq!(report.created, 12);
    for note in generated_notes(&fx.col, fx.target_deck) {
        assert_eq!(encoding::decode_pairs(note.get_field("Quiz").unwrap()).len(), 10);
    }
}
