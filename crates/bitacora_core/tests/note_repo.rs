use bitacora_core::{
    check_integrity, KeyValueStore, KvNoteRepository, KvSubjectRepository, MemoryStore, Note,
    NoteKind, NotePatch, NoteRepository, RepoError, Sentiment, Subject, SubjectRepository,
};

fn note(id: &str, subject_id: &str, timestamp: &str) -> Note {
    Note::new(id, subject_id, timestamp, "charla")
}

fn ids(notes: &[Note]) -> Vec<&str> {
    notes.iter().map(|n| n.id.as_str()).collect()
}

fn raw_index(store: &MemoryStore, key: &str) -> Option<String> {
    store.get(key).unwrap()
}

#[test]
fn create_indexes_globally_and_per_subject() {
    let store = MemoryStore::new();
    let repo = KvNoteRepository::new(&store);
    repo.create(&note("n1", "s1", "T1")).unwrap();
    repo.create(&note("n2", "s2", "T2")).unwrap();
    repo.create(&note("n3", "s1", "T3")).unwrap();

    assert_eq!(ids(&repo.list().unwrap()), vec!["n3", "n2", "n1"]);
    assert_eq!(ids(&repo.list_by_subject("s1").unwrap()), vec!["n3", "n1"]);
    assert_eq!(ids(&repo.list_by_subject("s2").unwrap()), vec!["n2"]);
    assert!(repo.list_by_subject("unknown").unwrap().is_empty());
}

#[test]
fn create_and_get_roundtrip_preserves_every_field() {
    let store = MemoryStore::new();
    let repo = KvNoteRepository::new(&store);

    let mut full = note("n1", "s1", "2024-05-01T10:30:00.000Z");
    full.kind = Some(NoteKind::Amigos);
    full.overall_rating = Some(4);
    full.main_topic = Some("viaje".to_string());
    full.positive_points = vec!["escuchó".to_string()];
    full.negative_points = vec!["llegó tarde".to_string()];
    full.improvement_points = vec!["preguntar más".to_string()];
    full.empathy = Some(5);
    full.receptivity = Some(4);
    full.attention = Some(3);
    full.active_listening = Some(2);
    full.apt_comments = Some(1);
    full.other_aspects = Some("ruido".to_string());
    full.topic_changes = Some("trabajo".to_string());
    full.is_memorable = true;
    full.sentiment = Some(Sentiment::Positivo);
    full.tags = vec!["café".to_string()];

    repo.create(&full).unwrap();
    assert_eq!(repo.get("n1").unwrap(), Some(full));
}

#[test]
fn create_twice_does_not_duplicate_either_index() {
    let store = MemoryStore::new();
    let repo = KvNoteRepository::new(&store);
    repo.create(&note("n1", "s1", "T1")).unwrap();
    repo.create(&note("n2", "s1", "T2")).unwrap();

    let mut second = note("n1", "s1", "T1");
    second.content = "otra charla".to_string();
    repo.create(&second).unwrap();

    assert_eq!(ids(&repo.list().unwrap()), vec!["n2", "n1"]);
    assert_eq!(ids(&repo.list_by_subject("s1").unwrap()), vec!["n2", "n1"]);
    assert_eq!(repo.get("n1").unwrap().unwrap().content, "otra charla");
}

#[test]
fn remove_drops_note_from_both_indexes() {
    let store = MemoryStore::new();
    let repo = KvNoteRepository::new(&store);
    repo.create(&note("n1", "s1", "T1")).unwrap();
    repo.create(&note("n2", "s1", "T2")).unwrap();

    repo.remove("n1").unwrap();
    assert_eq!(repo.get("n1").unwrap(), None);
    assert_eq!(ids(&repo.list().unwrap()), vec!["n2"]);
    assert_eq!(ids(&repo.list_by_subject("s1").unwrap()), vec!["n2"]);
}

#[test]
fn remove_absent_note_is_complete_noop() {
    let store = MemoryStore::new();
    let repo = KvNoteRepository::new(&store);
    repo.create(&note("n1", "s1", "T1")).unwrap();
    let before = store.keys_with_prefix("").unwrap();
    let index_before = raw_index(&store, "notes:index");

    repo.remove("ghost").unwrap();
    assert_eq!(store.keys_with_prefix("").unwrap(), before);
    assert_eq!(raw_index(&store, "notes:index"), index_before);
}

#[test]
fn update_merges_patch_and_keeps_other_fields() {
    let store = MemoryStore::new();
    let repo = KvNoteRepository::new(&store);
    let mut original = note("n1", "s1", "T1");
    original.empathy = Some(3);
    original.tags = vec!["uni".to_string()];
    repo.create(&original).unwrap();

    let updated = repo
        .update(
            "n1",
            NotePatch {
                is_memorable: Some(true),
                main_topic: Some(Some("examen".to_string())),
                ..NotePatch::default()
            },
        )
        .unwrap()
        .expect("existing note should update");

    assert!(updated.is_memorable);
    assert_eq!(updated.main_topic.as_deref(), Some("examen"));
    assert_eq!(updated.empathy, Some(3));
    assert_eq!(updated.tags, vec!["uni".to_string()]);
    assert_eq!(updated.content, "charla");
    assert_eq!(repo.get("n1").unwrap(), Some(updated));
}

#[test]
fn update_unknown_note_returns_none_without_side_effects() {
    let store = MemoryStore::new();
    let repo = KvNoteRepository::new(&store);
    let before = store.keys_with_prefix("").unwrap();

    let result = repo
        .update(
            "ghost",
            NotePatch {
                content: Some("x".to_string()),
                ..NotePatch::default()
            },
        )
        .unwrap();

    assert_eq!(result, None);
    assert_eq!(store.keys_with_prefix("").unwrap(), before);
}

#[test]
fn update_moving_subject_relocates_per_subject_index() {
    let store = MemoryStore::new();
    let repo = KvNoteRepository::new(&store);
    repo.create(&note("n1", "s1", "T1")).unwrap();
    repo.create(&note("n2", "s2", "T2")).unwrap();

    repo.update(
        "n1",
        NotePatch {
            subject_id: Some("s2".to_string()),
            ..NotePatch::default()
        },
    )
    .unwrap()
    .expect("existing note should update");

    assert!(repo.list_by_subject("s1").unwrap().is_empty());
    assert_eq!(ids(&repo.list_by_subject("s2").unwrap()), vec!["n1", "n2"]);
    assert_eq!(ids(&repo.list().unwrap()), vec!["n2", "n1"]);

    repo.remove("n1").unwrap();
    assert_eq!(ids(&repo.list_by_subject("s2").unwrap()), vec!["n2"]);
}

#[test]
fn create_overwriting_id_under_new_subject_drops_old_subject_entry() {
    let store = MemoryStore::new();
    let repo = KvNoteRepository::new(&store);
    repo.create(&note("n1", "s1", "T1")).unwrap();
    repo.create(&note("n1", "s2", "T2")).unwrap();

    assert!(repo.list_by_subject("s1").unwrap().is_empty());
    assert_eq!(ids(&repo.list_by_subject("s2").unwrap()), vec!["n1"]);
    assert_eq!(ids(&repo.list().unwrap()), vec!["n1"]);

    repo.remove("n1").unwrap();
    assert_eq!(raw_index(&store, "notes:bySubject:s1").as_deref(), Some("[]"));
    assert_eq!(raw_index(&store, "notes:bySubject:s2").as_deref(), Some("[]"));
    assert!(check_integrity(&store).unwrap().is_clean());
}

#[test]
fn update_rejects_blank_content() {
    let store = MemoryStore::new();
    let repo = KvNoteRepository::new(&store);
    repo.create(&note("n1", "s1", "T1")).unwrap();

    let err = repo
        .update(
            "n1",
            NotePatch {
                content: Some("  ".to_string()),
                ..NotePatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(repo.get("n1").unwrap().unwrap().content, "charla");
}

#[test]
fn corrupt_note_is_omitted_but_stays_indexed() {
    let store = MemoryStore::new();
    let repo = KvNoteRepository::new(&store);
    repo.create(&note("n1", "s1", "T1")).unwrap();
    repo.create(&note("n2", "s1", "T2")).unwrap();
    store.set("note:n1", "<<garbage>>").unwrap();

    assert_eq!(repo.get("n1").unwrap(), None);
    assert_eq!(ids(&repo.list().unwrap()), vec!["n2"]);
    assert_eq!(ids(&repo.list_by_subject("s1").unwrap()), vec!["n2"]);
    assert_eq!(
        raw_index(&store, "notes:index").as_deref(),
        Some(r#"["n2","n1"]"#)
    );

    // Owner unknown, so removal leaves everything as it was.
    repo.remove("n1").unwrap();
    assert_eq!(
        raw_index(&store, "notes:index").as_deref(),
        Some(r#"["n2","n1"]"#)
    );
}

#[test]
fn clear_empties_global_and_affected_subject_indexes() {
    let store = MemoryStore::new();
    let repo = KvNoteRepository::new(&store);
    repo.create(&note("n1", "s1", "T1")).unwrap();
    repo.create(&note("n2", "s2", "T2")).unwrap();

    repo.clear().unwrap();
    assert!(repo.list().unwrap().is_empty());
    assert!(repo.list_by_subject("s1").unwrap().is_empty());
    assert!(repo.list_by_subject("s2").unwrap().is_empty());
    assert_eq!(raw_index(&store, "notes:bySubject:s1").as_deref(), Some("[]"));
    assert_eq!(store.get("note:n1").unwrap(), None);
}

#[test]
fn clear_keeps_subject_entry_of_corrupt_note() {
    let store = MemoryStore::new();
    let repo = KvNoteRepository::new(&store);
    repo.create(&note("n1", "s1", "T1")).unwrap();
    repo.create(&note("n2", "s2", "T2")).unwrap();
    store.set("note:n1", "<<garbage>>").unwrap();

    repo.clear().unwrap();

    assert!(repo.list().unwrap().is_empty());
    assert!(repo.list_by_subject("s1").unwrap().is_empty());
    assert_eq!(
        raw_index(&store, "notes:bySubject:s1").as_deref(),
        Some(r#"["n1"]"#)
    );
    assert_eq!(raw_index(&store, "notes:bySubject:s2").as_deref(), Some("[]"));
    assert_eq!(store.get("note:n1").unwrap(), None);
}

#[test]
fn removing_subject_does_not_cascade_at_repository_layer() {
    let store = MemoryStore::new();
    let subjects = KvSubjectRepository::new(&store);
    let notes = KvNoteRepository::new(&store);

    subjects
        .create(&Subject::new("s1", "Ana", "T0"))
        .unwrap();
    assert_eq!(subjects.list().unwrap().len(), 1);

    notes
        .create(&Note::new("n1", "s1", "T1", "charla"))
        .unwrap();
    assert_eq!(ids(&notes.list_by_subject("s1").unwrap()), vec!["n1"]);
    assert_eq!(ids(&notes.list().unwrap()), vec!["n1"]);

    subjects.remove("s1").unwrap();
    assert!(subjects.list().unwrap().is_empty());
    assert_eq!(ids(&notes.list_by_subject("s1").unwrap()), vec!["n1"]);
}
