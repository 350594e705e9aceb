use quill_core::crypto::{derive_master_key, KdfParams, KeyProfile, Salt};
use quill_core::storage::LOCKED_PLACEHOLDER;
use quill_core::{
    ClientSession, KeywordDetector, NotePayload, NoteService, QuillError, RejectionReason,
    SqliteStore,
};
use uuid::Uuid;

const PASSPHRASE: &str = "correct-horse-battery";

fn profile() -> KeyProfile {
    let mut profile = KeyProfile::generate(KdfParams::default()).expect("profile should generate");
    let key = derive_master_key(PASSPHRASE, &profile.salt, &profile.kdf)
        .expect("derivation should succeed");
    profile.attach_verifier(&key).expect("verifier should attach");
    profile
}

fn service() -> NoteService<SqliteStore> {
    NoteService::new(SqliteStore::open_in_memory().expect("in-memory store should open"))
}

#[tokio::test]
async fn test_sensitive_note_end_to_end() {
    let profile = profile();
    let service = service();
    let session = ClientSession::new(Uuid::new_v4(), KeywordDetector::new());
    session
        .custody()
        .unlock_with_passphrase(PASSPHRASE, &profile)
        .await
        .expect("unlock should succeed");

    let text = "my bank account number is 12345";
    let payload = session
        .compose(Some("Bank"), text, false)
        .await
        .expect("compose should succeed");
    assert!(payload.is_sensitive);
    assert!(payload.content_encrypted);
    assert_eq!(
        payload.sensitive_keywords,
        vec!["bank account".to_string(), "account number".to_string()]
    );
    assert!(!payload.content.as_deref().unwrap_or_default().contains("12345"));

    let stored = service
        .create(session.owner(), payload)
        .expect("policy should accept encrypted note");

    let listed = service.list(session.owner()).expect("list should succeed");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].content.as_deref(), Some(LOCKED_PLACEHOLDER));
    assert_eq!(listed[0].title.as_deref(), Some("Bank"));

    let fetched = service
        .get(session.owner(), &stored.id)
        .expect("get should succeed");
    let revealed = session.reveal(&fetched).await.expect("reveal should succeed");
    assert_eq!(revealed, text);
}

#[tokio::test]
async fn test_locked_session_shows_placeholder_until_unlock() {
    let profile = profile();
    let service = service();
    let session = ClientSession::new(Uuid::new_v4(), KeywordDetector::new());
    session
        .custody()
        .unlock_with_passphrase(PASSPHRASE, &profile)
        .await
        .expect("unlock should succeed");
    let payload = session
        .compose(None, "new credit card pin", false)
        .await
        .expect("compose should succeed");
    let note = service
        .create(session.owner(), payload)
        .expect("create should succeed");

    session.custody().lock();
    let fetched = service
        .get(session.owner(), &note.id)
        .expect("get should succeed");
    assert_eq!(
        session
            .display_content(&fetched)
            .await
            .expect("display should succeed"),
        LOCKED_PLACEHOLDER
    );

    session
        .custody()
        .unlock_with_passphrase(PASSPHRASE, &profile)
        .await
        .expect("unlock should succeed");
    assert_eq!(
        session
            .display_content(&fetched)
            .await
            .expect("display should succeed"),
        "new credit card pin"
    );
}

#[tokio::test]
async fn test_wrong_passphrase_fails_at_unlock() {
    let profile = profile();
    let session = ClientSession::new(Uuid::new_v4(), KeywordDetector::new());

    let result = session
        .custody()
        .unlock_with_passphrase("wrong-horse-battery", &profile)
        .await;

    assert!(matches!(result, Err(QuillError::Decryption(_))));
    assert!(!session.custody().is_unlocked());
}

#[tokio::test]
async fn test_other_device_with_new_salt_cannot_decrypt() {
    let profile = profile();
    let service = service();
    let session = ClientSession::new(Uuid::new_v4(), KeywordDetector::new());
    session
        .custody()
        .unlock_with_passphrase(PASSPHRASE, &profile)
        .await
        .expect("unlock should succeed");
    let payload = session
        .compose(None, "my ssn is on file", false)
        .await
        .expect("compose should succeed");
    let note = service
        .create(session.owner(), payload)
        .expect("create should succeed");

    let other = derive_master_key(PASSPHRASE, &Salt::generate(), &KdfParams::default())
        .expect("derivation should succeed");
    session.custody().unlock(other);

    assert!(matches!(
        session.reveal(&note).await,
        Err(QuillError::Decryption(_))
    ));
}

#[test]
fn test_server_rejects_plaintext_from_buggy_client() {
    let service = service();
    let owner = Uuid::new_v4();

    let err = service
        .create(
            &owner,
            NotePayload {
                content: Some("my password is 123".to_string()),
                ..NotePayload::default()
            },
        )
        .expect_err("plaintext with keywords must be rejected");
    match err {
        QuillError::PolicyRejection(rejection) => {
            assert_eq!(rejection.reason, RejectionReason::ContainsSensitiveKeywords);
            assert_eq!(rejection.matches, vec!["password".to_string()]);
        }
        other => panic!("unexpected error: {}", other),
    }

    let err = service
        .create(
            &owner,
            NotePayload {
                content: Some("harmless".to_string()),
                is_sensitive: true,
                ..NotePayload::default()
            },
        )
        .expect_err("sensitive plaintext must be rejected");
    assert!(matches!(err, QuillError::PolicyRejection(_)));
}

#[test]
fn test_payload_json_round_trips_through_service() {
    let service = service();
    let owner = Uuid::new_v4();
    let json = r#"{"title":"Groceries","content":"milk and eggs","isSensitive":false,"contentEncrypted":false}"#;
    let payload: NotePayload = serde_json::from_str(json).expect("payload should parse");

    let note = service.create(&owner, payload).expect("create should succeed");
    let value = serde_json::to_value(&note).expect("note should serialize");

    assert_eq!(value["content"], "milk and eggs");
    assert_eq!(value["contentEncrypted"], false);
    assert!(value["encryptionMeta"].is_null());
}
