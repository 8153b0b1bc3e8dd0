//! Integration tests for the SQLite store.
//!
//! All tests run against an in-memory database with the real
//! migrations applied, so they exercise the actual schema including
//! constraints and joins.

use chrono::{Duration, Utc};
use medsync_storage::Database;
use medsync_storage::models::{AuthToken, Patient, Prescription, RfidCard, User};
use medsync_storage::repositories::{
    CardRepository, CardUpdate, PatientRepository, PatientUpdate, PrescriptionFilter,
    PrescriptionRepository, ScanLogRepository, SqliteCardRepository, SqlitePatientRepository,
    SqlitePrescriptionRepository, SqliteScanLogRepository, SqliteTokenRepository,
    SqliteUserRepository, TokenRepository, UserRepository,
};

fn make_user(id: &str, email: &str, role: &str) -> User {
    User {
        id: id.to_string(),
        email: email.to_string(),
        password_hash: "hash".to_string(),
        name: format!("User {}", id),
        role: role.to_string(),
        created_at: Utc::now(),
        last_login: None,
        is_active: true,
    }
}

fn make_patient(id: &str, name: &str, rfid_uid: Option<&str>) -> Patient {
    let now = Utc::now();
    Patient {
        id: id.to_string(),
        name: name.to_string(),
        date_of_birth: Some("1980-05-01".to_string()),
        gender: None,
        contact: None,
        email: None,
        address: None,
        rfid_uid: rfid_uid.map(str::to_string),
        created_at: now,
        updated_at: now,
    }
}

fn make_card(uid: &str, label: &str, patient_id: Option<&str>) -> RfidCard {
    RfidCard {
        uid: uid.to_string(),
        label: label.to_string(),
        patient_id: patient_id.map(str::to_string),
        registered_at: Utc::now(),
        last_scanned: None,
        is_active: true,
    }
}

#[tokio::test]
async fn test_user_create_and_login_lookup() {
    let db = Database::in_memory().await.unwrap();
    let users = SqliteUserRepository::new(db.pool().clone());

    let user = make_user("u1", "doc@example.com", "doctor");
    users.create(&user).await.unwrap();

    assert!(users.email_exists("doc@example.com").await.unwrap());
    assert!(!users.email_exists("nobody@example.com").await.unwrap());

    let found = users
        .find_active_by_email("doc@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, "u1");
    assert_eq!(found.role, "doctor");
    assert!(found.last_login.is_none());

    let at = Utc::now();
    users.update_last_login("u1", at).await.unwrap();
    let found = users.find_by_id("u1").await.unwrap().unwrap();
    assert!(found.last_login.is_some());
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let db = Database::in_memory().await.unwrap();
    let users = SqliteUserRepository::new(db.pool().clone());

    users
        .create(&make_user("u1", "x@example.com", "patient"))
        .await
        .unwrap();
    let err = users
        .create(&make_user("u2", "x@example.com", "patient"))
        .await
        .unwrap_err();
    assert!(err.is_duplicate(), "expected duplicate, got {:?}", err);
}

#[tokio::test]
async fn test_patient_lookup_by_id_or_rfid() {
    let db = Database::in_memory().await.unwrap();
    let patients = SqlitePatientRepository::new(db.pool().clone());

    patients
        .create(&make_patient("p1", "Alice", Some("ABC123")))
        .await
        .unwrap();

    let by_id = patients.find_by_id_or_rfid("p1").await.unwrap().unwrap();
    assert_eq!(by_id.name, "Alice");

    let by_uid = patients
        .find_by_id_or_rfid("ABC123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_uid.id, "p1");

    assert!(patients.find_by_id_or_rfid("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_patient_partial_update_keeps_unset_fields() {
    let db = Database::in_memory().await.unwrap();
    let patients = SqlitePatientRepository::new(db.pool().clone());

    patients
        .create(&make_patient("p1", "Alice", None))
        .await
        .unwrap();

    let touched = patients
        .update(
            "p1",
            &PatientUpdate {
                contact: Some("555-0100".to_string()),
                ..Default::default()
            },
            Utc::now(),
        )
        .await
        .unwrap();
    assert!(touched);

    let updated = patients.find_by_id_or_rfid("p1").await.unwrap().unwrap();
    assert_eq!(updated.name, "Alice");
    assert_eq!(updated.date_of_birth.as_deref(), Some("1980-05-01"));
    assert_eq!(updated.contact.as_deref(), Some("555-0100"));
}

#[tokio::test]
async fn test_card_registration_and_join() {
    let db = Database::in_memory().await.unwrap();
    let patients = SqlitePatientRepository::new(db.pool().clone());
    let cards = SqliteCardRepository::new(db.pool().clone());

    patients
        .create(&make_patient("p1", "Alice", None))
        .await
        .unwrap();
    cards
        .create(&make_card("ABC123", "Ward 3 badge", Some("p1")))
        .await
        .unwrap();
    cards
        .create(&make_card("DEF456", "Spare", None))
        .await
        .unwrap();

    let listed = cards.list_with_patient().await.unwrap();
    assert_eq!(listed.len(), 2);
    let linked = listed.iter().find(|c| c.uid == "ABC123").unwrap();
    assert_eq!(linked.patient_name.as_deref(), Some("Alice"));
    let unlinked = listed.iter().find(|c| c.uid == "DEF456").unwrap();
    assert!(unlinked.patient_name.is_none());

    // Duplicate uid
    let err = cards
        .create(&make_card("ABC123", "Clone", None))
        .await
        .unwrap_err();
    assert!(err.is_duplicate());
}

#[tokio::test]
async fn test_card_update_can_unlink_patient() {
    let db = Database::in_memory().await.unwrap();
    let patients = SqlitePatientRepository::new(db.pool().clone());
    let cards = SqliteCardRepository::new(db.pool().clone());

    patients
        .create(&make_patient("p1", "Alice", None))
        .await
        .unwrap();
    cards
        .create(&make_card("ABC123", "Badge", Some("p1")))
        .await
        .unwrap();

    // patient_id is written unconditionally: None unlinks.
    cards
        .update(
            "ABC123",
            &CardUpdate {
                label: None,
                patient_id: None,
            },
        )
        .await
        .unwrap();

    let card = cards.find_by_uid("ABC123").await.unwrap().unwrap();
    assert_eq!(card.label, "Badge");
    assert!(card.patient_id.is_none());
}

#[tokio::test]
async fn test_card_deactivate_and_touch() {
    let db = Database::in_memory().await.unwrap();
    let cards = SqliteCardRepository::new(db.pool().clone());

    cards
        .create(&make_card("ABC123", "Badge", None))
        .await
        .unwrap();

    let at = Utc::now();
    cards.touch_last_scanned("ABC123", at).await.unwrap();
    // Touching an unregistered uid is a silent no-op.
    cards.touch_last_scanned("UNKNOWN", at).await.unwrap();

    assert!(cards.deactivate("ABC123").await.unwrap());
    assert!(!cards.deactivate("UNKNOWN").await.unwrap());

    let card = cards.find_by_uid("ABC123").await.unwrap().unwrap();
    assert!(!card.is_active);
    assert!(card.last_scanned.is_some());
}

#[tokio::test]
async fn test_prescription_search_filters() {
    let db = Database::in_memory().await.unwrap();
    let users = SqliteUserRepository::new(db.pool().clone());
    let patients = SqlitePatientRepository::new(db.pool().clone());
    let prescriptions = SqlitePrescriptionRepository::new(db.pool().clone());

    users
        .create(&make_user("d1", "doc@example.com", "doctor"))
        .await
        .unwrap();
    patients
        .create(&make_patient("p1", "Alice", None))
        .await
        .unwrap();
    patients
        .create(&make_patient("p2", "Bob", None))
        .await
        .unwrap();

    for (id, patient, status) in [
        ("rx1", "p1", "active"),
        ("rx2", "p1", "expired"),
        ("rx3", "p2", "active"),
    ] {
        prescriptions
            .create(&Prescription {
                id: id.to_string(),
                patient_id: patient.to_string(),
                doctor_id: "d1".to_string(),
                medication: "Amoxicillin".to_string(),
                dosage: "500mg".to_string(),
                frequency: "3x daily".to_string(),
                date_issued: Utc::now(),
                date_expires: None,
                status: status.to_string(),
                notes: None,
                barcode: Some(format!("RX-{}", id.to_uppercase())),
                verified_at: None,
                verified_by: None,
            })
            .await
            .unwrap();
    }

    let all = prescriptions
        .search(&PrescriptionFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let for_p1 = prescriptions
        .search(&PrescriptionFilter {
            patient_id: Some("p1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(for_p1.len(), 2);

    let active_p1 = prescriptions
        .search(&PrescriptionFilter {
            patient_id: Some("p1".to_string()),
            status: Some("active".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(active_p1.len(), 1);
    assert_eq!(active_p1[0].id, "rx1");

    assert_eq!(prescriptions.find_by_patient("p2").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_prescription_verify_by_barcode() {
    let db = Database::in_memory().await.unwrap();
    let users = SqliteUserRepository::new(db.pool().clone());
    let patients = SqlitePatientRepository::new(db.pool().clone());
    let prescriptions = SqlitePrescriptionRepository::new(db.pool().clone());

    users
        .create(&make_user("d1", "doc@example.com", "doctor"))
        .await
        .unwrap();
    patients
        .create(&make_patient("p1", "Alice", None))
        .await
        .unwrap();
    prescriptions
        .create(&Prescription {
            id: "rx1".to_string(),
            patient_id: "p1".to_string(),
            doctor_id: "d1".to_string(),
            medication: "Ibuprofen".to_string(),
            dosage: "200mg".to_string(),
            frequency: "as needed".to_string(),
            date_issued: Utc::now(),
            date_expires: None,
            status: "active".to_string(),
            notes: None,
            barcode: Some("RX-CAFEBABE".to_string()),
            verified_at: None,
            verified_by: None,
        })
        .await
        .unwrap();

    let detail = prescriptions
        .find_detail("RX-CAFEBABE")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.id, "rx1");
    assert_eq!(detail.patient_name, "Alice");
    assert_eq!(detail.doctor_name, "User d1");

    prescriptions
        .mark_verified("rx1", "ph1", Utc::now())
        .await
        .unwrap();
    let detail = prescriptions.find_detail("rx1").await.unwrap().unwrap();
    assert!(detail.verified_at.is_some());
    assert_eq!(detail.verified_by.as_deref(), Some("ph1"));
}

#[tokio::test]
async fn test_scan_log_recent_with_joins() {
    let db = Database::in_memory().await.unwrap();
    let patients = SqlitePatientRepository::new(db.pool().clone());
    let cards = SqliteCardRepository::new(db.pool().clone());
    let logs = SqliteScanLogRepository::new(db.pool().clone());

    patients
        .create(&make_patient("p1", "Alice", None))
        .await
        .unwrap();
    cards
        .create(&make_card("ABC123", "Badge", Some("p1")))
        .await
        .unwrap();

    let base = Utc::now();
    logs.insert("ABC123", base).await.unwrap();
    logs.insert("UNKNOWN", base + Duration::seconds(1))
        .await
        .unwrap();
    logs.insert("ABC123", base + Duration::seconds(2))
        .await
        .unwrap();

    let recent = logs.recent(2).await.unwrap();
    assert_eq!(recent.len(), 2);
    // Newest first
    assert_eq!(recent[0].rfid_uid, "ABC123");
    assert_eq!(recent[0].label.as_deref(), Some("Badge"));
    assert_eq!(recent[0].patient_name.as_deref(), Some("Alice"));
    // Unregistered uid still logs, with no label
    assert_eq!(recent[1].rfid_uid, "UNKNOWN");
    assert!(recent[1].label.is_none());
}

#[tokio::test]
async fn test_token_lifecycle() {
    let db = Database::in_memory().await.unwrap();
    let users = SqliteUserRepository::new(db.pool().clone());
    let tokens = SqliteTokenRepository::new(db.pool().clone());

    users
        .create(&make_user("u1", "x@example.com", "admin"))
        .await
        .unwrap();

    let now = Utc::now();
    tokens
        .insert(&AuthToken {
            token: "tok-live".to_string(),
            user_id: "u1".to_string(),
            created_at: now,
            expires_at: now + Duration::hours(24),
        })
        .await
        .unwrap();
    tokens
        .insert(&AuthToken {
            token: "tok-stale".to_string(),
            user_id: "u1".to_string(),
            created_at: now - Duration::hours(48),
            expires_at: now - Duration::hours(24),
        })
        .await
        .unwrap();

    assert!(tokens.find("tok-live").await.unwrap().is_some());

    let purged = tokens.purge_expired(now).await.unwrap();
    assert_eq!(purged, 1);
    assert!(tokens.find("tok-stale").await.unwrap().is_none());

    tokens.delete("tok-live").await.unwrap();
    assert!(tokens.find("tok-live").await.unwrap().is_none());
    // Deleting again is idempotent.
    tokens.delete("tok-live").await.unwrap();
}
