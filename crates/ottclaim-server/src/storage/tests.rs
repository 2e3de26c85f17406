//! Storage layer tests for the `OTTclaim` server.

use super::db::{ClaimDatabase, DatabaseError};
use super::models::{KeyStatus, OttStatus, PaymentStatus, SalesStatus};
use super::queries_claims::{ClaimFilter, NewClaim};
use super::queries_keys::KeyMatch;

async fn test_db() -> ClaimDatabase {
    ClaimDatabase::open_in_memory().await.unwrap()
}

fn new_claim<'a>(claim_id: &'a str, code: &'a str) -> NewClaim<'a> {
    NewClaim {
        claim_id,
        name: "Asha",
        email: "asha@example.com",
        phone: Some("919876543210"),
        activation_code: code,
        purchase_type: Some("online"),
        ott_status: OttStatus::Pending,
    }
}

// === Claim tests ===

#[tokio::test]
async fn create_and_get_claim() {
    let db = test_db().await;
    let claim = db.create_claim(&new_claim("CLM-1", "NF-1234")).await.unwrap();

    assert_eq!(claim.claim_id, "CLM-1");
    assert_eq!(claim.payment_status, PaymentStatus::Pending);
    assert_eq!(claim.ott_status, OttStatus::Pending);
    assert_eq!(claim.phone.as_deref(), Some("919876543210"));
    assert!(!claim.automation_processed);
    assert!(claim.ott_code.is_none());
}

#[tokio::test]
async fn get_missing_claim_is_not_found() {
    let db = test_db().await;
    let err = db.get_claim("CLM-404").await.unwrap_err();
    assert!(err.to_string().contains("Not found"));
}

#[tokio::test]
async fn delivered_claim_is_never_marked_failed() {
    let db = test_db().await;
    db.create_claim(&new_claim("CLM-1", "NF-1")).await.unwrap();

    assert!(db.mark_claim_delivered("CLM-1", "KEY-1", "Netflix").await.unwrap());
    assert!(!db.mark_claim_failed("CLM-1", "late failure").await.unwrap());
    assert!(!db.mark_claim_delivered("CLM-1", "KEY-2", "Netflix").await.unwrap());

    let claim = db.get_claim("CLM-1").await.unwrap();
    assert_eq!(claim.ott_status, OttStatus::Delivered);
    assert_eq!(claim.ott_code.as_deref(), Some("KEY-1"));
    assert!(claim.failure_reason.is_none());
    assert!(claim.processed_at.is_some());
}

#[tokio::test]
async fn automation_candidates_are_paid_and_unprocessed() {
    let db = test_db().await;
    for (id, code) in [("CLM-1", "A"), ("CLM-2", "B"), ("CLM-3", "C"), ("CLM-4", "D")] {
        db.create_claim(&new_claim(id, code)).await.unwrap();
    }
    db.update_payment("CLM-1", PaymentStatus::Paid, "pay_1").await.unwrap();
    db.update_payment("CLM-2", PaymentStatus::Paid, "pay_2").await.unwrap();
    db.update_payment("CLM-3", PaymentStatus::Failed, "pay_3").await.unwrap();
    db.update_payment("CLM-4", PaymentStatus::Paid, "pay_4").await.unwrap();
    db.mark_claim_failed("CLM-2", "No available keys").await.unwrap();
    db.mark_claim_delivered("CLM-4", "KEY-4", "Netflix").await.unwrap();

    let candidates = db.list_automation_candidates(10).await.unwrap();
    let ids: Vec<_> = candidates.iter().map(|c| c.claim_id.as_str()).collect();
    assert_eq!(ids, vec!["CLM-1"]);
    assert_eq!(db.count_automation_candidates().await.unwrap(), 1);
}

#[tokio::test]
async fn payment_id_binds_to_one_claim() {
    let db = test_db().await;
    db.create_claim(&new_claim("CLM-1", "A")).await.unwrap();
    db.create_claim(&new_claim("CLM-2", "B")).await.unwrap();

    assert!(db.update_payment("CLM-1", PaymentStatus::Pending, "pay_1").await.unwrap());
    assert!(db.update_payment("CLM-1", PaymentStatus::Paid, "pay_1").await.unwrap());

    let err = db
        .update_payment("CLM-2", PaymentStatus::Paid, "pay_1")
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::Conflict(_)));
    assert!(err.to_string().contains("CLM-1"));

    let other = db.get_claim("CLM-2").await.unwrap();
    assert_eq!(other.payment_status, PaymentStatus::Pending);
    assert!(other.payment_id.is_none());
    assert_eq!(db.claim_for_payment("pay_1").await.unwrap().as_deref(), Some("CLM-1"));
}

#[tokio::test]
async fn claim_lease_is_exclusive_until_released() {
    let db = test_db().await;
    db.create_claim(&new_claim("CLM-1", "A")).await.unwrap();

    assert!(db.acquire_claim_lease("CLM-1", 300).await.unwrap());
    assert!(!db.acquire_claim_lease("CLM-1", 300).await.unwrap());

    db.release_claim_lease("CLM-1").await.unwrap();
    assert!(db.acquire_claim_lease("CLM-1", 300).await.unwrap());
    assert!(!db.acquire_claim_lease("CLM-404", 300).await.unwrap());
}

#[tokio::test]
async fn expired_claim_lease_can_be_taken_over() {
    let db = test_db().await;
    db.create_claim(&new_claim("CLM-1", "A")).await.unwrap();

    assert!(db.acquire_claim_lease("CLM-1", -1).await.unwrap());
    assert!(db.acquire_claim_lease("CLM-1", 300).await.unwrap());
}

#[tokio::test]
async fn list_claims_filters_by_status() {
    let db = test_db().await;
    db.create_claim(&new_claim("CLM-1", "A")).await.unwrap();
    db.create_claim(&new_claim("CLM-2", "B")).await.unwrap();
    db.update_payment("CLM-2", PaymentStatus::Paid, "pay_2").await.unwrap();

    let paid = db
        .list_claims(&ClaimFilter {
            payment_status: Some(PaymentStatus::Paid),
            limit: 50,
            ..ClaimFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].claim_id, "CLM-2");

    let all = db
        .list_claims(&ClaimFilter {
            limit: 50,
            ..ClaimFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let counts = db.count_claims_by_payment_status().await.unwrap();
    assert!(counts.contains(&(PaymentStatus::Paid, 1)));
    assert!(counts.contains(&(PaymentStatus::Pending, 1)));
}

#[tokio::test]
async fn record_notifications_sets_flags() {
    let db = test_db().await;
    db.create_claim(&new_claim("CLM-1", "A")).await.unwrap();
    db.record_notifications("CLM-1", true, false).await.unwrap();

    let claim = db.get_claim("CLM-1").await.unwrap();
    assert!(claim.email_sent);
    assert!(!claim.whatsapp_sent);
}

// === Sales record tests ===

#[tokio::test]
async fn sales_lookup_falls_back_to_case_insensitive() {
    let db = test_db().await;
    assert!(db.insert_sales_record("s1", "NF-1234", "Netflix").await.unwrap());

    let exact = db.find_sales_record("NF-1234").await.unwrap().unwrap();
    assert_eq!(exact.product, "Netflix");

    let folded = db.find_sales_record("nf-1234").await.unwrap().unwrap();
    assert_eq!(folded.id, "s1");

    assert!(db.find_sales_record("NF-9999").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_sales_code_is_ignored() {
    let db = test_db().await;
    assert!(db.insert_sales_record("s1", "NF-1", "Netflix").await.unwrap());
    assert!(!db.insert_sales_record("s2", "NF-1", "Prime").await.unwrap());
}

#[tokio::test]
async fn sales_record_is_claimed_only_once() {
    let db = test_db().await;
    db.insert_sales_record("s1", "NF-1", "Netflix").await.unwrap();

    assert!(db.claim_sales_record("s1", "first@example.com").await.unwrap());
    assert!(!db.claim_sales_record("s1", "second@example.com").await.unwrap());

    let record = db.find_sales_record("NF-1").await.unwrap().unwrap();
    assert_eq!(record.status, SalesStatus::Claimed);
    assert_eq!(record.claimed_by.as_deref(), Some("first@example.com"));
    assert!(record.claimed_date.is_some());
}

#[tokio::test]
async fn release_returns_record_to_pool() {
    let db = test_db().await;
    db.insert_sales_record("s1", "NF-1", "Netflix").await.unwrap();
    db.claim_sales_record("s1", "first@example.com").await.unwrap();

    let released = db.release_sales_record("nf-1").await.unwrap().unwrap();
    assert_eq!(released.status, SalesStatus::Available);
    assert!(released.claimed_by.is_none());

    // Releasing an available record is a no-op.
    assert!(db.release_sales_record("NF-1").await.unwrap().is_none());
    assert!(db.claim_sales_record("s1", "again@example.com").await.unwrap());
}

#[tokio::test]
async fn list_sales_records_by_status() {
    let db = test_db().await;
    db.insert_sales_record("s1", "A", "Netflix").await.unwrap();
    db.insert_sales_record("s2", "B", "Netflix").await.unwrap();
    db.claim_sales_record("s1", "x@example.com").await.unwrap();

    let claimed = db
        .list_sales_records(Some(SalesStatus::Claimed), 50, 0)
        .await
        .unwrap();
    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0].activation_code, "A");

    let counts = db.count_sales_by_status().await.unwrap();
    assert!(counts.contains(&(SalesStatus::Available, 1)));
    assert!(counts.contains(&(SalesStatus::Claimed, 1)));
}

// === OTT key tests ===

#[tokio::test]
async fn exact_assignment_takes_matching_platform_only() {
    let db = test_db().await;
    db.create_claim(&new_claim("CLM-1", "A")).await.unwrap();
    db.insert_ott_key("k1", "PRIME-KEY", "Amazon Prime Video").await.unwrap();
    db.insert_ott_key("k2", "NF-KEY", "Netflix").await.unwrap();

    let key = db
        .assign_available_key(KeyMatch::Exact("Netflix"), "asha@example.com", "CLM-1")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(key.activation_code, "NF-KEY");
    assert_eq!(key.status, KeyStatus::Assigned);
    assert_eq!(key.assigned_email.as_deref(), Some("asha@example.com"));
    assert_eq!(key.claim_id.as_deref(), Some("CLM-1"));

    let none = db
        .assign_available_key(KeyMatch::Exact("Netflix"), "asha@example.com", "CLM-1")
        .await
        .unwrap();
    assert!(none.is_none());
}

#[tokio::test]
async fn fuzzy_assignment_matches_containment_both_ways() {
    let db = test_db().await;
    db.create_claim(&new_claim("CLM-1", "A")).await.unwrap();
    db.create_claim(&new_claim("CLM-2", "B")).await.unwrap();
    db.insert_ott_key("k1", "OTTPLAY-KEY", "OTTplay").await.unwrap();
    db.insert_ott_key("k2", "HS-KEY", "Disney+ Hotstar Premium").await.unwrap();

    let shorter = db
        .assign_available_key(
            KeyMatch::Fuzzy("OTTplay Power Package 01 Yr Subscription"),
            "a@example.com",
            "CLM-1",
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(shorter.activation_code, "OTTPLAY-KEY");

    let longer = db
        .assign_available_key(KeyMatch::Fuzzy("disney+ hotstar"), "b@example.com", "CLM-2")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(longer.activation_code, "HS-KEY");
}

#[tokio::test]
async fn any_assignment_takes_oldest_key() {
    let db = test_db().await;
    db.create_claim(&new_claim("CLM-1", "A")).await.unwrap();
    db.insert_ott_key("k1", "FIRST", "ZEE5").await.unwrap();
    db.insert_ott_key("k2", "SECOND", "SonyLIV").await.unwrap();

    let key = db
        .assign_available_key(KeyMatch::Any, "a@example.com", "CLM-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(key.activation_code, "FIRST");
}

#[tokio::test]
async fn last_key_is_handed_out_once() {
    let db = test_db().await;
    db.create_claim(&new_claim("CLM-1", "A")).await.unwrap();
    db.create_claim(&new_claim("CLM-2", "B")).await.unwrap();
    db.insert_ott_key("k1", "ONLY", "Netflix").await.unwrap();

    let (first, second) = tokio::join!(
        db.assign_available_key(KeyMatch::Exact("Netflix"), "a@example.com", "CLM-1"),
        db.assign_available_key(KeyMatch::Exact("Netflix"), "b@example.com", "CLM-2"),
    );
    let winners = [first.unwrap(), second.unwrap()]
        .into_iter()
        .flatten()
        .count();
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn key_inventory_groups_by_platform_and_status() {
    let db = test_db().await;
    db.create_claim(&new_claim("CLM-1", "A")).await.unwrap();
    db.insert_ott_key("k1", "N1", "Netflix").await.unwrap();
    db.insert_ott_key("k2", "N2", "Netflix").await.unwrap();
    db.insert_ott_key("k3", "Z1", "ZEE5").await.unwrap();
    assert!(!db.insert_ott_key("k4", "N1", "Netflix").await.unwrap());
    db.assign_available_key(KeyMatch::Exact("Netflix"), "a@example.com", "CLM-1")
        .await
        .unwrap();

    let inventory = db.key_inventory().await.unwrap();
    let netflix_available = inventory
        .iter()
        .find(|row| row.platform == "Netflix" && row.status == KeyStatus::Available)
        .unwrap();
    assert_eq!(netflix_available.count, 1);
    assert_eq!(inventory.len(), 3);

    let assigned = db
        .list_ott_keys(Some(KeyStatus::Assigned), None, 50, 0)
        .await
        .unwrap();
    assert_eq!(assigned.len(), 1);
    let zee = db.list_ott_keys(None, Some("ZEE5"), 50, 0).await.unwrap();
    assert_eq!(zee.len(), 1);
    assert_eq!(db.get_ott_key_by_code("Z1").await.unwrap().platform, "ZEE5");
}

// === File-backed database ===

#[tokio::test]
async fn file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("claims.db");
    let settings = ottclaim_core::config::DatabaseConfig::default();

    let db = ClaimDatabase::open(&path, &settings).await.unwrap();
    db.insert_sales_record("sr-1", "NF-1", "Netflix").await.unwrap();
    db.pool().close().await;

    let reopened = ClaimDatabase::open(&path, &settings).await.unwrap();
    let record = reopened.find_sales_record("NF-1").await.unwrap().unwrap();
    assert_eq!(record.status, SalesStatus::Available);
}
