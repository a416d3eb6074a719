//! # SQLite Warranty Repository
//!
//! Document-store-shaped access to warranty records over SQLite. Every
//! mutation is a whole-record insert or a field-level update keyed by record
//! id; reads are point lookups or exact-match queries on indexed columns.
//! The claim transition uses a single conditional UPDATE so that two
//! concurrent claimants cannot both observe "unclaimed" and both win.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::db::DbConnection;
use crate::domain::models::principal::Principal;
use crate::domain::models::warranty::{
    LifecycleAction, LifecycleEvent, VerificationStatus, Warranty, WarrantyKind,
};
use crate::storage::traits::WarrantyStorage;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Repository for warranty operations
#[derive(Clone)]
pub struct WarrantyRepository {
    db: DbConnection,
}

impl WarrantyRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_warranty(row: &SqliteRow) -> Result<Warranty> {
        let kind: String = row.get("kind");
        let verification_status: String = row.get("verification_status");
        Ok(Warranty {
            id: row.get("id"),
            code: row.get("code"),
            kind: WarrantyKind::from_str(&kind).map_err(|e| anyhow::anyhow!(e))?,
            verification_status: VerificationStatus::from_str(&verification_status)
                .map_err(|e| anyhow::anyhow!(e))?,
            seller_id: row.get("seller_id"),
            seller_email: row.get("seller_email"),
            seller_name: row.get("seller_name"),
            buyer_id: row.get("buyer_id"),
            buyer_email: row.get("buyer_email"),
            customer_name: row.get("customer_name"),
            customer_phone: row.get("customer_phone"),
            product_model: row.get("product_model"),
            brand: row.get("brand"),
            serial_number: row.get("serial_number"),
            notes: row.get("notes"),
            purchase_date: parse_date(row.get("purchase_date"))?,
            expiry_date: parse_date(row.get("expiry_date"))?,
            duration_months: row.get::<i64, _>("duration_months") as u32,
            claimed_at: parse_timestamp_opt(row.get("claimed_at"))?,
            previous_owner: row.get("previous_owner"),
            transferred_at: parse_timestamp_opt(row.get("transferred_at"))?,
            created_at: parse_timestamp(row.get("created_at"))?,
            updated_at: parse_timestamp(row.get("updated_at"))?,
        })
    }

    fn row_to_event(row: &SqliteRow) -> Result<LifecycleEvent> {
        let action: String = row.get("action");
        Ok(LifecycleEvent {
            id: row.get("id"),
            warranty_id: row.get("warranty_id"),
            action: LifecycleAction::from_str(&action).map_err(|e| anyhow::anyhow!(e))?,
            actor_email: row.get("actor_email"),
            occurred_at: parse_timestamp(row.get("occurred_at"))?,
        })
    }
}

fn parse_date(s: String) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&s, DATE_FORMAT)
        .map_err(|e| anyhow::anyhow!("Failed to parse stored date '{}': {}", s, e))
}

fn parse_timestamp(s: String) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(&s)
        .map_err(|e| anyhow::anyhow!("Failed to parse stored timestamp '{}': {}", s, e))?
        .with_timezone(&Utc))
}

fn parse_timestamp_opt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
    match s {
        Some(s) => Ok(Some(parse_timestamp(s)?)),
        None => Ok(None),
    }
}

const SELECT_WARRANTY: &str = r#"
    SELECT id, code, kind, verification_status,
           seller_id, seller_email, seller_name,
           buyer_id, buyer_email,
           customer_name, customer_phone,
           product_model, brand, serial_number, notes,
           purchase_date, expiry_date, duration_months,
           claimed_at, previous_owner, transferred_at,
           created_at, updated_at
    FROM warranties
"#;

#[async_trait]
impl WarrantyStorage for WarrantyRepository {
    async fn store_warranty(&self, warranty: &Warranty) -> Result<()> {
        info!("Storing warranty: {}", warranty.id);
        sqlx::query(
            r#"
            INSERT INTO warranties (
                id, code, kind, verification_status,
                seller_id, seller_email, seller_name,
                buyer_id, buyer_email,
                customer_name, customer_phone,
                product_model, brand, serial_number, notes,
                purchase_date, expiry_date, duration_months,
                claimed_at, previous_owner, transferred_at,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&warranty.id)
        .bind(&warranty.code)
        .bind(warranty.kind.as_str())
        .bind(warranty.verification_status.as_str())
        .bind(&warranty.seller_id)
        .bind(&warranty.seller_email)
        .bind(&warranty.seller_name)
        .bind(&warranty.buyer_id)
        .bind(&warranty.buyer_email)
        .bind(&warranty.customer_name)
        .bind(&warranty.customer_phone)
        .bind(&warranty.product_model)
        .bind(&warranty.brand)
        .bind(&warranty.serial_number)
        .bind(&warranty.notes)
        .bind(warranty.purchase_date.format(DATE_FORMAT).to_string())
        .bind(warranty.expiry_date.format(DATE_FORMAT).to_string())
        .bind(warranty.duration_months as i64)
        .bind(warranty.claimed_at.map(|t| t.to_rfc3339()))
        .bind(&warranty.previous_owner)
        .bind(warranty.transferred_at.map(|t| t.to_rfc3339()))
        .bind(warranty.created_at.to_rfc3339())
        .bind(warranty.updated_at.to_rfc3339())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_warranty(&self, warranty_id: &str) -> Result<Option<Warranty>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_WARRANTY))
            .bind(warranty_id)
            .fetch_optional(self.db.pool())
            .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_warranty(&r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Warranty>> {
        let row = sqlx::query(&format!("{} WHERE code = ?", SELECT_WARRANTY))
            .bind(code)
            .fetch_optional(self.db.pool())
            .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_warranty(&r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_serial(&self, serial_number: &str) -> Result<Option<Warranty>> {
        let row = sqlx::query(&format!(
            "{} WHERE serial_number = ? ORDER BY created_at DESC LIMIT 1",
            SELECT_WARRANTY
        ))
        .bind(serial_number)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_warranty(&r)?)),
            None => Ok(None),
        }
    }

    async fn code_exists(&self, code: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM warranties WHERE code = ?")
            .bind(code)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }

    async fn list_by_seller(&self, seller_id: &str) -> Result<Vec<Warranty>> {
        let rows = sqlx::query(&format!(
            "{} WHERE seller_id = ? ORDER BY created_at DESC",
            SELECT_WARRANTY
        ))
        .bind(seller_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_warranty).collect()
    }

    async fn list_by_buyer(&self, buyer_id: &str) -> Result<Vec<Warranty>> {
        let rows = sqlx::query(&format!(
            "{} WHERE buyer_id = ? ORDER BY created_at DESC",
            SELECT_WARRANTY
        ))
        .bind(buyer_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_warranty).collect()
    }

    async fn claim_if_unclaimed(
        &self,
        warranty_id: &str,
        buyer: &Principal,
        claimed_at: DateTime<Utc>,
    ) -> Result<bool> {
        // Conditional update: only one concurrent claimant can see
        // buyer_id IS NULL, so exactly one wins the race.
        let result = sqlx::query(
            r#"
            UPDATE warranties
            SET buyer_id = ?, buyer_email = ?, claimed_at = ?, updated_at = ?
            WHERE id = ? AND buyer_id IS NULL
            "#,
        )
        .bind(&buyer.uid)
        .bind(&buyer.email)
        .bind(claimed_at.to_rfc3339())
        .bind(claimed_at.to_rfc3339())
        .bind(warranty_id)
        .execute(self.db.pool())
        .await?;

        let won = result.rows_affected() == 1;
        debug!(
            "Claim attempt on {} by {}: {}",
            warranty_id,
            buyer.uid,
            if won { "won" } else { "lost" }
        );
        Ok(won)
    }

    async fn release_warranty(
        &self,
        warranty_id: &str,
        previous_owner: &str,
        transferred_at: DateTime<Utc>,
    ) -> Result<()> {
        info!("Releasing warranty: {}", warranty_id);
        sqlx::query(
            r#"
            UPDATE warranties
            SET buyer_id = NULL, buyer_email = NULL, claimed_at = NULL,
                previous_owner = ?, transferred_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(previous_owner)
        .bind(transferred_at.to_rfc3339())
        .bind(transferred_at.to_rfc3339())
        .bind(warranty_id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn append_event(&self, event: &LifecycleEvent) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO warranty_events (id, warranty_id, action, actor_email, occurred_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.id)
        .bind(&event.warranty_id)
        .bind(event.action.as_str())
        .bind(&event.actor_email)
        .bind(event.occurred_at.to_rfc3339())
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn list_events(&self, warranty_id: &str) -> Result<Vec<LifecycleEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT id, warranty_id, action, actor_email, occurred_at
            FROM warranty_events
            WHERE warranty_id = ?
            ORDER BY occurred_at ASC
            "#,
        )
        .bind(warranty_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_event).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    async fn setup_test_repo() -> WarrantyRepository {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        WarrantyRepository::new(db)
    }

    fn sample_warranty(code: &str) -> Warranty {
        let now = Utc::now();
        Warranty {
            id: Warranty::generate_id(),
            code: Some(code.to_string()),
            kind: WarrantyKind::Issued,
            verification_status: VerificationStatus::Verified,
            seller_id: Some("seller-1".to_string()),
            seller_email: Some("shop@example.com".to_string()),
            seller_name: Some("Example Electronics".to_string()),
            buyer_id: None,
            buyer_email: None,
            customer_name: Some("Rahim Ahmed".to_string()),
            customer_phone: Some("01700000000".to_string()),
            product_model: "Inverter AC 1.5T".to_string(),
            brand: None,
            serial_number: "SN-12345".to_string(),
            notes: None,
            purchase_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            expiry_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            duration_months: 12,
            claimed_at: None,
            previous_owner: None,
            transferred_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn buyer(uid: &str, email: &str) -> Principal {
        Principal {
            uid: uid.to_string(),
            email: email.to_string(),
            display_name: None,
        }
    }

    #[tokio::test]
    async fn test_store_and_get_round_trip() {
        let repo = setup_test_repo().await;
        let warranty = sample_warranty("CB-AAAA-2222");

        repo.store_warranty(&warranty).await.expect("Failed to store warranty");

        let retrieved = repo
            .get_warranty(&warranty.id)
            .await
            .expect("Failed to get warranty")
            .expect("Warranty should exist");

        assert_eq!(retrieved.code, warranty.code);
        assert_eq!(retrieved.purchase_date, warranty.purchase_date);
        assert_eq!(retrieved.expiry_date, warranty.expiry_date);
        assert_eq!(retrieved.kind, WarrantyKind::Issued);
        assert!(retrieved.buyer_id.is_none());
    }

    #[tokio::test]
    async fn test_find_by_code_and_code_exists() {
        let repo = setup_test_repo().await;
        let warranty = sample_warranty("CB-BBBB-3333");
        repo.store_warranty(&warranty).await.expect("Failed to store warranty");

        assert!(repo.code_exists("CB-BBBB-3333").await.expect("Failed to check code"));
        assert!(!repo.code_exists("CB-ZZZZ-9999").await.expect("Failed to check code"));

        let found = repo
            .find_by_code("CB-BBBB-3333")
            .await
            .expect("Failed to find by code")
            .expect("Should match");
        assert_eq!(found.id, warranty.id);

        assert!(repo
            .find_by_code("CB-ZZZZ-9999")
            .await
            .expect("Failed to query")
            .is_none());
    }

    #[tokio::test]
    async fn test_find_by_serial() {
        let repo = setup_test_repo().await;
        let warranty = sample_warranty("CB-CCCC-4444");
        repo.store_warranty(&warranty).await.expect("Failed to store warranty");

        let found = repo
            .find_by_serial("SN-12345")
            .await
            .expect("Failed to find by serial")
            .expect("Should match");
        assert_eq!(found.id, warranty.id);
    }

    #[tokio::test]
    async fn test_claim_is_conditional_on_unclaimed() {
        let repo = setup_test_repo().await;
        let warranty = sample_warranty("CB-DDDD-5555");
        repo.store_warranty(&warranty).await.expect("Failed to store warranty");

        let first = repo
            .claim_if_unclaimed(&warranty.id, &buyer("buyer-a", "a@example.com"), Utc::now())
            .await
            .expect("Failed to claim");
        assert!(first, "First claim should win");

        let second = repo
            .claim_if_unclaimed(&warranty.id, &buyer("buyer-b", "b@example.com"), Utc::now())
            .await
            .expect("Failed to claim");
        assert!(!second, "Second claim should lose");

        let claimed = repo
            .get_warranty(&warranty.id)
            .await
            .expect("Failed to get warranty")
            .expect("Warranty should exist");
        assert_eq!(claimed.buyer_id.as_deref(), Some("buyer-a"));
        assert_eq!(claimed.buyer_email.as_deref(), Some("a@example.com"));
        assert!(claimed.claimed_at.is_some());
    }

    #[tokio::test]
    async fn test_release_clears_owner_and_stamps_transfer() {
        let repo = setup_test_repo().await;
        let warranty = sample_warranty("CB-EEEE-6666");
        repo.store_warranty(&warranty).await.expect("Failed to store warranty");

        repo.claim_if_unclaimed(&warranty.id, &buyer("buyer-a", "a@example.com"), Utc::now())
            .await
            .expect("Failed to claim");

        repo.release_warranty(&warranty.id, "a@example.com", Utc::now())
            .await
            .expect("Failed to release");

        let released = repo
            .get_warranty(&warranty.id)
            .await
            .expect("Failed to get warranty")
            .expect("Warranty should exist");
        assert!(released.buyer_id.is_none());
        assert!(released.buyer_email.is_none());
        assert!(released.claimed_at.is_none());
        assert_eq!(released.previous_owner.as_deref(), Some("a@example.com"));
        assert!(released.transferred_at.is_some());
    }

    #[tokio::test]
    async fn test_events_append_and_list_in_order() {
        let repo = setup_test_repo().await;
        let warranty = sample_warranty("CB-FFFF-7777");
        repo.store_warranty(&warranty).await.expect("Failed to store warranty");

        let t0 = Utc::now();
        let issued = LifecycleEvent::new(&warranty.id, LifecycleAction::Issued, None, t0);
        let claimed = LifecycleEvent::new(
            &warranty.id,
            LifecycleAction::Claimed,
            Some("a@example.com".to_string()),
            t0 + chrono::Duration::seconds(1),
        );
        repo.append_event(&issued).await.expect("Failed to append event");
        repo.append_event(&claimed).await.expect("Failed to append event");

        let events = repo.list_events(&warranty.id).await.expect("Failed to list events");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, LifecycleAction::Issued);
        assert_eq!(events[1].action, LifecycleAction::Claimed);
        assert_eq!(events[1].actor_email.as_deref(), Some("a@example.com"));
    }

    #[tokio::test]
    async fn test_list_by_seller_and_buyer() {
        let repo = setup_test_repo().await;
        let w1 = sample_warranty("CB-GGGG-8888");
        let mut w2 = sample_warranty("CB-HHHH-9999");
        w2.seller_id = Some("seller-2".to_string());
        repo.store_warranty(&w1).await.expect("Failed to store warranty");
        repo.store_warranty(&w2).await.expect("Failed to store warranty");

        let for_seller = repo.list_by_seller("seller-1").await.expect("Failed to list");
        assert_eq!(for_seller.len(), 1);
        assert_eq!(for_seller[0].id, w1.id);

        repo.claim_if_unclaimed(&w2.id, &buyer("buyer-z", "z@example.com"), Utc::now())
            .await
            .expect("Failed to claim");
        let for_buyer = repo.list_by_buyer("buyer-z").await.expect("Failed to list");
        assert_eq!(for_buyer.len(), 1);
        assert_eq!(for_buyer[0].id, w2.id);
    }
}
