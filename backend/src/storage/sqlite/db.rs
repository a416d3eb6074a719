use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;

/// DbConnection manages database operations
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        // Connect to the database
        let pool = SqlitePool::connect(url).await?;

        // Setup database schema
        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        // Generate a unique database name for tests
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS warranties (
                id TEXT PRIMARY KEY,
                code TEXT UNIQUE,
                kind TEXT NOT NULL,
                verification_status TEXT NOT NULL,
                seller_id TEXT,
                seller_email TEXT,
                seller_name TEXT,
                buyer_id TEXT,
                buyer_email TEXT,
                customer_name TEXT,
                customer_phone TEXT,
                product_model TEXT NOT NULL,
                brand TEXT,
                serial_number TEXT NOT NULL,
                notes TEXT,
                purchase_date TEXT NOT NULL,
                expiry_date TEXT NOT NULL,
                duration_months INTEGER NOT NULL,
                claimed_at TEXT,
                previous_owner TEXT,
                transferred_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS warranty_events (
                id TEXT PRIMARY KEY,
                warranty_id TEXT NOT NULL,
                action TEXT NOT NULL,
                actor_email TEXT,
                occurred_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_warranties_seller ON warranties(seller_id)")
            .execute(pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_warranties_buyer ON warranties(buyer_id)")
            .execute(pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_warranties_serial ON warranties(serial_number)")
            .execute(pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_warranty_events_warranty ON warranty_events(warranty_id)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get the underlying SQLite pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
