use crate::connection::health_check;
use crate::error::DbError;
use crate::store::{NewPortfolioItem, PortfolioItem, PortfolioStore, UserProfile};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPool;
use uuid::Uuid;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn holding_exists(&self, item: &NewPortfolioItem) -> Result<bool, DbError> {
        let existing: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM portfolio_items WHERE user_id = $1 AND item_type = $2 AND item_id = $3",
        )
        .bind(&item.user_id)
        .bind(&item.item_type)
        .bind(&item.item_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(existing.is_some())
    }
}

#[async_trait]
impl PortfolioStore for DbRepository {
    async fn add_item(&self, item: NewPortfolioItem) -> Result<PortfolioItem, DbError> {
        if self.holding_exists(&item).await? {
            return Err(DbError::DuplicateEntry);
        }

        let row = PortfolioItem {
            id: Uuid::new_v4(),
            user_id: item.user_id,
            item_type: item.item_type,
            item_id: item.item_id,
            name: item.name,
            added_at: Utc::now(),
        };

        // The unique constraint still guards against a concurrent insert slipping past the check.
        sqlx::query(
            r#"
            INSERT INTO portfolio_items (id, user_id, item_type, item_id, name, added_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(row.id)
        .bind(&row.user_id)
        .bind(&row.item_type)
        .bind(&row.item_id)
        .bind(&row.name)
        .bind(row.added_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                DbError::DuplicateEntry
            }
            other => other.into(),
        })?;

        tracing::info!(user_id = %row.user_id, item_id = %row.item_id, "Added portfolio item.");
        Ok(row)
    }

    async fn remove_item(&self, user_id: &str, item_id: &str) -> Result<(), DbError> {
        // The same item_id may be held under several item types; remove the oldest one only.
        let result = sqlx::query(
            r#"
            DELETE FROM portfolio_items
            WHERE id = (
                SELECT id FROM portfolio_items
                WHERE user_id = $1 AND item_id = $2
                ORDER BY added_at ASC
                LIMIT 1
            )
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    async fn list_items(&self, user_id: &str) -> Result<Vec<PortfolioItem>, DbError> {
        let items = sqlx::query_as::<_, PortfolioItem>(
            r#"
            SELECT id, user_id, item_type, item_id, name, added_at
            FROM portfolio_items
            WHERE user_id = $1
            ORDER BY added_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn save_user(&self, profile: &UserProfile) -> Result<u64, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (user_id, email, given_name, family_name, name, picture, last_login)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO UPDATE SET
                email = EXCLUDED.email,
                given_name = EXCLUDED.given_name,
                family_name = EXCLUDED.family_name,
                name = EXCLUDED.name,
                picture = EXCLUDED.picture,
                last_login = EXCLUDED.last_login
            "#,
        )
        .bind(&profile.user_id)
        .bind(&profile.email)
        .bind(&profile.given_name)
        .bind(&profile.family_name)
        .bind(&profile.name)
        .bind(&profile.picture)
        .bind(&profile.last_login)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn get_user(&self, user_id: &str) -> Result<UserProfile, DbError> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT user_id, email, given_name, family_name, name, picture, last_login
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)
    }

    async fn health_check(&self) -> Result<(), DbError> {
        health_check(&self.pool).await
    }
}
