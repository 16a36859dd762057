use crate::error::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{Holding, HoldingType};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row of the `portfolio_items` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub id: Uuid,
    pub user_id: String,
    pub item_type: String,
    pub item_id: String,
    pub name: String,
    pub added_at: DateTime<Utc>,
}

impl PortfolioItem {
    pub fn to_holding(&self) -> Holding {
        Holding {
            id: self.item_id.clone(),
            item_type: HoldingType::from(self.item_type.clone()),
            name: self.name.clone(),
        }
    }
}

/// The fields a caller supplies when adding an item to a portfolio.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewPortfolioItem {
    pub user_id: String,
    pub item_type: String,
    pub item_id: String,
    pub name: String,
}

/// A row of the `users` table.
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub last_login: Option<String>,
}

/// Persistence for users and their portfolios.
///
/// Implementations reject a second item with the same `(item_type, item_id)`
/// for one user with `DbError::DuplicateEntry`, and report missing rows with
/// `DbError::NotFound`.
#[async_trait]
pub trait PortfolioStore: Send + Sync {
    async fn add_item(&self, item: NewPortfolioItem) -> Result<PortfolioItem, DbError>;

    /// Removes one matching item, the oldest, even when the user holds the
    /// same `item_id` under several item types.
    async fn remove_item(&self, user_id: &str, item_id: &str) -> Result<(), DbError>;

    /// All items for a user, oldest first.
    async fn list_items(&self, user_id: &str) -> Result<Vec<PortfolioItem>, DbError>;

    /// Inserts or updates a user profile, returning the number of rows written.
    async fn save_user(&self, profile: &UserProfile) -> Result<u64, DbError>;

    async fn get_user(&self, user_id: &str) -> Result<UserProfile, DbError>;

    async fn health_check(&self) -> Result<(), DbError>;
}
