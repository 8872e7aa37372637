//! Persistence seam. One trait, two backends, picked once at startup.

use async_trait::async_trait;
use thiserror::Error;
use time::Date;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};
use crate::diary::entry::DailyEntry;
use crate::profile::model::UserProfile;
use crate::recommendations::repo_types::Recommendation;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Returned (inside `anyhow::Error`) when a unique user field is taken.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{field} already registered")]
pub struct DuplicateUser {
    pub field: &'static str,
}

/// In-place change to one day's entry. An `Err` aborts without saving.
pub type EntryEdit<'a> = Box<dyn FnOnce(&mut DailyEntry) -> anyhow::Result<()> + Send + 'a>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, new: NewUser) -> anyhow::Result<User>;
    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    /// `None` when the user does not exist.
    async fn update_profile(
        &self,
        user_id: Uuid,
        profile: &UserProfile,
    ) -> anyhow::Result<Option<User>>;

    async fn create_recommendation(&self, rec: &Recommendation) -> anyhow::Result<()>;
    async fn find_recommendation(&self, id: Uuid) -> anyhow::Result<Option<Recommendation>>;
    /// Most recent first.
    async fn list_recommendations(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> anyhow::Result<Vec<Recommendation>>;

    async fn find_daily_entry(&self, user_id: Uuid, date: Date)
        -> anyhow::Result<Option<DailyEntry>>;
    /// Applies `edit` to the entry for `(user_id, date)`, creating it first if
    /// missing, and returns the stored result. Edits to the same day are
    /// serialized; a failed edit leaves storage untouched.
    async fn modify_daily_entry<'a>(
        &self,
        user_id: Uuid,
        date: Date,
        edit: EntryEdit<'a>,
    ) -> anyhow::Result<DailyEntry>;
    /// Inclusive range, ascending by date.
    async fn list_daily_entries(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> anyhow::Result<Vec<DailyEntry>>;
}
