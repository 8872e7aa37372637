use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DuplicateUser, EntryEdit, Store};
use crate::auth::repo_types::{NewUser, User};
use crate::diary::entry::DailyEntry;
use crate::profile::model::UserProfile;
use crate::recommendations::repo_types::Recommendation;

/// In-process backend for tests and local runs without Postgres.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    // insertion order is creation order
    recommendations: Vec<Recommendation>,
    entries: BTreeMap<(Uuid, Date), DailyEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, new: NewUser) -> anyhow::Result<User> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == new.email) {
            return Err(DuplicateUser { field: "email" }.into());
        }
        if inner.users.values().any(|u| u.username == new.username) {
            return Err(DuplicateUser { field: "username" }.into());
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            created_at: OffsetDateTime::now_utc(),
            profile: UserProfile::default(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        profile: &UserProfile,
    ) -> anyhow::Result<Option<User>> {
        let mut inner = self.inner.write().await;
        Ok(inner.users.get_mut(&user_id).map(|u| {
            u.profile = profile.clone();
            u.clone()
        }))
    }

    async fn create_recommendation(&self, rec: &Recommendation) -> anyhow::Result<()> {
        self.inner.write().await.recommendations.push(rec.clone());
        Ok(())
    }

    async fn find_recommendation(&self, id: Uuid) -> anyhow::Result<Option<Recommendation>> {
        let inner = self.inner.read().await;
        Ok(inner.recommendations.iter().find(|r| r.id == id).cloned())
    }

    async fn list_recommendations(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> anyhow::Result<Vec<Recommendation>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        let inner = self.inner.read().await;
        Ok(inner
            .recommendations
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_daily_entry(
        &self,
        user_id: Uuid,
        date: Date,
    ) -> anyhow::Result<Option<DailyEntry>> {
        let inner = self.inner.read().await;
        Ok(inner.entries.get(&(user_id, date)).map(reload))
    }

    async fn modify_daily_entry<'a>(
        &self,
        user_id: Uuid,
        date: Date,
        edit: EntryEdit<'a>,
    ) -> anyhow::Result<DailyEntry> {
        // the write guard is held across load, edit and store
        let mut inner = self.inner.write().await;
        let mut entry = match inner.entries.get(&(user_id, date)) {
            Some(existing) => reload(existing),
            None => DailyEntry::new(user_id, date),
        };
        edit(&mut entry)?;
        inner.entries.insert((user_id, date), entry.clone());
        Ok(entry)
    }

    async fn list_daily_entries(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> anyhow::Result<Vec<DailyEntry>> {
        if from > to {
            return Ok(Vec::new());
        }
        let inner = self.inner.read().await;
        Ok(inner
            .entries
            .range((user_id, from)..=(user_id, to))
            .map(|(_, e)| reload(e))
            .collect())
    }
}

/// Same contract as the Postgres backend: totals come from the line items.
fn reload(entry: &DailyEntry) -> DailyEntry {
    let mut entry = entry.clone();
    entry.recompute_totals();
    entry
}
