use std::sync::atomic::{AtomicI64, Ordering};

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use crate::{entities::favorite, error::AppResult, models::Notice};

/// Per-identity mirror of the favorites table. The table is the source of
/// truth; the in-memory snapshot is replaced wholesale after every mutation
/// and on identity change, never patched in place.
pub struct FavoritesStore {
    db: DatabaseConnection,
    mirror: RwLock<Mirror>,
    stamp: AtomicI64,
}

#[derive(Default)]
struct Mirror {
    owner: Option<String>,
    rows: Vec<favorite::Model>,
    loading: bool,
}

impl FavoritesStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, mirror: RwLock::new(Mirror::default()), stamp: AtomicI64::new(0) }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Re-synchronizes whenever the request identity differs from the
    /// snapshot owner: first activation, login, logout, switch.
    pub async fn activate(&self, user_id: Option<&str>) -> Option<Notice> {
        let owner = self.mirror.read().await.owner.clone();

        match user_id {
            Some(user) if owner.as_deref() != Some(user) => self.refresh(user).await,
            None => {
                if owner.is_some() {
                    let mut mirror = self.mirror.write().await;
                    mirror.owner = None;
                    mirror.rows.clear();
                }
                None
            },
            _ => None,
        }
    }

    /// Replaces the snapshot with a fresh newest-first read of the table.
    /// On failure the previous snapshot is kept and a transient error
    /// notice is surfaced; there is no automatic retry.
    pub async fn refresh(&self, user_id: &str) -> Option<Notice> {
        self.mirror.write().await.loading = true;

        let result = self.query_favorites(user_id).await;

        let mut mirror = self.mirror.write().await;
        mirror.loading = false;

        match result {
            Ok(rows) => {
                mirror.owner = Some(user_id.to_string());
                mirror.rows = rows;
                None
            },
            Err(err) => {
                // Never show one identity's rows to another
                if mirror.owner.as_deref() != Some(user_id) {
                    mirror.owner = Some(user_id.to_string());
                    mirror.rows.clear();
                }
                warn!(user = %user_id, error = %err, "failed to load favorites");
                Some(Notice::error("Failed to load favorites"))
            },
        }
    }

    /// Inserts a favorite, then re-reads the table to confirm. Absent
    /// identity is a silent no-op (the UI gates mutations behind sign-in).
    pub async fn add(
        &self,
        user_id: Option<&str>,
        movie_id: i32,
        title: &str,
        poster_url: &str,
    ) -> Option<Notice> {
        let user_id = user_id?;

        match self.insert_favorite(user_id, movie_id, title, poster_url).await {
            Ok(()) => {
                let refresh_notice = self.refresh(user_id).await;
                Some(refresh_notice.unwrap_or_else(|| Notice::success("Movie added to favorites")))
            },
            Err(err) => {
                warn!(user = %user_id, movie_id, error = %err, "failed to add favorite");
                Some(Notice::error("Failed to add to favorites"))
            },
        }
    }

    /// Deletes by the (user, movie) composite key, never by row id, then
    /// re-reads the table. Removing an absent favorite is a no-op.
    pub async fn remove(&self, user_id: Option<&str>, movie_id: i32) -> Option<Notice> {
        let user_id = user_id?;

        let result = favorite::Entity::delete_many()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::MovieId.eq(movie_id))
            .exec(&self.db)
            .await;

        match result {
            Ok(_) => {
                let refresh_notice = self.refresh(user_id).await;
                Some(
                    refresh_notice
                        .unwrap_or_else(|| Notice::success("Movie removed from favorites")),
                )
            },
            Err(err) => {
                warn!(user = %user_id, movie_id, error = %err, "failed to remove favorite");
                Some(Notice::error("Failed to remove from favorites"))
            },
        }
    }

    /// Local predicate over the snapshot. Never touches the database, so it
    /// can lag a mutation until the compound refresh lands.
    pub async fn is_favorited(&self, movie_id: i32) -> bool {
        self.mirror.read().await.rows.iter().any(|f| f.movie_id == movie_id)
    }

    pub async fn snapshot(&self) -> Vec<favorite::Model> {
        self.mirror.read().await.rows.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.mirror.read().await.loading
    }

    async fn query_favorites(&self, user_id: &str) -> AppResult<Vec<favorite::Model>> {
        let rows = favorite::Entity::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_desc(favorite::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn insert_favorite(
        &self,
        user_id: &str,
        movie_id: i32,
        title: &str,
        poster_url: &str,
    ) -> AppResult<()> {
        let model = favorite::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            movie_id: Set(movie_id),
            movie_title: Set(title.to_string()),
            movie_poster_url: Set(poster_url.to_string()),
            created_at: Set(self.next_created_at()),
        };

        // A repeated toggle must not produce a second row for the same
        // (user, movie) pair; the existing row wins.
        favorite::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    favorite::Column::UserId,
                    favorite::Column::MovieId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    // Strictly increasing so same-instant inserts keep insertion order
    // under the newest-first sort.
    fn next_created_at(&self) -> i64 {
        let now = jiff::Timestamp::now().as_microsecond();
        let mut last = self.stamp.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self.stamp.compare_exchange(last, next, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => return next,
                Err(observed) => last = observed,
            }
        }
    }
}
