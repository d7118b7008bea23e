use std::sync::Arc;

use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, TransactionTrait};

use crate::database::Database;
use crate::entities;
use crate::error::{AppError, AppResult};

pub const SUGGESTION_NOT_FOUND: &str = "Suggestion not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteType {
    Up,
    Down,
}

impl VoteType {
    pub fn parse(value: Option<&str>) -> AppResult<Self> {
        match value {
            Some("up") => Ok(Self::Up),
            Some("down") => Ok(Self::Down),
            _ => Err(AppError::validation("vote_type must be 'up' or 'down'")),
        }
    }
}

/// Songs proposed for the repertoire, ranked by votes.
pub struct SuggestionService {
    db: Arc<Database>,
}

impl SuggestionService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn find(&self, id: i64) -> AppResult<entities::song_suggestion::Model> {
        entities::song_suggestion::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?
            .ok_or_else(|| AppError::not_found(SUGGESTION_NOT_FOUND))
    }

    /// All suggestions by score, highest first. Equal scores keep insertion order.
    pub async fn list(&self) -> AppResult<Vec<entities::song_suggestion::Model>> {
        let mut suggestions = entities::song_suggestion::Entity::find()
            .order_by_asc(entities::song_suggestion::Column::Id)
            .all(&self.db.conn)
            .await?;

        suggestions.sort_by_key(|s| std::cmp::Reverse(s.score()));
        Ok(suggestions)
    }

    /// Create a suggestion. Each field is trimmed and must not be empty.
    pub async fn create(
        &self,
        title: Option<&str>,
        artist: Option<&str>,
        link: Option<&str>,
    ) -> AppResult<entities::song_suggestion::Model> {
        let required = |value: Option<&str>, message: &str| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| AppError::validation(message))
        };
        let title = required(title, "Title is required")?;
        let artist = required(artist, "Artist is required")?;
        let link = required(link, "Link is required")?;

        let suggestion = entities::song_suggestion::ActiveModel {
            title: Set(title),
            artist: Set(artist),
            link: Set(link),
            ..Default::default()
        };

        let model = suggestion.insert(&self.db.conn).await?;
        log::info!(
            "Suggestion created: '{}' by {} (ID: {})",
            model.title,
            model.artist,
            model.id
        );
        Ok(model)
    }

    /// Add exactly one vote.
    pub async fn vote(
        &self,
        id: i64,
        vote: VoteType,
    ) -> AppResult<entities::song_suggestion::Model> {
        let model = self
            .db
            .conn
            .transaction::<_, entities::song_suggestion::Model, AppError>(|txn| {
                Box::pin(async move {
                    let suggestion = entities::song_suggestion::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| AppError::not_found(SUGGESTION_NOT_FOUND))?;

                    let (up, down) = (suggestion.thumbs_up, suggestion.thumbs_down);
                    let mut active: entities::song_suggestion::ActiveModel = suggestion.into();
                    match vote {
                        VoteType::Up => active.thumbs_up = Set(up.saturating_add(1)),
                        VoteType::Down => active.thumbs_down = Set(down.saturating_add(1)),
                    }
                    Ok(active.update(txn).await?)
                })
            })
            .await?;

        log::info!(
            "Suggestion {} voted {:?}: +{} / -{}",
            id,
            vote,
            model.thumbs_up,
            model.thumbs_down
        );
        Ok(model)
    }

    /// Delete after checking the shared password.
    ///
    /// The password is a shared placeholder secret, not authentication.
    /// A missing suggestion is reported before a wrong password.
    pub async fn delete(&self, id: i64, password: Option<&str>, expected: &str) -> AppResult<()> {
        self.find(id).await?;

        if password != Some(expected) {
            log::warn!("Rejected delete of suggestion {}: invalid password", id);
            return Err(AppError::validation("Invalid password"));
        }

        entities::song_suggestion::Entity::delete_by_id(id)
            .exec(&self.db.conn)
            .await?;
        log::info!("Suggestion deleted (ID: {})", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestContext;

    #[tokio::test]
    async fn test_create_trims_and_requires_fields() {
        let ctx = TestContext::new().await;
        let service = ctx.suggestion_service();

        let s = service
            .create(Some(" Creep "), Some("Radiohead"), Some("https://example.com/creep"))
            .await
            .unwrap();
        assert_eq!(s.title, "Creep");
        assert_eq!((s.thumbs_up, s.thumbs_down), (0, 0));

        let err = service
            .create(Some(""), Some("Radiohead"), Some("x"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Title is required");
        let err = service
            .create(Some("Creep"), None, Some("x"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Artist is required");
        let err = service
            .create(Some("Creep"), Some("Radiohead"), Some("   "))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Link is required");
    }

    #[tokio::test]
    async fn test_vote_saturates_at_max() {
        let ctx = TestContext::new().await;
        let service = ctx.suggestion_service();
        let s = service
            .create(Some("Creep"), Some("Radiohead"), Some("link"))
            .await
            .unwrap();

        let mut active: entities::song_suggestion::ActiveModel = s.into();
        active.thumbs_up = Set(i32::MAX);
        let s = active.update(&ctx.db.conn).await.unwrap();

        let after = service.vote(s.id, VoteType::Up).await.unwrap();
        assert_eq!((after.thumbs_up, after.thumbs_down), (i32::MAX, 0));
    }

    #[tokio::test]
    async fn test_votes_change_one_counter() {
        let ctx = TestContext::new().await;
        let service = ctx.suggestion_service();
        let s = service
            .create(Some("Creep"), Some("Radiohead"), Some("link"))
            .await
            .unwrap();

        let after_up = service.vote(s.id, VoteType::Up).await.unwrap();
        assert_eq!((after_up.thumbs_up, after_up.thumbs_down), (1, 0));

        service.vote(s.id, VoteType::Down).await.unwrap();
        let after_down = service.vote(s.id, VoteType::Down).await.unwrap();
        assert_eq!((after_down.thumbs_up, after_down.thumbs_down), (1, 2));

        assert!(matches!(
            service.vote(999, VoteType::Up).await,
            Err(AppError::NotFound(_))
        ));
        assert!(VoteType::parse(Some("sideways")).is_err());
        assert!(VoteType::parse(None).is_err());
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_score() {
        let ctx = TestContext::new().await;
        let service = ctx.suggestion_service();

        let b = service.create(Some("B"), Some("b"), Some("b")).await.unwrap();
        let a = service.create(Some("A"), Some("a"), Some("a")).await.unwrap();
        for _ in 0..3 {
            service.vote(b.id, VoteType::Up).await.unwrap();
        }
        for _ in 0..5 {
            service.vote(a.id, VoteType::Up).await.unwrap();
        }
        service.vote(a.id, VoteType::Down).await.unwrap();
        let c = service.create(Some("C"), Some("c"), Some("c")).await.unwrap();

        let ids: Vec<_> = service.list().await.unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, [a.id, b.id, c.id]);
    }

    #[tokio::test]
    async fn test_delete_checks_password() {
        let ctx = TestContext::new().await;
        let service = ctx.suggestion_service();
        let s = service
            .create(Some("Creep"), Some("Radiohead"), Some("link"))
            .await
            .unwrap();

        let err = service.delete(s.id, Some("guess"), "admin").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid password");
        assert!(service.delete(s.id, None, "admin").await.is_err());
        assert!(matches!(
            service.delete(999, Some("admin"), "admin").await,
            Err(AppError::NotFound(_))
        ));

        service.delete(s.id, Some("admin"), "admin").await.unwrap();
        assert!(service.list().await.unwrap().is_empty());
    }
}
