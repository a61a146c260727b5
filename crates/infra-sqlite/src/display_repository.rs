// SQLite DisplayRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use token_display_core::domain::{
    DataChangeEvent, DomainError, PersonName, Resource, ResourceKind, SubQueue, SubQueueId,
    SubQueueStatus, Token, TokenQueue, TokenStatus,
};
use token_display_core::error::{AppError, Result};
use token_display_core::port::{ChangeFeed, ChangePublisher, DisplayRepository};
use tokio::sync::broadcast;
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Scheduling data store backed by SQLite
///
/// Every write publishes a [`DataChangeEvent`] after it succeeds.
pub struct SqliteDisplayRepository {
    pool: SqlitePool,
    publisher: ChangePublisher,
}

impl SqliteDisplayRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_publisher(pool, ChangePublisher::default())
    }

    pub fn with_publisher(pool: SqlitePool, publisher: ChangePublisher) -> Self {
        Self { pool, publisher }
    }

    /// Create or update a sub-queue
    pub async fn save_sub_queue(&self, sub_queue: &SubQueue) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO token_sub_queues (id, name, resource_id, status)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                resource_id = excluded.resource_id,
                status = excluded.status
            "#,
        )
        .bind(sub_queue.id.to_string())
        .bind(&sub_queue.name)
        .bind(&sub_queue.resource_id)
        .bind(sub_queue.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        self.publisher.publish(DataChangeEvent::SubQueueChanged {
            sub_queue_id: sub_queue.id,
        });
        Ok(())
    }

    /// Create or update a token queue
    ///
    /// Moving a queue to another resource announces the previous resource too.
    pub async fn save_queue(&self, queue: &TokenQueue) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let previous: Option<String> =
            sqlx::query_scalar("SELECT resource_id FROM token_queues WHERE id = ?")
                .bind(&queue.id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;

        sqlx::query(
            r#"
            INSERT INTO token_queues (id, resource_id, date, is_primary, name)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                resource_id = excluded.resource_id,
                date = excluded.date,
                is_primary = excluded.is_primary,
                name = excluded.name
            "#,
        )
        .bind(&queue.id)
        .bind(&queue.resource_id)
        .bind(queue.date.format(DATE_FORMAT).to_string())
        .bind(queue.is_primary)
        .bind(&queue.name)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        if let Some(previous) = previous.filter(|prev| *prev != queue.resource_id) {
            debug!(queue_id = %queue.id, from = %previous, to = %queue.resource_id, "Queue moved");
            self.publisher.publish(DataChangeEvent::QueueChanged {
                queue_id: queue.id.clone(),
                resource_id: previous,
            });
        }
        self.publisher.publish(DataChangeEvent::QueueChanged {
            queue_id: queue.id.clone(),
            resource_id: queue.resource_id.clone(),
        });
        Ok(())
    }

    /// Insert a new token
    pub async fn insert_token(&self, token: &Token) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tokens (
                id, queue_id, sub_queue_id, category_shorthand, number, status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&token.id)
        .bind(&token.queue_id)
        .bind(token.sub_queue_id.map(|id| id.to_string()))
        .bind(&token.category_shorthand)
        .bind(i64::from(token.number))
        .bind(token.status.as_str())
        .bind(token.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        self.publish_token_change(&token.id, token.sub_queue_id);
        Ok(())
    }

    /// Change a token's status
    pub async fn update_token_status(&self, token_id: &str, status: TokenStatus) -> Result<()> {
        let sub_queue_id: Option<Option<String>> = sqlx::query_scalar(
            r#"
            UPDATE tokens
            SET status = ?
            WHERE id = ?
            RETURNING sub_queue_id
            "#,
        )
        .bind(status.as_str())
        .bind(token_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let sub_queue_id = sub_queue_id
            .ok_or_else(|| AppError::NotFound(format!("Token {} not found", token_id)))?
            .map(|raw| parse_sub_queue_id(&raw))
            .transpose()?;

        debug!(token_id = %token_id, status = %status, "Token status updated");
        self.publish_token_change(token_id, sub_queue_id);
        Ok(())
    }

    /// Move a token to another sub-queue (or detach it)
    ///
    /// Both the previous and the new sub-queue are announced.
    pub async fn assign_token_sub_queue(
        &self,
        token_id: &str,
        sub_queue_id: Option<SubQueueId>,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let previous: Option<Option<String>> =
            sqlx::query_scalar("SELECT sub_queue_id FROM tokens WHERE id = ?")
                .bind(token_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        let previous = previous
            .ok_or_else(|| AppError::NotFound(format!("Token {} not found", token_id)))?
            .map(|raw| parse_sub_queue_id(&raw))
            .transpose()?;

        sqlx::query("UPDATE tokens SET sub_queue_id = ? WHERE id = ?")
            .bind(sub_queue_id.map(|id| id.to_string()))
            .bind(token_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        if previous.is_some() && previous != sub_queue_id {
            self.publish_token_change(token_id, previous);
        }
        self.publish_token_change(token_id, sub_queue_id);
        Ok(())
    }

    fn publish_token_change(&self, token_id: &str, sub_queue_id: Option<SubQueueId>) {
        self.publisher.publish(DataChangeEvent::TokenChanged {
            token_id: token_id.to_string(),
            sub_queue_id,
        });
    }
}

impl ChangeFeed for SqliteDisplayRepository {
    fn subscribe(&self) -> broadcast::Receiver<DataChangeEvent> {
        self.publisher.subscribe()
    }
}

#[async_trait]
impl DisplayRepository for SqliteDisplayRepository {
    async fn find_active_sub_queues(&self, ids: &[SubQueueId]) -> Result<Vec<SubQueue>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, name, resource_id, status FROM token_sub_queues WHERE status = ",
        );
        query.push_bind(SubQueueStatus::Active.as_str());
        query.push(" AND id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id.to_string());
        }
        separated.push_unseparated(")");

        let rows: Vec<SubQueueRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let mut found = rows
            .into_iter()
            .map(SubQueueRow::into_sub_queue)
            .collect::<Result<Vec<_>>>()?;

        // Request order, not storage order
        found.sort_by_key(|sq| ids.iter().position(|id| *id == sq.id));
        Ok(found)
    }

    async fn find_active_sub_queue(&self, id: &SubQueueId) -> Result<Option<SubQueue>> {
        let row = sqlx::query_as::<_, SubQueueRow>(
            "SELECT id, name, resource_id, status FROM token_sub_queues WHERE id = ? AND status = ?",
        )
        .bind(id.to_string())
        .bind(SubQueueStatus::Active.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(SubQueueRow::into_sub_queue).transpose()
    }

    async fn find_sub_queue_ids_by_resource(&self, resource_id: &str) -> Result<Vec<SubQueueId>> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT id FROM token_sub_queues WHERE resource_id = ?")
                .bind(resource_id)
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        ids.iter().map(|raw| parse_sub_queue_id(raw)).collect()
    }

    async fn find_resource(&self, resource_id: &str) -> Result<Resource> {
        let row = sqlx::query_as::<_, ResourceRow>(
            r#"
            SELECT r.id, r.resource_type,
                   u.prefix, u.first_name, u.last_name, u.suffix,
                   hs.name AS service_name,
                   l.name AS location_name
            FROM schedulable_resources r
            LEFT JOIN users u ON u.id = r.user_id
            LEFT JOIN healthcare_services hs ON hs.id = r.healthcare_service_id
            LEFT JOIN locations l ON l.id = r.location_id
            WHERE r.id = ?
            "#,
        )
        .bind(resource_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => Ok(row.into_resource()?),
            None => Err(AppError::Config(format!(
                "Resource {} does not exist",
                resource_id
            ))),
        }
    }

    async fn find_in_progress_token(
        &self,
        sub_queue: &SubQueue,
        date: NaiveDate,
    ) -> Result<Option<Token>> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            SELECT t.id, t.queue_id, t.sub_queue_id, t.category_shorthand,
                   t.number, t.status, t.created_at
            FROM tokens t
            JOIN token_queues q ON q.id = t.queue_id
            WHERE q.resource_id = ?
              AND q.date = ?
              AND q.is_primary = 1
              AND t.sub_queue_id = ?
              AND t.status = ?
            ORDER BY t.created_at ASC, t.id ASC
            LIMIT 1
            "#,
        )
        .bind(&sub_queue.resource_id)
        .bind(date.format(DATE_FORMAT).to_string())
        .bind(sub_queue.id.to_string())
        .bind(TokenStatus::InProgress.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(TokenRow::into_token).transpose()
    }
}

fn parse_sub_queue_id(raw: &str) -> Result<SubQueueId> {
    Ok(raw.parse::<SubQueueId>()?)
}

#[derive(Debug, sqlx::FromRow)]
struct SubQueueRow {
    id: String,
    name: String,
    resource_id: String,
    status: String,
}

impl SubQueueRow {
    fn into_sub_queue(self) -> Result<SubQueue> {
        Ok(SubQueue {
            id: parse_sub_queue_id(&self.id)?,
            name: self.name,
            resource_id: self.resource_id,
            status: self.status.parse::<SubQueueStatus>()?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ResourceRow {
    id: String,
    resource_type: String,
    prefix: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    suffix: Option<String>,
    service_name: Option<String>,
    location_name: Option<String>,
}

impl ResourceRow {
    fn into_resource(self) -> std::result::Result<Resource, DomainError> {
        let missing = |what: &str| DomainError::IncompleteResource {
            id: self.id.clone(),
            reason: format!("{} resource without {}", self.resource_type, what),
        };

        let kind = match self.resource_type.as_str() {
            ResourceKind::PRACTITIONER => ResourceKind::Practitioner(PersonName {
                prefix: self.prefix.clone(),
                first_name: self.first_name.clone().ok_or_else(|| missing("user"))?,
                last_name: self.last_name.clone(),
                suffix: self.suffix.clone(),
            }),
            ResourceKind::HEALTHCARE_SERVICE => ResourceKind::HealthcareService {
                name: self
                    .service_name
                    .clone()
                    .ok_or_else(|| missing("healthcare service"))?,
            },
            ResourceKind::LOCATION => ResourceKind::Location {
                name: self.location_name.clone().ok_or_else(|| missing("location"))?,
            },
            other => return Err(DomainError::UnknownResourceKind(other.to_string())),
        };

        Ok(Resource::new(self.id, kind))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TokenRow {
    id: String,
    queue_id: String,
    sub_queue_id: Option<String>,
    category_shorthand: String,
    number: i64,
    status: String,
    created_at: i64,
}

impl TokenRow {
    fn into_token(self) -> Result<Token> {
        let number = u32::try_from(self.number).map_err(|_| {
            AppError::Database(format!("Token {} has invalid number {}", self.id, self.number))
        })?;

        Ok(Token {
            sub_queue_id: self
                .sub_queue_id
                .as_deref()
                .map(parse_sub_queue_id)
                .transpose()?,
            status: self.status.parse::<TokenStatus>()?,
            id: self.id,
            queue_id: self.queue_id,
            category_shorthand: self.category_shorthand,
            number,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    async fn setup_test_db() -> (SqlitePool, SqliteDisplayRepository) {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        for sql in [
            "INSERT INTO users (id, prefix, first_name, last_name) VALUES ('u1', 'Dr.', 'Mira', 'Rao')",
            "INSERT INTO healthcare_services (id, name) VALUES ('hs1', 'Radiology')",
            "INSERT INTO locations (id, name) VALUES ('loc1', 'Ward 3')",
            "INSERT INTO schedulable_resources (id, resource_type, user_id) VALUES ('r-dr', 'practitioner', 'u1')",
            "INSERT INTO schedulable_resources (id, resource_type, healthcare_service_id) VALUES ('r-hs', 'healthcare_service', 'hs1')",
            "INSERT INTO schedulable_resources (id, resource_type, location_id) VALUES ('r-loc', 'location', 'loc1')",
            "INSERT INTO schedulable_resources (id, resource_type) VALUES ('r-bad', 'device')",
        ] {
            sqlx::query(sql).execute(&pool).await.unwrap();
        }

        let repo = SqliteDisplayRepository::new(pool.clone());
        (pool, repo)
    }

    async fn active_sub_queue(repo: &SqliteDisplayRepository, resource: &str) -> SubQueue {
        let sub_queue = SubQueue::new(
            SubQueueId::new_v4(),
            "Counter",
            resource,
            SubQueueStatus::Active,
        );
        repo.save_sub_queue(&sub_queue).await.unwrap();
        sub_queue
    }

    #[tokio::test]
    async fn test_find_active_sub_queues_filters_and_orders() {
        let (_pool, repo) = setup_test_db().await;
        let a = active_sub_queue(&repo, "r-dr").await;
        let b = active_sub_queue(&repo, "r-hs").await;
        let mut closed = active_sub_queue(&repo, "r-dr").await;
        closed.status = SubQueueStatus::Inactive;
        repo.save_sub_queue(&closed).await.unwrap();

        let found = repo
            .find_active_sub_queues(&[b.id, closed.id, SubQueueId::new_v4(), a.id])
            .await
            .unwrap();

        assert_eq!(found, vec![b.clone(), a.clone()]);
        assert!(repo.find_active_sub_queue(&closed.id).await.unwrap().is_none());
        assert_eq!(repo.find_active_sub_queue(&a.id).await.unwrap(), Some(a));
    }

    #[tokio::test]
    async fn test_find_active_sub_queues_empty_input() {
        let (_pool, repo) = setup_test_db().await;
        assert!(repo.find_active_sub_queues(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_resource_per_kind() {
        let (_pool, repo) = setup_test_db().await;

        assert_eq!(
            repo.find_resource("r-dr").await.unwrap().display_name(),
            "Dr. Mira Rao"
        );
        assert_eq!(
            repo.find_resource("r-hs").await.unwrap().display_name(),
            "Radiology"
        );
        assert_eq!(
            repo.find_resource("r-loc").await.unwrap().display_name(),
            "Ward 3"
        );
    }

    #[tokio::test]
    async fn test_unknown_resource_kind_is_fatal() {
        let (_pool, repo) = setup_test_db().await;
        let err = repo.find_resource("r-bad").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Domain(DomainError::UnknownResourceKind(ref kind)) if kind == "device"
        ));
        assert!(err.is_data_integrity());
    }

    #[tokio::test]
    async fn test_in_progress_token_earliest_of_primary_queue_today() {
        let (_pool, repo) = setup_test_db().await;
        let sub_queue = active_sub_queue(&repo, "r-dr").await;
        repo.save_queue(&TokenQueue::primary("q-today", "r-dr", today(), "OPD"))
            .await
            .unwrap();
        let mut secondary = TokenQueue::primary("q-side", "r-dr", today(), "Side");
        secondary.is_primary = false;
        repo.save_queue(&secondary).await.unwrap();
        repo.save_queue(&TokenQueue::primary(
            "q-yesterday",
            "r-dr",
            today().pred_opt().unwrap(),
            "OPD",
        ))
        .await
        .unwrap();

        let tokens = [
            ("t-late", "q-today", 9, 3_000),
            ("t-early", "q-today", 7, 2_000),
            ("t-side", "q-side", 1, 1_000),
            ("t-old", "q-yesterday", 2, 500),
        ];
        for (id, queue, number, created_at) in tokens {
            repo.insert_token(
                &Token::new(id, queue, "A", number, created_at)
                    .with_sub_queue(sub_queue.id)
                    .with_status(TokenStatus::InProgress),
            )
            .await
            .unwrap();
        }

        let token = repo
            .find_in_progress_token(&sub_queue, today())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(token.id, "t-early");
        assert_eq!(token.display_number(), "A-007");

        repo.update_token_status("t-early", TokenStatus::Fulfilled)
            .await
            .unwrap();
        let token = repo
            .find_in_progress_token(&sub_queue, today())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(token.id, "t-late");
    }

    #[tokio::test]
    async fn test_no_in_progress_token() {
        let (_pool, repo) = setup_test_db().await;
        let sub_queue = active_sub_queue(&repo, "r-dr").await;
        repo.save_queue(&TokenQueue::primary("q1", "r-dr", today(), "OPD"))
            .await
            .unwrap();
        repo.insert_token(&Token::new("t1", "q1", "A", 1, 1_000).with_sub_queue(sub_queue.id))
            .await
            .unwrap();

        assert!(repo
            .find_in_progress_token(&sub_queue, today())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_writes_publish_change_events() {
        let (_pool, repo) = setup_test_db().await;
        let sub_queue = active_sub_queue(&repo, "r-dr").await;
        let mut events = repo.subscribe();

        let queue = TokenQueue::primary("q1", "r-dr", today(), "OPD");
        repo.save_queue(&queue).await.unwrap();
        assert_eq!(
            events.recv().await.unwrap(),
            DataChangeEvent::QueueChanged {
                queue_id: "q1".into(),
                resource_id: "r-dr".into(),
            }
        );

        repo.insert_token(&Token::new("t1", "q1", "A", 1, 1_000).with_sub_queue(sub_queue.id))
            .await
            .unwrap();
        repo.update_token_status("t1", TokenStatus::InProgress)
            .await
            .unwrap();
        for _ in 0..2 {
            assert_eq!(
                events.recv().await.unwrap(),
                DataChangeEvent::TokenChanged {
                    token_id: "t1".into(),
                    sub_queue_id: Some(sub_queue.id),
                }
            );
        }
    }

    #[tokio::test]
    async fn test_reassignment_announces_both_sub_queues() {
        let (_pool, repo) = setup_test_db().await;
        let from = active_sub_queue(&repo, "r-dr").await;
        let to = active_sub_queue(&repo, "r-dr").await;
        repo.save_queue(&TokenQueue::primary("q1", "r-dr", today(), "OPD"))
            .await
            .unwrap();
        repo.insert_token(&Token::new("t1", "q1", "A", 1, 1_000).with_sub_queue(from.id))
            .await
            .unwrap();

        let mut events = repo.subscribe();
        repo.assign_token_sub_queue("t1", Some(to.id)).await.unwrap();

        let announced: Vec<Option<SubQueueId>> = [events.recv().await, events.recv().await]
            .into_iter()
            .map(|event| match event.unwrap() {
                DataChangeEvent::TokenChanged { sub_queue_id, .. } => sub_queue_id,
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(announced, vec![Some(from.id), Some(to.id)]);
    }

    #[tokio::test]
    async fn test_moving_queue_announces_both_resources() {
        let (_pool, repo) = setup_test_db().await;
        repo.save_queue(&TokenQueue::primary("q1", "r-dr", today(), "OPD"))
            .await
            .unwrap();

        let mut events = repo.subscribe();
        repo.save_queue(&TokenQueue::primary("q1", "r-hs", today(), "OPD"))
            .await
            .unwrap();

        let announced: Vec<String> = [events.recv().await, events.recv().await]
            .into_iter()
            .map(|event| match event.unwrap() {
                DataChangeEvent::QueueChanged { resource_id, .. } => resource_id,
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(announced, vec!["r-dr".to_string(), "r-hs".to_string()]);

        // Same resource: a single event
        repo.save_queue(&TokenQueue::primary("q1", "r-hs", today(), "OPD (renamed)"))
            .await
            .unwrap();
        assert_eq!(
            events.recv().await.unwrap(),
            DataChangeEvent::QueueChanged {
                queue_id: "q1".into(),
                resource_id: "r-hs".into(),
            }
        );
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_update_missing_token_is_not_found() {
        let (_pool, repo) = setup_test_db().await;
        let result = repo
            .update_token_status("nope", TokenStatus::Fulfilled)
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_sub_queue_ids_by_resource_includes_inactive() {
        let (_pool, repo) = setup_test_db().await;
        let a = active_sub_queue(&repo, "r-dr").await;
        let mut b = active_sub_queue(&repo, "r-dr").await;
        b.status = SubQueueStatus::Inactive;
        repo.save_sub_queue(&b).await.unwrap();
        active_sub_queue(&repo, "r-hs").await;

        let mut ids = repo.find_sub_queue_ids_by_resource("r-dr").await.unwrap();
        ids.sort();
        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(ids, expected);
    }
}
