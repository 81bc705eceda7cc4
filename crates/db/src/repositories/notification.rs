use crate::models::DbNotification;
use carebook_core::models::notification::Notification;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_notification(
    pool: &Pool<Postgres>,
    notification: &Notification,
) -> Result<DbNotification> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let created = sqlx::query_as::<_, DbNotification>(
        r#"
        INSERT INTO notifications (id, user_id, type, title, message, link, is_read, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7)
        RETURNING id, user_id, type, title, message, link, is_read, created_at
        "#,
    )
    .bind(id)
    .bind(notification.user_id)
    .bind(notification.kind.as_str())
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(notification.link.as_deref())
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(created)
}
