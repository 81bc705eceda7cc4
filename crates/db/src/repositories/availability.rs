use crate::models::DbAvailabilityWindow;
use carebook_core::models::availability::NewAvailabilityWindow;
use chrono::Utc;
use eyre::{Result, eyre};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_window(
    pool: &Pool<Postgres>,
    window: &NewAvailabilityWindow,
) -> Result<DbAvailabilityWindow> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let slot_duration = i32::try_from(window.slot_duration)?;

    tracing::debug!(
        "Creating availability window: id={}, doctor_id={}, day={}, {}-{}/{}min",
        id,
        window.doctor_id,
        window.day_of_week.index(),
        window.start_time,
        window.end_time,
        window.slot_duration
    );

    let created = sqlx::query_as::<_, DbAvailabilityWindow>(
        r#"
        INSERT INTO availability_windows
            (id, doctor_id, day_of_week, start_time, end_time, slot_duration, is_active, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, doctor_id, day_of_week, start_time, end_time, slot_duration, is_active, created_at
        "#,
    )
    .bind(id)
    .bind(window.doctor_id)
    .bind(i16::from(window.day_of_week.index()))
    .bind(window.start_time.to_string())
    .bind(window.end_time.to_string())
    .bind(slot_duration)
    .bind(window.is_active)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

pub async fn get_window_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbAvailabilityWindow>> {
    let window = sqlx::query_as::<_, DbAvailabilityWindow>(
        r#"
        SELECT id, doctor_id, day_of_week, start_time, end_time, slot_duration, is_active, created_at
        FROM availability_windows
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(window)
}

pub async fn get_windows_by_doctor_id(
    pool: &Pool<Postgres>,
    doctor_id: Uuid,
) -> Result<Vec<DbAvailabilityWindow>> {
    let windows = sqlx::query_as::<_, DbAvailabilityWindow>(
        r#"
        SELECT id, doctor_id, day_of_week, start_time, end_time, slot_duration, is_active, created_at
        FROM availability_windows
        WHERE doctor_id = $1
        ORDER BY day_of_week ASC, start_time ASC
        "#,
    )
    .bind(doctor_id)
    .fetch_all(pool)
    .await?;

    Ok(windows)
}

pub async fn get_active_windows_for_day(
    pool: &Pool<Postgres>,
    doctor_id: Uuid,
    day_of_week: i16,
) -> Result<Vec<DbAvailabilityWindow>> {
    let windows = sqlx::query_as::<_, DbAvailabilityWindow>(
        r#"
        SELECT id, doctor_id, day_of_week, start_time, end_time, slot_duration, is_active, created_at
        FROM availability_windows
        WHERE doctor_id = $1 AND day_of_week = $2 AND is_active = TRUE
        ORDER BY created_at ASC
        "#,
    )
    .bind(doctor_id)
    .bind(day_of_week)
    .fetch_all(pool)
    .await?;

    Ok(windows)
}

pub async fn set_window_active(
    pool: &Pool<Postgres>,
    id: Uuid,
    is_active: bool,
) -> Result<DbAvailabilityWindow> {
    let updated = sqlx::query_as::<_, DbAvailabilityWindow>(
        r#"
        UPDATE availability_windows
        SET is_active = $2
        WHERE id = $1
        RETURNING id, doctor_id, day_of_week, start_time, end_time, slot_duration, is_active, created_at
        "#,
    )
    .bind(id)
    .bind(is_active)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| eyre!("Availability window {} not found", id))?;

    Ok(updated)
}

pub async fn delete_window(pool: &Pool<Postgres>, id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM availability_windows
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}
