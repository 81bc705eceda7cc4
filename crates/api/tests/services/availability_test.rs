use carebook_core::{
    errors::ClinicError,
    models::{
        availability::{CreateAvailabilityRequest, DayOfWeek},
        time_of_day::TimeOfDay,
    },
    services::availability,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use uuid::Uuid;

use crate::test_utils::{TestContext, admin_caller};

fn request(day: DayOfWeek, start: &str, end: &str, slot_duration: u32) -> CreateAvailabilityRequest {
    CreateAvailabilityRequest {
        day_of_week: day,
        start_time: start.parse().unwrap(),
        end_time: end.parse().unwrap(),
        slot_duration,
        is_active: None,
    }
}

#[tokio::test]
async fn test_owner_creates_and_lists_windows_in_order() {
    let ctx = TestContext::new().await;
    let caller = ctx.doctor_caller();

    availability::create_window(
        ctx.store.as_ref(),
        &caller,
        ctx.doctor.id,
        request(DayOfWeek::Wednesday, "09:00", "12:00", 30),
    )
    .await
    .unwrap();
    availability::create_window(
        ctx.store.as_ref(),
        &caller,
        ctx.doctor.id,
        request(DayOfWeek::Monday, "13:00", "17:00", 15),
    )
    .await
    .unwrap();
    let early = availability::create_window(
        ctx.store.as_ref(),
        &caller,
        ctx.doctor.id,
        request(DayOfWeek::Monday, "08:00", "12:00", 20),
    )
    .await
    .unwrap();
    assert!(early.is_active);

    let windows = availability::list_windows(ctx.store.as_ref(), ctx.doctor.id)
        .await
        .unwrap();
    let order: Vec<(DayOfWeek, TimeOfDay)> =
        windows.iter().map(|w| (w.day_of_week, w.start_time)).collect();
    assert_eq!(
        order,
        vec![
            (DayOfWeek::Monday, "08:00".parse().unwrap()),
            (DayOfWeek::Monday, "13:00".parse().unwrap()),
            (DayOfWeek::Wednesday, "09:00".parse().unwrap()),
        ]
    );
}

#[rstest]
#[case("12:00", "09:00", 30)]
#[case("09:00", "17:00", 3)]
#[case("09:00", "17:00", 180)]
#[tokio::test]
async fn test_invalid_window_is_rejected(
    #[case] start: &str,
    #[case] end: &str,
    #[case] slot_duration: u32,
) {
    let ctx = TestContext::new().await;

    let result = availability::create_window(
        ctx.store.as_ref(),
        &ctx.doctor_caller(),
        ctx.doctor.id,
        request(DayOfWeek::Monday, start, end, slot_duration),
    )
    .await;

    assert!(matches!(result, Err(ClinicError::Validation(_))));
}

#[tokio::test]
async fn test_other_doctor_cannot_manage_windows() {
    let ctx = TestContext::new().await;
    let window = ctx.open_window(DayOfWeek::Monday, "09:00", "12:00", 30).await;
    let other = ctx.store.add_doctor("Derek Shepherd").await;
    let mut intruder = ctx.doctor_caller();
    intruder.doctor_id = Some(other.id);

    let created = availability::create_window(
        ctx.store.as_ref(),
        &intruder,
        ctx.doctor.id,
        request(DayOfWeek::Friday, "09:00", "12:00", 30),
    )
    .await;
    assert!(matches!(created, Err(ClinicError::Authorization(_))));

    let toggled = availability::set_window_active(ctx.store.as_ref(), &intruder, window.id, false).await;
    assert!(matches!(toggled, Err(ClinicError::Authorization(_))));

    let deleted = availability::delete_window(ctx.store.as_ref(), &ctx.patient_caller(), window.id).await;
    assert!(matches!(deleted, Err(ClinicError::Authorization(_))));
}

#[tokio::test]
async fn test_admin_deactivates_and_deletes_window() {
    let ctx = TestContext::new().await;
    let window = ctx.open_window(DayOfWeek::Monday, "09:00", "12:00", 30).await;

    let updated = availability::set_window_active(ctx.store.as_ref(), &admin_caller(), window.id, false)
        .await
        .unwrap();
    assert!(!updated.is_active);

    availability::delete_window(ctx.store.as_ref(), &admin_caller(), window.id)
        .await
        .unwrap();

    let missing = availability::delete_window(ctx.store.as_ref(), &admin_caller(), window.id).await;
    assert!(matches!(missing, Err(ClinicError::NotFound(_))));
}

#[tokio::test]
async fn test_window_for_unknown_doctor_is_not_found() {
    let ctx = TestContext::new().await;

    let result = availability::create_window(
        ctx.store.as_ref(),
        &admin_caller(),
        Uuid::new_v4(),
        request(DayOfWeek::Monday, "09:00", "12:00", 30),
    )
    .await;

    assert!(matches!(result, Err(ClinicError::NotFound(_))));
}
