use std::{sync::Arc, time::Duration};

use carebook_core::{
    errors::ClinicError,
    models::{
        appointment::{AppointmentStatus, UpdateAppointmentRequest},
        auth::{Caller, Role},
        availability::DayOfWeek,
        directory::{DoctorRef, PatientRef},
        time_of_day::TimeOfDay,
    },
    services::{appointments, booking, slots},
};
use carebook_db::mock::{
    memory::InMemoryStore,
    notifier::FailingNotifier,
    repositories::{MockNotificationSink, MockStore},
};
use mockall::predicate::eq;
use pretty_assertions::assert_eq;
use tokio::time::timeout;
use uuid::Uuid;

use crate::test_utils::{TestContext, admin_caller, caller_with_role, monday};

#[tokio::test]
async fn test_booked_slot_disappears_and_returns_on_cancel() {
    let ctx = TestContext::new().await;
    ctx.open_window(DayOfWeek::Monday, "09:00", "17:00", 30).await;
    let nine = "09:00".parse::<TimeOfDay>().unwrap().on(monday());

    let before = slots::compute_available_slots(ctx.store.as_ref(), ctx.doctor.id, monday())
        .await
        .unwrap();
    assert_eq!(before.len(), 16);
    assert_eq!(before[0], nine);

    let appointment = booking::book_appointment(
        ctx.store.as_ref(),
        ctx.notifier.clone(),
        &ctx.patient_caller(),
        ctx.booking("09:00", "09:30"),
    )
    .await
    .unwrap();
    assert_eq!(appointment.status, AppointmentStatus::Scheduled);
    assert_eq!(appointment.patient_id, ctx.patient.id);

    let after = slots::compute_available_slots(ctx.store.as_ref(), ctx.doctor.id, monday())
        .await
        .unwrap();
    assert_eq!(after.len(), 15);
    assert!(!after.contains(&nine));

    appointments::update_appointment(
        ctx.store.as_ref(),
        ctx.notifier.clone(),
        &ctx.patient_caller(),
        appointment.id,
        UpdateAppointmentRequest {
            status: Some(AppointmentStatus::Cancelled),
            notes: None,
        },
    )
    .await
    .unwrap();

    let reopened = slots::compute_available_slots(ctx.store.as_ref(), ctx.doctor.id, monday())
        .await
        .unwrap();
    assert_eq!(reopened, before);
}

#[tokio::test]
async fn test_booking_taken_slot_is_a_conflict() {
    let ctx = TestContext::new().await;
    let other = ctx.store.add_patient("Grace Hopper").await;

    booking::book_appointment(
        ctx.store.as_ref(),
        ctx.notifier.clone(),
        &ctx.patient_caller(),
        ctx.booking("10:00", "10:30"),
    )
    .await
    .unwrap();

    let mut request = ctx.booking("10:00", "10:30");
    request.patient_id = Some(other.id);
    let result = booking::book_appointment(
        ctx.store.as_ref(),
        ctx.notifier.clone(),
        &admin_caller(),
        request,
    )
    .await;

    assert!(matches!(result, Err(ClinicError::SlotConflict(_))));
}

#[tokio::test]
async fn test_concurrent_bookings_of_one_slot_yield_one_winner() {
    // Both bookings pass the pre-insert lookup before either inserts
    let ctx = TestContext::with_store(InMemoryStore::interleaving()).await;
    let rival = ctx.store.add_patient("Grace Hopper").await;
    let admin = admin_caller();

    let mut first = ctx.booking("11:00", "11:30");
    first.patient_id = Some(ctx.patient.id);
    let mut second = ctx.booking("11:00", "11:30");
    second.patient_id = Some(rival.id);

    let (a, b) = tokio::join!(
        booking::book_appointment(ctx.store.as_ref(), ctx.notifier.clone(), &admin, first),
        booking::book_appointment(ctx.store.as_ref(), ctx.notifier.clone(), &admin, second),
    );

    let results = [a, b];
    let won = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(ClinicError::SlotConflict(_))))
        .count();
    assert_eq!((won, conflicts), (1, 1));
    assert_eq!(ctx.store.insert_conflicts(), 1);
    assert_eq!(ctx.store.appointments().await.len(), 1);
}

#[tokio::test]
async fn test_doctor_is_notified_of_new_booking() {
    let mut ctx = TestContext::new().await;

    let appointment = booking::book_appointment(
        ctx.store.as_ref(),
        ctx.notifier.clone(),
        &ctx.patient_caller(),
        ctx.booking("09:30", "10:00"),
    )
    .await
    .unwrap();

    let notification = timeout(Duration::from_secs(1), ctx.notifications.recv())
        .await
        .expect("notification not delivered in time")
        .expect("notifier dropped");
    assert_eq!(notification.user_id, ctx.doctor.user_id);
    assert_eq!(notification.title, "New Appointment Booked");
    assert_eq!(notification.message, "Ada Lovelace booked an appointment");
    assert_eq!(
        notification.link,
        Some(format!("/doctor/appointments/{}", appointment.id))
    );
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_booking() {
    let ctx = TestContext::new().await;

    let result = booking::book_appointment(
        ctx.store.as_ref(),
        Arc::new(FailingNotifier),
        &ctx.patient_caller(),
        ctx.booking("12:00", "12:30"),
    )
    .await;

    assert!(result.is_ok());
    assert_eq!(ctx.store.appointments().await.len(), 1);
}

#[tokio::test]
async fn test_booking_rejects_empty_time_range() {
    let ctx = TestContext::new().await;

    let result = booking::book_appointment(
        ctx.store.as_ref(),
        ctx.notifier.clone(),
        &ctx.patient_caller(),
        ctx.booking("10:00", "10:00"),
    )
    .await;

    assert!(matches!(result, Err(ClinicError::Validation(_))));
}

#[tokio::test]
async fn test_booking_unknown_doctor_is_not_found() {
    let ctx = TestContext::new().await;
    let mut request = ctx.booking("10:00", "10:30");
    request.doctor_id = Uuid::new_v4();

    let result = booking::book_appointment(
        ctx.store.as_ref(),
        ctx.notifier.clone(),
        &ctx.patient_caller(),
        request,
    )
    .await;

    assert!(matches!(result, Err(ClinicError::NotFound(_))));
}

#[tokio::test]
async fn test_admin_must_name_the_patient() {
    let ctx = TestContext::new().await;

    let result = booking::book_appointment(
        ctx.store.as_ref(),
        ctx.notifier.clone(),
        &admin_caller(),
        ctx.booking("10:00", "10:30"),
    )
    .await;

    assert!(matches!(result, Err(ClinicError::Validation(_))));
}

#[tokio::test]
async fn test_doctors_cannot_book() {
    let ctx = TestContext::new().await;

    let result = booking::book_appointment(
        ctx.store.as_ref(),
        ctx.notifier.clone(),
        &ctx.doctor_caller(),
        ctx.booking("10:00", "10:30"),
    )
    .await;
    assert!(matches!(result, Err(ClinicError::Authorization(_))));

    let result = booking::book_appointment(
        ctx.store.as_ref(),
        ctx.notifier.clone(),
        &caller_with_role(Role::Pharmacy),
        ctx.booking("10:00", "10:30"),
    )
    .await;
    assert!(matches!(result, Err(ClinicError::Authorization(_))));
}

#[tokio::test]
async fn test_lost_insert_race_surfaces_as_conflict() {
    let doctor = DoctorRef {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        name: "Meredith Grey".to_string(),
    };
    let patient = PatientRef {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        name: "Ada Lovelace".to_string(),
    };

    let mut store = MockStore::new();
    let found_doctor = doctor.clone();
    store
        .expect_find_doctor()
        .with(eq(doctor.id))
        .returning(move |_| Ok(Some(found_doctor.clone())));
    let found_patient = patient.clone();
    store
        .expect_find_patient()
        .returning(move |_| Ok(Some(found_patient.clone())));
    // The pre-check sees a free slot, but another request commits first
    store
        .expect_find_active_appointment()
        .times(1)
        .returning(|_, _, _| Ok(None));
    store
        .expect_insert_appointment()
        .times(1)
        .returning(|_| Err(ClinicError::SlotConflict("doctor at 09:00".to_string())));

    let ctx = TestContext::new().await;
    let mut request = ctx.booking("09:00", "09:30");
    request.doctor_id = doctor.id;
    let caller = Caller {
        user_id: patient.user_id,
        role: Role::Patient,
        doctor_id: None,
        patient_id: Some(patient.id),
    };

    let result = booking::book_appointment(
        &store,
        Arc::new(MockNotificationSink::new()),
        &caller,
        request,
    )
    .await;

    assert!(matches!(result, Err(ClinicError::SlotConflict(_))));
}
