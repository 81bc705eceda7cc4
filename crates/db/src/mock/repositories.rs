use async_trait::async_trait;
use carebook_core::{
    errors::ClinicResult,
    models::{
        appointment::{Appointment, AppointmentFilter, AppointmentStatus, NewAppointment},
        availability::{AvailabilityWindow, DayOfWeek, NewAvailabilityWindow},
        directory::{DoctorRef, PatientRef},
        notification::Notification,
        time_of_day::TimeOfDay,
    },
    store::{AppointmentStore, AvailabilityStore, Directory, Notifier},
};
use chrono::NaiveDate;
use mockall::mock;
use uuid::Uuid;

// Mock store for testing; implements every store trait so it also
// satisfies `ClinicStore`.
mock! {
    pub Store {}

    #[async_trait]
    impl AvailabilityStore for Store {
        async fn create_window(&self, window: NewAvailabilityWindow) -> ClinicResult<AvailabilityWindow>;

        async fn get_window(&self, id: Uuid) -> ClinicResult<Option<AvailabilityWindow>>;

        async fn list_windows(&self, doctor_id: Uuid) -> ClinicResult<Vec<AvailabilityWindow>>;

        async fn active_windows_for_day(
            &self,
            doctor_id: Uuid,
            day: DayOfWeek,
        ) -> ClinicResult<Vec<AvailabilityWindow>>;

        async fn set_window_active(&self, id: Uuid, is_active: bool) -> ClinicResult<AvailabilityWindow>;

        async fn delete_window(&self, id: Uuid) -> ClinicResult<()>;
    }

    #[async_trait]
    impl AppointmentStore for Store {
        async fn booked_start_times(&self, doctor_id: Uuid, date: NaiveDate) -> ClinicResult<Vec<TimeOfDay>>;

        async fn find_active_appointment(
            &self,
            doctor_id: Uuid,
            date: NaiveDate,
            start_time: TimeOfDay,
        ) -> ClinicResult<Option<Appointment>>;

        async fn insert_appointment(&self, appointment: NewAppointment) -> ClinicResult<Appointment>;

        async fn get_appointment(&self, id: Uuid) -> ClinicResult<Option<Appointment>>;

        async fn list_appointments(&self, filter: AppointmentFilter) -> ClinicResult<Vec<Appointment>>;

        async fn update_appointment(
            &self,
            id: Uuid,
            status: Option<AppointmentStatus>,
            notes: Option<String>,
        ) -> ClinicResult<Appointment>;

        async fn delete_appointment(&self, id: Uuid) -> ClinicResult<()>;
    }

    #[async_trait]
    impl Directory for Store {
        async fn find_doctor(&self, id: Uuid) -> ClinicResult<Option<DoctorRef>>;

        async fn find_patient(&self, id: Uuid) -> ClinicResult<Option<PatientRef>>;
    }
}

mock! {
    pub NotificationSink {}

    #[async_trait]
    impl Notifier for NotificationSink {
        async fn notify(&self, notification: Notification) -> eyre::Result<()>;
    }
}
