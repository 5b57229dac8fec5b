//! Delivery lifecycle
//!
//! A delivery is created from a fully validated "schedule transport" request
//! and is never edited afterwards, apart from the overdue flag. Its return
//! time is fixed at creation.

use chrono::{DateTime, Local, TimeDelta};
use frontdesk_api::{DeliveryRequest, DeliveryView, Field, VehicleKind};
use frontdesk_util::{format_clock_time, format_duration, DeliveryId};
use tracing::info;

use crate::{CoreError, CoreResult};

/// A transport run in the delivery table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub id: DeliveryId,
    pub vehicle: VehicleKind,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub duration_minutes: u32,
    expected_return: DateTime<Local>,
    expected_return_display: String,
    notified: bool,
}

impl Delivery {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn expected_return(&self) -> DateTime<Local> {
        self.expected_return
    }

    /// `HH:MM` rendering of the return time, as stored at creation
    pub fn expected_return_display(&self) -> &str {
        &self.expected_return_display
    }

    pub fn notified_this_episode(&self) -> bool {
        self.notified
    }

    /// Whether the run is overdue and has not been alerted yet.
    ///
    /// Compares against the stored instant, never the display string.
    pub fn is_pending_overdue(&self, now: DateTime<Local>) -> bool {
        !self.notified && now > self.expected_return
    }

    /// There is no re-arm: once set, the flag stays until the run is removed.
    pub(crate) fn mark_notified(&mut self) {
        self.notified = true;
    }

    pub fn to_view(&self) -> DeliveryView {
        DeliveryView {
            delivery_id: self.id,
            vehicle: self.vehicle,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            duration_display: format_duration(self.duration_minutes),
            expected_return: self.expected_return,
            expected_return_display: self.expected_return_display.clone(),
            overdue_notified: self.notified,
        }
    }
}

/// `^[A-Za-z\s]+$`: at least one character, letters and whitespace only
fn is_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
}

fn is_phone(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

/// Validate a request and build the delivery it describes.
///
/// Fields are checked in form order; the first failure is returned.
pub fn schedule(request: &DeliveryRequest, now: DateTime<Local>) -> CoreResult<Delivery> {
    let vehicle: VehicleKind = request
        .vehicle
        .parse()
        .map_err(|_| CoreError::invalid(Field::VehicleKind, "must be car or motorcycle"))?;

    if !is_name(&request.first_name) {
        return Err(CoreError::invalid(Field::FirstName, "letters and spaces only"));
    }
    if !is_name(&request.last_name) {
        return Err(CoreError::invalid(Field::LastName, "letters and spaces only"));
    }
    if !is_phone(&request.phone) {
        return Err(CoreError::invalid(Field::Phone, "digits only"));
    }
    if request.address.trim().is_empty() {
        return Err(CoreError::invalid(Field::Address, "cannot be empty"));
    }

    let duration_minutes = u32::try_from(request.duration_minutes)
        .map_err(|_| CoreError::invalid(Field::DurationMinutes, "must be zero or more minutes"))?;
    let expected_return = now
        .checked_add_signed(TimeDelta::minutes(i64::from(duration_minutes)))
        .ok_or_else(|| CoreError::invalid(Field::DurationMinutes, "too large"))?;

    let delivery = Delivery {
        id: DeliveryId::new(),
        vehicle,
        first_name: request.first_name.clone(),
        last_name: request.last_name.clone(),
        phone: request.phone.clone(),
        address: request.address.clone(),
        duration_minutes,
        expected_return,
        expected_return_display: format_clock_time(&expected_return),
        notified: false,
    };

    info!(
        delivery_id = %delivery.id,
        vehicle = %delivery.vehicle,
        expected_return = %delivery.expected_return_display,
        "Delivery scheduled"
    );

    Ok(delivery)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request() -> DeliveryRequest {
        DeliveryRequest {
            vehicle: "Car".into(),
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            phone: "12345".into(),
            address: "1 Main St".into(),
            duration_minutes: 30,
        }
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 12, 25, 14, 10, 20).unwrap()
    }

    fn field_of(err: CoreError) -> Field {
        match err {
            CoreError::InvalidInput { field, .. } => field,
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_schedule_valid_request() {
        let delivery = schedule(&request(), now()).unwrap();

        assert_eq!(delivery.vehicle, VehicleKind::Car);
        assert_eq!(delivery.expected_return(), now() + TimeDelta::minutes(30));
        assert_eq!(delivery.expected_return_display(), "14:40");
        assert!(!delivery.notified_this_episode());
        assert_eq!(delivery.to_view().duration_display, "30 minutes");
    }

    #[test]
    fn test_rejects_unknown_vehicle() {
        let mut req = request();
        req.vehicle = "truck".into();
        assert_eq!(field_of(schedule(&req, now()).unwrap_err()), Field::VehicleKind);
    }

    #[test]
    fn test_vehicle_is_case_insensitive() {
        let mut req = request();
        req.vehicle = " MotorCycle ".into();
        assert_eq!(schedule(&req, now()).unwrap().vehicle, VehicleKind::Motorcycle);
    }

    fn assert_rejects(mutate: impl FnOnce(&mut DeliveryRequest), field: Field) {
        let mut req = request();
        mutate(&mut req);
        assert_eq!(field_of(schedule(&req, now()).unwrap_err()), field);
    }

    #[test]
    fn test_field_validation() {
        assert_rejects(|r| r.first_name = "Ann2".into(), Field::FirstName);
        assert_rejects(|r| r.first_name = String::new(), Field::FirstName);
        assert_rejects(|r| r.last_name = "O'Neil".into(), Field::LastName);
        assert_rejects(|r| r.phone = "555-1234".into(), Field::Phone);
        assert_rejects(|r| r.phone = String::new(), Field::Phone);
        assert_rejects(|r| r.address = " \t".into(), Field::Address);
        assert_rejects(|r| r.duration_minutes = -1, Field::DurationMinutes);
    }

    #[test]
    fn test_first_failing_field_wins() {
        let mut req = request();
        req.vehicle = "bus".into();
        req.phone = "abc".into();
        assert_eq!(field_of(schedule(&req, now()).unwrap_err()), Field::VehicleKind);
    }

    #[test]
    fn test_names_with_spaces_are_accepted() {
        let mut req = request();
        req.first_name = "Mary Ann".into();
        let delivery = schedule(&req, now()).unwrap();
        assert_eq!(delivery.full_name(), "Mary Ann Lee");
    }

    #[test]
    fn test_fields_are_stored_as_entered() {
        let mut req = request();
        req.first_name = "   ".into();
        req.last_name = " Lee ".into();
        req.address = " 1 Main St ".into();
        let delivery = schedule(&req, now()).unwrap();

        assert_eq!(delivery.first_name, "   ");
        assert_eq!(delivery.last_name, " Lee ");
        assert_eq!(delivery.address, " 1 Main St ");
    }

    #[test]
    fn test_zero_minutes_is_overdue_right_after() {
        let mut req = request();
        req.duration_minutes = 0;
        let delivery = schedule(&req, now()).unwrap();

        assert!(!delivery.is_pending_overdue(now()));
        assert!(delivery.is_pending_overdue(now() + TimeDelta::seconds(1)));
    }

    #[test]
    fn test_overdue_uses_instant_across_midnight() {
        let late = Local.with_ymd_and_hms(2025, 12, 25, 23, 50, 0).unwrap();
        let mut req = request();
        req.duration_minutes = 20;
        let delivery = schedule(&req, late).unwrap();

        assert_eq!(delivery.expected_return_display(), "00:10");
        assert!(!delivery.is_pending_overdue(late + TimeDelta::minutes(5)));
        assert!(delivery.is_pending_overdue(late + TimeDelta::minutes(21)));
    }
}
