//! Staff presence state machine
//!
//! `In` is the initial state. Check-out moves to `Out` and opens an overdue
//! episode; check-in returns to `In` and closes it. The machine knows
//! nothing about selection; `FrontDesk` decides which staff member a
//! transition applies to.

use chrono::{DateTime, Local, TimeDelta};
use frontdesk_api::{Field, PresenceStatus, RosterRecord, StaffView};
use frontdesk_util::{format_clock_time, format_duration, StaffId};
use tracing::info;

use crate::{CoreError, CoreResult};

/// A staff member on the reception board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Staff {
    pub id: StaffId,
    pub first_name: String,
    pub last_name: String,
    pub photo_ref: String,
    pub email: String,
    status: PresenceStatus,
    out_at: Option<DateTime<Local>>,
    expected_return: Option<DateTime<Local>>,
    duration_minutes: Option<u32>,
    notified: bool,
}

impl Staff {
    /// New staff member, checked in
    pub fn from_record(record: RosterRecord) -> Self {
        Self {
            id: StaffId::new(),
            first_name: record.first_name,
            last_name: record.last_name,
            photo_ref: record.photo_ref,
            email: record.email,
            status: PresenceStatus::In,
            out_at: None,
            expected_return: None,
            duration_minutes: None,
            notified: false,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn status(&self) -> PresenceStatus {
        self.status
    }

    pub fn out_at(&self) -> Option<DateTime<Local>> {
        self.out_at
    }

    pub fn expected_return(&self) -> Option<DateTime<Local>> {
        self.expected_return
    }

    pub fn duration_minutes(&self) -> Option<u32> {
        self.duration_minutes
    }

    /// Whether an alert has already gone out for the current absence
    pub fn notified_this_episode(&self) -> bool {
        self.notified
    }

    /// Check out for `duration_minutes`, starting a new overdue episode.
    ///
    /// Checking out someone who is already out restarts the episode.
    pub fn check_out(
        &mut self,
        duration_minutes: i64,
        now: DateTime<Local>,
    ) -> CoreResult<DateTime<Local>> {
        if duration_minutes <= 0 {
            return Err(CoreError::invalid(
                Field::DurationMinutes,
                "must be a positive number of minutes",
            ));
        }
        let minutes = u32::try_from(duration_minutes)
            .map_err(|_| CoreError::invalid(Field::DurationMinutes, "too large"))?;
        let expected_return = now
            .checked_add_signed(TimeDelta::minutes(i64::from(minutes)))
            .ok_or_else(|| CoreError::invalid(Field::DurationMinutes, "too large"))?;

        self.status = PresenceStatus::Out;
        self.out_at = Some(now);
        self.expected_return = Some(expected_return);
        self.duration_minutes = Some(minutes);
        self.notified = false;

        info!(
            staff_id = %self.id,
            duration_minutes = minutes,
            expected_return = %format_clock_time(&expected_return),
            "Staff checked out"
        );

        Ok(expected_return)
    }

    /// Check back in, closing any open episode. Already-in is a no-op.
    pub fn check_in(&mut self) {
        if self.status == PresenceStatus::In {
            return;
        }

        self.status = PresenceStatus::In;
        self.out_at = None;
        self.expected_return = None;
        self.duration_minutes = None;
        self.notified = false;

        info!(staff_id = %self.id, "Staff checked in");
    }

    /// Whole minutes past the expected return, if this staff member is
    /// overdue and not yet notified this episode
    pub fn pending_overdue(&self, now: DateTime<Local>) -> Option<u32> {
        if self.status != PresenceStatus::Out || self.notified {
            return None;
        }
        let expected = self.expected_return?;
        if now <= expected {
            return None;
        }
        let elapsed = now.signed_duration_since(expected).num_minutes();
        Some(u32::try_from(elapsed).unwrap_or(u32::MAX))
    }

    pub(crate) fn mark_notified(&mut self) {
        if self.status == PresenceStatus::Out {
            self.notified = true;
        }
    }

    /// Take over display fields from a refreshed roster record
    pub(crate) fn refresh_from(&mut self, record: RosterRecord) {
        self.first_name = record.first_name;
        self.last_name = record.last_name;
        self.photo_ref = record.photo_ref;
        self.email = record.email;
    }

    pub fn to_view(&self) -> StaffView {
        StaffView {
            staff_id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            photo_ref: self.photo_ref.clone(),
            email: self.email.clone(),
            status: self.status,
            out_at: self.out_at,
            out_display: self.out_at.as_ref().map(format_clock_time),
            duration_display: self.duration_minutes.map(format_duration),
            expected_return: self.expected_return,
            expected_return_display: self.expected_return.as_ref().map(format_clock_time),
            overdue_notified: self.notified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ann() -> Staff {
        Staff::from_record(RosterRecord {
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            photo_ref: "ann.jpg".into(),
            email: "ann@example.org".into(),
        })
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 12, 25, h, m, s).unwrap()
    }

    #[test]
    fn test_check_out_sets_return_time() {
        let mut staff = ann();
        let now = at(14, 0, 0);

        for minutes in [1, 5, 45, 90, 600] {
            let expected = staff.check_out(minutes, now).unwrap();
            assert_eq!(staff.status(), PresenceStatus::Out);
            assert_eq!(staff.out_at(), Some(now));
            assert_eq!(expected, now + TimeDelta::minutes(minutes));
            assert_eq!(staff.expected_return(), Some(expected));
            assert!(!staff.notified_this_episode());
        }
    }

    #[test]
    fn test_check_in_restores_pristine_state() {
        let pristine = ann();
        let mut staff = pristine.clone();

        staff.check_out(30, at(9, 0, 0)).unwrap();
        staff.mark_notified();
        staff.check_in();

        assert_eq!(staff, pristine);
    }

    #[test]
    fn test_check_out_rejects_non_positive_duration() {
        let mut staff = ann();

        for bad in [0, -5] {
            let err = staff.check_out(bad, at(9, 0, 0)).unwrap_err();
            assert!(matches!(
                err,
                CoreError::InvalidInput { field: Field::DurationMinutes, .. }
            ));
        }
        assert_eq!(staff.status(), PresenceStatus::In);

        let err = staff.check_out(i64::from(u32::MAX) + 1, at(9, 0, 0)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput { .. }));
    }

    #[test]
    fn test_pending_overdue_floors_minutes() {
        let mut staff = ann();
        staff.check_out(5, at(14, 0, 0)).unwrap();

        assert_eq!(staff.pending_overdue(at(14, 5, 0)), None);
        assert_eq!(staff.pending_overdue(at(14, 5, 1)), Some(0));
        assert_eq!(staff.pending_overdue(at(14, 6, 59)), Some(1));

        staff.mark_notified();
        assert_eq!(staff.pending_overdue(at(14, 30, 0)), None);
    }

    #[test]
    fn test_recheck_out_rearms_episode() {
        let mut staff = ann();
        staff.check_out(5, at(14, 0, 0)).unwrap();
        staff.mark_notified();

        staff.check_out(5, at(14, 10, 0)).unwrap();
        assert!(!staff.notified_this_episode());
        assert_eq!(staff.pending_overdue(at(14, 16, 0)), Some(1));
    }

    #[test]
    fn test_notified_only_while_out() {
        let mut staff = ann();
        staff.mark_notified();
        assert!(!staff.notified_this_episode());
    }

    #[test]
    fn test_view_renders_board_columns() {
        let mut staff = ann();
        staff.check_out(90, at(14, 5, 0)).unwrap();

        let view = staff.to_view();
        assert_eq!(view.status, PresenceStatus::Out);
        assert_eq!(view.out_display.as_deref(), Some("14:05"));
        assert_eq!(view.duration_display.as_deref(), Some("1 hour and 30 minutes"));
        assert_eq!(view.expected_return_display.as_deref(), Some("15:35"));
    }
}
