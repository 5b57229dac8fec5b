//! Reception board session state
//!
//! `FrontDesk` owns both registries and the selection slot. Every user
//! action goes through it, and every failure is detected before anything
//! is mutated.

use chrono::{DateTime, Local};
use frontdesk_api::{
    DeliveryRequest, DeliveryView, DeskSnapshot, EntityRef, RosterRecord, API_VERSION,
};
use frontdesk_util::{DeliveryId, StaffId};
use tracing::{debug, info};

use crate::{
    delivery, scan_overdue, CoreError, CoreResult, DeliveryRegistry, EntityKind, OverdueAlert,
    Staff, StaffRegistry,
};

#[derive(Debug, Default)]
pub struct FrontDesk {
    staff: StaffRegistry,
    deliveries: DeliveryRegistry,
    selection: Option<EntityRef>,
}

impl FrontDesk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn staff(&self) -> &StaffRegistry {
        &self.staff
    }

    pub fn deliveries(&self) -> &DeliveryRegistry {
        &self.deliveries
    }

    pub fn selection(&self) -> Option<EntityRef> {
        self.selection
    }

    /// Append roster records as checked-in staff
    pub fn seed_roster(&mut self, records: Vec<RosterRecord>) -> Vec<StaffId> {
        let ids: Vec<StaffId> = records
            .into_iter()
            .map(|record| self.staff.add(Staff::from_record(record)))
            .collect();

        info!(count = ids.len(), "Roster seeded");
        ids
    }

    /// Refresh the roster from a new record list.
    ///
    /// People are matched by email (case-insensitive) and keep their id and
    /// presence state. Anyone missing from `records` is dropped, along with
    /// the selection if it pointed at them. Returns the new roster size.
    pub fn replace_roster(&mut self, records: Vec<RosterRecord>) -> usize {
        let mut previous = self.staff.drain();
        let mut kept = 0usize;

        let refreshed: Vec<Staff> = records
            .into_iter()
            .map(|record| {
                let existing = previous
                    .iter()
                    .position(|s| s.email.eq_ignore_ascii_case(&record.email));
                match existing {
                    Some(index) => {
                        kept += 1;
                        let mut staff = previous.swap_remove(index);
                        staff.refresh_from(record);
                        staff
                    }
                    None => Staff::from_record(record),
                }
            })
            .collect();

        let count = refreshed.len();
        self.staff.replace_all(refreshed);

        if let Some(EntityRef::Staff(id)) = self.selection
            && !self.staff.contains(id)
        {
            self.selection = None;
        }

        info!(
            count,
            kept,
            removed = previous.len(),
            "Roster replaced"
        );
        count
    }

    /// Toggle selection of `target`.
    ///
    /// Selecting the current selection clears it; selecting anything else
    /// replaces it. Returns the resulting selection.
    pub fn select(&mut self, target: EntityRef) -> CoreResult<Option<EntityRef>> {
        let exists = match target {
            EntityRef::Staff(id) => self.staff.contains(id),
            EntityRef::Delivery(id) => self.deliveries.contains(id),
        };
        if !exists {
            return Err(CoreError::NotFound(target));
        }

        self.selection = if self.selection == Some(target) {
            None
        } else {
            Some(target)
        };

        debug!(selection = ?self.selection, "Selection changed");
        Ok(self.selection)
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    fn selected_staff(&self) -> CoreResult<StaffId> {
        match self.selection {
            Some(EntityRef::Staff(id)) => Ok(id),
            _ => Err(CoreError::NoSelection {
                wanted: EntityKind::Staff,
            }),
        }
    }

    fn selected_delivery(&self) -> CoreResult<DeliveryId> {
        match self.selection {
            Some(EntityRef::Delivery(id)) => Ok(id),
            _ => Err(CoreError::NoSelection {
                wanted: EntityKind::Delivery,
            }),
        }
    }

    /// Check out the selected staff member. Returns their id and expected
    /// return instant.
    pub fn check_out(
        &mut self,
        duration_minutes: i64,
        now: DateTime<Local>,
    ) -> CoreResult<(StaffId, DateTime<Local>)> {
        let id = self.selected_staff()?;
        let staff = self
            .staff
            .get_mut(id)
            .ok_or(CoreError::NotFound(EntityRef::Staff(id)))?;

        let expected_return = staff.check_out(duration_minutes, now)?;
        Ok((id, expected_return))
    }

    /// Check the selected staff member back in
    pub fn check_in(&mut self) -> CoreResult<StaffId> {
        let id = self.selected_staff()?;
        let staff = self
            .staff
            .get_mut(id)
            .ok_or(CoreError::NotFound(EntityRef::Staff(id)))?;

        staff.check_in();
        Ok(id)
    }

    /// Validate and add a delivery. Selection is left alone.
    pub fn schedule_delivery(
        &mut self,
        request: &DeliveryRequest,
        now: DateTime<Local>,
    ) -> CoreResult<DeliveryView> {
        let delivery = delivery::schedule(request, now)?;
        let view = delivery.to_view();
        self.deliveries.add(delivery);
        Ok(view)
    }

    pub fn remove_selected_delivery(&mut self) -> CoreResult<DeliveryId> {
        let id = self.selected_delivery()?;
        self.deliveries.remove(id)?;
        self.selection = None;

        info!(delivery_id = %id, "Delivery removed");
        Ok(id)
    }

    pub fn remove_staff(&mut self, id: StaffId) -> CoreResult<Staff> {
        let removed = self.staff.remove(id)?;
        if self.selection == Some(EntityRef::Staff(id)) {
            self.selection = None;
        }

        info!(staff_id = %id, "Staff removed");
        Ok(removed)
    }

    /// One overdue scan over both tables
    pub fn tick(&mut self, now: DateTime<Local>) -> Vec<OverdueAlert> {
        scan_overdue(&mut self.staff, &mut self.deliveries, now)
    }

    pub fn snapshot(&self, now: DateTime<Local>) -> DeskSnapshot {
        DeskSnapshot {
            api_version: API_VERSION,
            taken_at: now,
            staff: self.staff.iter().map(Staff::to_view).collect(),
            deliveries: self.deliveries.iter().map(|d| d.to_view()).collect(),
            selection: self.selection,
        }
    }
}
