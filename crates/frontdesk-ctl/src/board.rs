//! Text rendering of the board and row lookups

use anyhow::{anyhow, bail, Result};
use frontdesk_api::{DeskSnapshot, EntityRef, Event, EventPayload, PresenceStatus};
use frontdesk_util::{DeliveryId, StaffId};
use std::fmt::Write;

/// Resolve a 1-based row number or a full id against the current board
pub fn staff_target(snapshot: &DeskSnapshot, token: &str) -> Result<EntityRef> {
    if let Ok(row) = token.parse::<usize>() {
        let staff = row
            .checked_sub(1)
            .and_then(|i| snapshot.staff.get(i))
            .ok_or_else(|| anyhow!("no staff row {}", row))?;
        return Ok(EntityRef::Staff(staff.staff_id));
    }

    let id: StaffId = token
        .parse()
        .map_err(|_| anyhow!("'{}' is neither a row number nor a staff id", token))?;
    Ok(EntityRef::Staff(id))
}

pub fn delivery_target(snapshot: &DeskSnapshot, token: &str) -> Result<EntityRef> {
    if let Ok(row) = token.parse::<usize>() {
        let delivery = row
            .checked_sub(1)
            .and_then(|i| snapshot.deliveries.get(i))
            .ok_or_else(|| anyhow!("no delivery row {}", row))?;
        return Ok(EntityRef::Delivery(delivery.delivery_id));
    }

    match token.parse::<DeliveryId>() {
        Ok(id) => Ok(EntityRef::Delivery(id)),
        Err(_) => bail!("'{}' is neither a row number nor a delivery id", token),
    }
}

fn marker(snapshot: &DeskSnapshot, target: EntityRef) -> &'static str {
    if snapshot.selection == Some(target) { ">" } else { " " }
}

/// Both tables, selection marked with `>`
pub fn render_snapshot(snapshot: &DeskSnapshot) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "STAFF");
    for (i, staff) in snapshot.staff.iter().enumerate() {
        let status = match staff.status {
            PresenceStatus::In => "In".to_string(),
            PresenceStatus::Out => format!(
                "Out since {} for {}, back {}",
                staff.out_display.as_deref().unwrap_or("?"),
                staff.duration_display.as_deref().unwrap_or("?"),
                staff.expected_return_display.as_deref().unwrap_or("?"),
            ),
        };
        let _ = writeln!(
            out,
            "{}{:>3}  {} {} <{}>  {}{}",
            marker(snapshot, EntityRef::Staff(staff.staff_id)),
            i + 1,
            staff.first_name,
            staff.last_name,
            staff.email,
            status,
            if staff.overdue_notified { "  [OVERDUE]" } else { "" },
        );
    }

    let _ = writeln!(out, "\nDELIVERIES");
    if snapshot.deliveries.is_empty() {
        let _ = writeln!(out, "     (none)");
    }
    for (i, delivery) in snapshot.deliveries.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}{:>3}  {} {} {}  {}  {}  {}, back {}{}",
            marker(snapshot, EntityRef::Delivery(delivery.delivery_id)),
            i + 1,
            delivery.vehicle.icon(),
            delivery.first_name,
            delivery.last_name,
            delivery.phone,
            delivery.address,
            delivery.duration_display,
            delivery.expected_return_display,
            if delivery.overdue_notified { "  [OVERDUE]" } else { "" },
        );
    }

    out
}

/// One line per event for `watch`; `None` for events not worth printing
pub fn render_event(event: &Event) -> Option<String> {
    let at = frontdesk_util::format_clock_time(&event.timestamp);
    match &event.payload {
        EventPayload::StaffOverdue { name, message, .. } => {
            Some(format!("[{}] {}: {}", at, name, message))
        }
        EventPayload::DeliveryOverdue {
            name,
            phone,
            address,
            expected_return_display,
            ..
        } => Some(format!(
            "[{}] Delivery overdue: {} ({}) to {}, expected back {}",
            at, name, phone, address, expected_return_display
        )),
        EventPayload::StateChanged(_) => None,
        EventPayload::Shutdown => Some(format!("[{}] frontdeskd is shutting down", at)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use frontdesk_api::{StaffView, API_VERSION};

    fn snapshot() -> DeskSnapshot {
        let staff = StaffView {
            staff_id: StaffId::new(),
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            photo_ref: String::new(),
            email: "ann@example.org".into(),
            status: PresenceStatus::In,
            out_at: None,
            out_display: None,
            duration_display: None,
            expected_return: None,
            expected_return_display: None,
            overdue_notified: false,
        };
        DeskSnapshot {
            api_version: API_VERSION,
            taken_at: Local.with_ymd_and_hms(2025, 12, 25, 9, 0, 0).unwrap(),
            selection: Some(EntityRef::Staff(staff.staff_id)),
            staff: vec![staff],
            deliveries: vec![],
        }
    }

    #[test]
    fn rows_are_one_based() {
        let snapshot = snapshot();
        let ann = snapshot.staff[0].staff_id;

        assert_eq!(staff_target(&snapshot, "1").unwrap(), EntityRef::Staff(ann));
        assert!(staff_target(&snapshot, "0").is_err());
        assert!(staff_target(&snapshot, "2").is_err());
        assert!(delivery_target(&snapshot, "1").is_err());
    }

    #[test]
    fn full_ids_pass_through() {
        let snapshot = snapshot();
        let id = StaffId::new();
        assert_eq!(
            staff_target(&snapshot, &id.to_string()).unwrap(),
            EntityRef::Staff(id)
        );
        assert!(staff_target(&snapshot, "ann").is_err());
    }

    #[test]
    fn selection_is_marked() {
        let text = render_snapshot(&snapshot());
        assert!(text.contains(">  1  Ann Lee <ann@example.org>  In"));
        assert!(text.contains("(none)"));
    }
}
