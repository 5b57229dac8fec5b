//! Board command dispatch
//!
//! Maps protocol commands onto `FrontDesk` operations and core errors onto
//! protocol errors. Connection-level commands (subscribe, ping) are handled
//! by the service loop, not here.

use chrono::{DateTime, Local};
use frontdesk_api::{ClientRole, Command, ErrorCode, ErrorInfo, ResponsePayload};
use frontdesk_config::{load_config, ConfigError};
use frontdesk_core::{CoreError, FrontDesk};
use frontdesk_util::format_clock_time;
use std::path::Path;
use tracing::{info, warn};

/// Result of a board command
#[derive(Debug)]
pub struct Applied {
    pub payload: ResponsePayload,
    /// Whether board contents changed and subscribers need a new snapshot
    pub changed: bool,
}

impl Applied {
    fn read(payload: ResponsePayload) -> Self {
        Self {
            payload,
            changed: false,
        }
    }

    fn write(payload: ResponsePayload) -> Self {
        Self {
            payload,
            changed: true,
        }
    }
}

pub fn core_error_info(err: &CoreError) -> ErrorInfo {
    match err {
        CoreError::InvalidInput { field, .. } => ErrorInfo::invalid_field(*field, err.to_string()),
        CoreError::NoSelection { .. } => ErrorInfo::new(ErrorCode::NoSelection, err.to_string()),
        CoreError::NotFound(_) => ErrorInfo::new(ErrorCode::NotFound, err.to_string()),
    }
}

fn config_error_info(err: &ConfigError) -> ErrorInfo {
    ErrorInfo::new(ErrorCode::ConfigError, err.to_string())
}

/// Check a client's role before the command runs
pub fn authorize(role: ClientRole, command: &Command) -> Result<(), ErrorInfo> {
    let allowed = match command {
        Command::GetState
        | Command::SubscribeEvents
        | Command::UnsubscribeEvents
        | Command::Ping => true,
        Command::ReloadRoster => role.can_reload_roster(),
        Command::Select { .. }
        | Command::ClearSelection
        | Command::CheckOut { .. }
        | Command::CheckIn
        | Command::ScheduleDelivery(_)
        | Command::RemoveSelectedDelivery => role.can_edit(),
    };

    if allowed {
        Ok(())
    } else {
        Err(ErrorInfo::new(
            ErrorCode::PermissionDenied,
            format!("{:?} clients may not do this", role),
        ))
    }
}

/// Run one board command against `desk`
pub fn apply(
    desk: &mut FrontDesk,
    config_path: &Path,
    command: Command,
    now: DateTime<Local>,
) -> Result<Applied, ErrorInfo> {
    let applied = match command {
        Command::GetState => Applied::read(ResponsePayload::State(desk.snapshot(now))),

        Command::Select { target } => {
            let selection = desk.select(target).map_err(|e| core_error_info(&e))?;
            Applied::write(ResponsePayload::Selection { selection })
        }

        Command::ClearSelection => {
            desk.clear_selection();
            Applied::write(ResponsePayload::Selection { selection: None })
        }

        Command::CheckOut { duration_minutes } => {
            let (staff_id, expected_return) = desk
                .check_out(duration_minutes, now)
                .map_err(|e| core_error_info(&e))?;
            Applied::write(ResponsePayload::CheckedOut {
                staff_id,
                expected_return,
                expected_return_display: format_clock_time(&expected_return),
            })
        }

        Command::CheckIn => {
            let staff_id = desk.check_in().map_err(|e| core_error_info(&e))?;
            Applied::write(ResponsePayload::CheckedIn { staff_id })
        }

        Command::ScheduleDelivery(request) => {
            let view = desk
                .schedule_delivery(&request, now)
                .map_err(|e| core_error_info(&e))?;
            Applied::write(ResponsePayload::DeliveryScheduled(view))
        }

        Command::RemoveSelectedDelivery => {
            let delivery_id = desk
                .remove_selected_delivery()
                .map_err(|e| core_error_info(&e))?;
            Applied::write(ResponsePayload::DeliveryRemoved { delivery_id })
        }

        Command::ReloadRoster => {
            let config = load_config(config_path).map_err(|e| {
                warn!(path = %config_path.display(), error = %e, "Roster reload failed");
                config_error_info(&e)
            })?;
            let staff_count = desk.replace_roster(config.roster);
            info!(staff_count, "Roster reloaded");
            Applied::write(ResponsePayload::RosterReloaded { staff_count })
        }

        Command::SubscribeEvents | Command::UnsubscribeEvents | Command::Ping => {
            return Err(ErrorInfo::new(
                ErrorCode::InvalidRequest,
                "not a board command",
            ));
        }
    };

    Ok(applied)
}
