use crate::coordinator::CoordinatorHandle;
use crate::db::{with_connection, Database};
use crate::error::AppError;
use crate::models::DerivedState;
use std::sync::{Arc, Mutex};

use super::StatusResponse;

/// Blocking flag (freshly recomputed) and today's blocked count.
pub fn get_status(db: &Arc<Mutex<Database>>, coordinator: &CoordinatorHandle) -> Result<StatusResponse, AppError> {
    let is_blocking = coordinator.check_status()?;
    let state = with_connection(db, "load derived state", DerivedState::load)?;
    Ok(StatusResponse {
        is_blocking,
        blocked_count: state.blocked_count,
    })
}
