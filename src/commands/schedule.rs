use crate::coordinator::CoordinatorHandle;
use crate::db::{with_connection, Database};
use crate::error::AppError;
use crate::models::{Schedule, ScheduleEntry};
use crate::validation::validate_weekday;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub fn get_business_hours(db: &Arc<Mutex<Database>>) -> Result<BTreeMap<String, ScheduleEntry>, AppError> {
    let schedule = with_connection(db, "load business hours", |conn| Ok(Schedule::load(conn)?))?;
    Ok(schedule.to_named())
}

/// Replace the whole schedule. Unknown day names or malformed times reject the
/// entire request.
pub fn set_business_hours(
    coordinator: &CoordinatorHandle,
    business_hours: BTreeMap<String, ScheduleEntry>,
) -> Result<(), AppError> {
    let schedule = Schedule::from_named(business_hours)?;
    coordinator.set_business_hours(schedule)
}

/// Change a single day, as the popup does on every toggle or time edit.
pub fn update_day(coordinator: &CoordinatorHandle, day: &str, entry: ScheduleEntry) -> Result<(), AppError> {
    let day = validate_weekday(day)?;
    entry.validate()?;
    coordinator.update_day(day, entry)
}
