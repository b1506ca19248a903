use crate::constants::KEY_EMAIL;
use crate::coordinator::CoordinatorHandle;
use crate::db::{with_connection, Database};
use crate::error::AppError;
use crate::models::{kv, Scope};
use std::sync::{Arc, Mutex};

pub fn get_email(db: &Arc<Mutex<Database>>) -> Result<String, AppError> {
    let email: Option<String> = with_connection(db, "load email", |conn| kv::get(conn, Scope::Sync, KEY_EMAIL))?;
    Ok(email.unwrap_or_default())
}

pub fn set_email(coordinator: &CoordinatorHandle, email: &str) -> Result<(), AppError> {
    coordinator.set_email(email)
}
