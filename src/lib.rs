pub mod changes;
pub mod clock;
pub mod commands;
pub mod config;
pub mod constants;
pub mod coordinator;
pub mod db;
pub mod error;
pub mod models;
pub mod native_host;
pub mod page_gate;
#[cfg(test)]
mod test_utils;
pub mod validation;
pub mod window;

use crate::changes::ChangeHub;
use crate::clock::{Clock, SystemClock};
use crate::config::CoordinatorConfig;
use crate::coordinator::{AlarmThread, Coordinator, CoordinatorHandle};
use crate::db::{migrations, Database};
use crate::error::InitError;
use crate::native_host::NativeHost;
use crate::page_gate::BlockingWatch;
use log::{error, info};
use std::path::Path;
use std::sync::mpsc::channel;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/// A started service: coordinator thread, alarm thread and the host serving
/// this process's port.
pub struct Service {
    pub host: NativeHost,
    coordinator: CoordinatorHandle,
    coordinator_thread: JoinHandle<()>,
    alarms: AlarmThread,
}

impl Service {
    /// Open and migrate the database, then start the coordinator and its alarms.
    pub fn start(db_path: &Path, config: &CoordinatorConfig) -> Result<Self, InitError> {
        let db = Database::open(db_path).map_err(InitError::DatabaseOpen)?;
        migrations::run(db.connection()).map_err(InitError::Migration)?;
        let db = Arc::new(Mutex::new(db));

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let changes = Arc::new(ChangeHub::new());
        let (notify_tx, notify_rx) = channel();

        let coordinator = Coordinator::new(Arc::clone(&db), Arc::clone(&clock), Arc::clone(&changes), notify_tx);
        let (handle, coordinator_thread) = coordinator.spawn();
        let alarms = AlarmThread::start(handle.clone(), config, &clock);

        let watch = BlockingWatch::new(changes.subscribe(), handle.clone(), config.recheck_interval);
        let host = NativeHost::new(db, handle.clone(), notify_rx, watch);

        info!("Service started with database at {}", db_path.display());
        Ok(Self {
            host,
            coordinator: handle,
            coordinator_thread,
            alarms,
        })
    }

    /// Stop the alarms, then drain and stop the coordinator.
    pub fn shutdown(self) {
        self.alarms.stop();
        self.coordinator.shutdown();
        if self.coordinator_thread.join().is_err() {
            error!("Coordinator thread panicked");
        }
        info!("Service stopped");
    }
}
