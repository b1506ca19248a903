//! Native messaging host for the extension's content script and popup.
//!
//! Chrome starts one host process per port. Each request gets exactly one
//! response; notifications raised meanwhile are written right after it.

pub mod messages;
pub mod protocol;
pub mod remote;

pub use messages::{ElementSnapshot, IncomingMessage, OutgoingMessage};
pub use remote::{OverlayPlan, RemoteElement};

use crate::commands;
use crate::coordinator::{BlockReport, CoordinatorHandle, Notification};
use crate::db::Database;
use crate::error::AppError;
use crate::page_gate::{BlockingWatch, GateEvent, PageGate};
use log::{debug, error, warn};
use protocol::{read_frame, write_frame};
use std::io::{self, Read, Write};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};

pub struct NativeHost {
    db: Arc<Mutex<Database>>,
    coordinator: CoordinatorHandle,
    notifications: Receiver<Notification>,
    watch: BlockingWatch,
    gate: PageGate<RemoteElement>,
    plan: OverlayPlan,
}

impl NativeHost {
    pub fn new(
        db: Arc<Mutex<Database>>,
        coordinator: CoordinatorHandle,
        notifications: Receiver<Notification>,
        watch: BlockingWatch,
    ) -> Self {
        Self {
            db,
            coordinator,
            notifications,
            watch,
            gate: PageGate::new(false),
            plan: OverlayPlan::default(),
        }
    }

    /// Serve stdin/stdout until the browser closes the port.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(&mut stdin.lock(), &mut stdout.lock())
    }

    pub fn serve<R: Read, W: Write>(&mut self, reader: &mut R, writer: &mut W) -> io::Result<()> {
        loop {
            let payload = read_frame(reader)?;
            let response = match serde_json::from_slice::<IncomingMessage>(&payload) {
                Ok(message) => self.handle_message(message),
                Err(e) => {
                    warn!("Ignoring malformed message: {e}");
                    OutgoingMessage::Error {
                        message: format!("Malformed message: {e}"),
                    }
                }
            };

            write_frame(writer, &response)?;
            self.flush_notifications(writer)?;
        }
    }

    pub fn handle_message(&mut self, message: IncomingMessage) -> OutgoingMessage {
        self.sync_blocking();

        let result = match message {
            IncomingMessage::VideoBlocked {
                video_title,
                url,
                thumbnail,
            } => self
                .coordinator
                .video_blocked(BlockReport {
                    title: video_title,
                    url,
                    thumbnail,
                })
                .map(|_| OutgoingMessage::Ok),
            IncomingMessage::CheckBlockingStatus => {
                if let Some(blocking) = self.watch.poll_now() {
                    self.apply(GateEvent::BlockingChanged(blocking));
                }
                Ok(self.blocking_status())
            }
            IncomingMessage::DomMutated { elements } => {
                let elements = elements.into_iter().map(RemoteElement::from).collect();
                self.apply(GateEvent::DomMutated(elements));
                Ok(self.blocking_status())
            }
            IncomingMessage::UpdateSettings { data } => {
                self.coordinator.update_settings(data).map(|()| OutgoingMessage::Ok)
            }
            IncomingMessage::GetStatus => commands::get_status(&self.db, &self.coordinator).map(OutgoingMessage::Status),
            IncomingMessage::GetBusinessHours => commands::get_business_hours(&self.db)
                .map(|business_hours| OutgoingMessage::BusinessHours { business_hours }),
            IncomingMessage::SetBusinessHours { business_hours } => {
                commands::set_business_hours(&self.coordinator, business_hours).map(|()| OutgoingMessage::Ok)
            }
            IncomingMessage::UpdateDay { day, entry } => {
                commands::update_day(&self.coordinator, &day, entry).map(|()| OutgoingMessage::Ok)
            }
            IncomingMessage::GetHistory { date } => commands::get_history(&self.db, &date).map(OutgoingMessage::History),
            IncomingMessage::GetHistoryDates => {
                commands::get_history_dates(&self.db).map(|dates| OutgoingMessage::HistoryDates { dates })
            }
            IncomingMessage::GetAllHistory => {
                commands::get_all_history(&self.db).map(|history| OutgoingMessage::AllHistory { history })
            }
            IncomingMessage::ExportHistory { date } => {
                commands::export_history(&self.db, &date).map(OutgoingMessage::Export)
            }
            IncomingMessage::ClearHistory { date } => commands::clear_history(&self.coordinator, &date)
                .map(|removed| OutgoingMessage::Cleared { date, removed }),
            IncomingMessage::GetEmail => commands::get_email(&self.db).map(|email| OutgoingMessage::Email { email }),
            IncomingMessage::SetEmail { email } => {
                commands::set_email(&self.coordinator, &email).map(|()| OutgoingMessage::Ok)
            }
        };

        result.unwrap_or_else(|e: AppError| OutgoingMessage::Error { message: e.to_string() })
    }

    /// Feed any blocking-state change observed since the last request to the gate.
    fn sync_blocking(&mut self) {
        if let Some(blocking) = self.watch.try_next() {
            self.apply(GateEvent::BlockingChanged(blocking));
        }
    }

    fn apply(&mut self, event: GateEvent<RemoteElement>) {
        let update = self.gate.handle(event);
        if !update.is_noop() {
            debug!(
                "Page gate: {} discovered, {} attached, {} detached ({} of {} overlaid)",
                update.discovered,
                update.attached.len(),
                update.detached.len(),
                self.gate.overlaid_count(),
                self.gate.tracked_count()
            );
        }

        for id in update.attached {
            self.plan.attach(id);
        }
        for id in update.detached {
            self.plan.detach(id);
        }
        for report in update.blocked {
            if let Err(e) = self.coordinator.video_blocked(report) {
                error!("Failed to report blocked video: {e}");
            }
        }
    }

    fn blocking_status(&mut self) -> OutgoingMessage {
        let plan = self.plan.take();
        OutgoingMessage::BlockingStatus {
            is_blocking: self.gate.is_blocking(),
            attach: plan.attach,
            detach: plan.detach,
        }
    }

    fn flush_notifications<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for notification in self.notifications.try_iter() {
            write_frame(writer, &OutgoingMessage::Notification(notification))?;
        }
        Ok(())
    }
}
