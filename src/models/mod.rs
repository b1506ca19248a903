pub mod block_event;
pub mod kv;
pub mod schedule;
pub mod state;
pub mod weekday;

pub use block_event::BlockEvent;
pub use kv::Scope;
pub use schedule::{Schedule, ScheduleEntry};
pub use state::DerivedState;
pub use weekday::Weekday;
