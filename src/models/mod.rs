pub mod attendee;
pub mod event;

pub use attendee::{Attendee, AttendeeAnswer};
pub use event::Event;
