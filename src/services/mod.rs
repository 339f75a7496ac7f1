pub mod attendees;
pub mod events;
pub mod input;

pub use attendees::AttendeesService;
pub use events::EventsService;
