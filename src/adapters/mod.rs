// Adapters layer: concrete implementations for external systems (content backend, session, clock).

pub mod clock;
pub mod contentful;
pub mod session;
