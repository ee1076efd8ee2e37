//! Application services.

pub mod events;
