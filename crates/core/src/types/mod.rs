//! Shared type definitions.

pub mod id;
pub mod money;
pub mod payment;

pub use id::*;
pub use money::*;
pub use payment::*;
