//! Background Tasks Module
//!
//! Periodic work that runs alongside the server: the expiry sweeper.

mod sweeper;

pub use sweeper::spawn_sweeper_task;
