//! Background tasks module
//! 
//! This module contains background tasks that run alongside the HTTP server.

pub mod journal_writer;
pub mod reconcile;
pub mod tick_pump;

// Re-export main functions
pub use journal_writer::journal_writer_task;
pub use reconcile::wall_clock_reconcile_task;
pub use tick_pump::tick_pump_task;
