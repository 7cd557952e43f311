//! Domain layer: models, the scheduling/billing core, and the services
//! the REST layer drives through command and result types.

pub mod auth;
pub mod billing;
pub mod billing_service;
pub mod commands;
pub mod errors;
pub mod group;
pub mod ledger_service;
pub mod models;
pub mod month_calendar;
pub mod notifier;
pub mod rate_service;
pub mod session_index;
pub mod session_service;
pub mod student_service;
pub mod time_grid;
pub mod week_cursor;
