//! Focus timer with a plain text work log.
//!
//! [`timer::FocusTimer`] tracks focus time, [`store::SessionLog`] keeps the
//! saved sessions in sync with the log file, and [`app::AppState`] wires both
//! to the terminal screen in [`ui`].

pub mod app;
pub mod config;
pub mod error;
pub mod session;
pub mod store;
pub mod timer;
pub mod ui;
