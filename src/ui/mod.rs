//! egui rendering: `panels` holds the controls that mutate [`AppState`],
//! `views` draws the read-only page content.
//!
//! [`AppState`]: crate::state::AppState

pub mod panels;
pub mod views;
