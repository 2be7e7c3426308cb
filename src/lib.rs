//! Superstore sales dashboard: a pure load → filter → aggregate pipeline
//! (`data`) and the egui front end that renders it.

pub mod app;
pub mod color;
pub mod data;
pub mod state;
pub mod ui;
