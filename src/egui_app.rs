//! Native sketchpad window built on egui/eframe.

pub mod controller;
pub mod state;
pub mod ui;
