//! Terminal date picker: a text field bound to a date, with a pop-up
//! calendar offering week, month and year views.

pub mod cli;
pub mod commands;
pub mod config;
pub mod date;
pub mod grid;
pub mod input;
pub mod logging;
pub mod model;
pub mod overlay;
pub mod pattern;
pub mod picker;
pub mod theme;
pub mod ui;
