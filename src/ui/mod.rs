pub mod app;
pub mod detail;
pub mod draw;
