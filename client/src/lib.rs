mod app;
pub mod color;
pub mod commands;
mod dom;
pub mod engine;
pub mod growth;
mod net;
pub mod raster;
mod render;
pub mod state;
pub mod surface;
mod ws;

pub use app::run;
