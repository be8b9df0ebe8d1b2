//! StudyFlow Frontend Entry Point

mod app;
mod commands;
mod config;
mod context;
mod controls;
mod dispatcher;
mod error;
mod feedback;
mod format;
mod logging;
mod models;
mod mutator;
mod stats;
mod sync;
mod widgets;

fn main() {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
    app::boot();
}
