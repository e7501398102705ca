pub mod commands;
pub mod ui;
pub mod util;

pub use util::{load_config, read_input};
