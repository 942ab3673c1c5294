pub mod setup;

pub use setup::{run_setup, setup_command, SetupError, SetupOptions, SetupReport};
