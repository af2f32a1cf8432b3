#![deny(clippy::unwrap_used)]

mod cli;
mod config;
pub mod request;
pub mod response;
pub mod server;
pub mod static_files;

pub use cli::{main, Opts, OutputFormat};
pub use config::{Config, DictConfig, HttpConfig, HTTPSPELL_CONFIG_FILE};
pub use server::{router, serve, AppState};

#[macro_export]
macro_rules! info_1 {
    ($($arg:tt)*) => ({
        use colored::*;
        println!("{} {}", "::".bold().blue(), format!($($arg)*));
    })
}

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => ({
        use colored::*;
        eprintln!("{} {}", "Error:".red(), format!($($arg)*));
    })
}
