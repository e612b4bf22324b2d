pub mod config;
pub mod logging;
pub mod password;

pub use config::Config;
pub use logging::init_logging;
