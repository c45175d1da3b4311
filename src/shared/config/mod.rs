mod global;
mod model;


pub use global::CONFIG;
pub use model::{EngineConfig, LoggingConfig, Settings, ViewConfig, load_settings};
