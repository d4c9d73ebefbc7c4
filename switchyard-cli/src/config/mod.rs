mod loader;
mod persist;
mod types;

pub use loader::ConfigLoader;
pub use persist::SettingsWriter;
pub use types::SwitchyardConfig;
