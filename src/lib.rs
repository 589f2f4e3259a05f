pub mod camera;
pub mod config;
pub mod discovery;
pub mod error;
pub mod input;
pub mod ownership;
pub mod plugin;
pub mod scene;

// Re-export commonly used items
pub use config::{OverrideConfig, OwnershipStrategy};
pub use error::OverrideError;
pub use ownership::{HostBehaviorAppExt, ViewOwnership};
pub use plugin::ThirdPersonOverridePlugin;
