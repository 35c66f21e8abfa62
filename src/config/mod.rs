// Tool settings: defaults plus optional per-pipeline overrides.
mod loader;
mod types;

pub use loader::{CONFIG_FILE, load};
pub use types::Config;
