pub mod settings;

pub use settings::{AppConfig, DataSettings, ModelSettings, TransformSettings};
