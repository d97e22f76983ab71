pub mod codec;
pub mod config;
pub mod entity;
pub mod error;
pub mod layout;
pub mod resource;
pub mod settings;

pub use codec::{EntityCodec, YamlCodec};
pub use config::LoaderConfig;
pub use entity::*;
pub use error::*;
pub use resource::{Resource, ResourceFilter, ResourceTree};
pub use settings::*;
