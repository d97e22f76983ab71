//! Entity codec: one descriptor file's bytes <-> one typed entity.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, DescriptorError};
use crate::resource::Resource;

/// Serializer/deserializer for a single descriptor.
///
/// Descriptor file names are fixed by the on-disk layout; the body encoding
/// is entirely up to the codec.
pub trait EntityCodec: Send + Sync {
    fn load<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError>;

    fn save<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    /// Read and decode the descriptor stored at `resource`.
    fn depersist<T: DeserializeOwned>(&self, resource: &Resource) -> Result<T, DescriptorError> {
        let bytes = resource.contents()?;
        Ok(self.load(&bytes)?)
    }

    /// Encode `value` and write it to `resource`.
    fn persist<T: Serialize>(&self, value: &T, resource: &Resource) -> Result<(), DescriptorError> {
        let bytes = self.save(value)?;
        resource.write(&bytes)?;
        Ok(())
    }
}

/// YAML codec backed by `serde_yaml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl EntityCodec for YamlCodec {
    fn load<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        serde_yaml::from_slice(bytes).map_err(|e| CodecError::Deserialize(e.to_string()))
    }

    fn save<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serde_yaml::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| CodecError::Serialize(e.to_string()))
    }
}
