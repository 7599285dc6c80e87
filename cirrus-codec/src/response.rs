//! Per-route response codecs.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CodecError;

/// How a route's response body is interpreted.
///
/// Chosen once when the route is declared, so no type inspection happens at
/// call time.
#[derive(Clone, Copy, Default)]
pub enum ResponseCodec {
    /// Return the parsed JSON unchanged.
    #[default]
    Raw,
    /// Conform the JSON through a concrete model type.
    Model {
        /// Rust type name of the model.
        name: &'static str,
        /// Decode into the model and re-encode.
        conform: fn(Value) -> Result<Value, CodecError>,
    },
}

impl ResponseCodec {
    /// A codec that passes JSON through unchanged.
    #[must_use]
    pub const fn raw() -> Self {
        Self::Raw
    }

    /// A codec that conforms JSON through `T`.
    #[must_use]
    pub fn model<T>() -> Self
    where
        T: Serialize + DeserializeOwned,
    {
        Self::Model {
            name: std::any::type_name::<T>(),
            conform: conform_through::<T>,
        }
    }

    /// Name of the model type, if any.
    #[must_use]
    pub fn model_name(&self) -> Option<&'static str> {
        match self {
            Self::Raw => None,
            Self::Model { name, .. } => Some(*name),
        }
    }

    /// Apply the codec to a parsed JSON value.
    pub fn conform(&self, value: Value) -> Result<Value, CodecError> {
        match self {
            Self::Raw => Ok(value),
            Self::Model { name, conform } => conform(value).map_err(|e| match e {
                CodecError::Decode(reason) | CodecError::Encode(reason) => {
                    CodecError::ModelMismatch {
                        model: *name,
                        reason,
                    }
                }
                other => other,
            }),
        }
    }
}

impl fmt::Debug for ResponseCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => f.write_str("Raw"),
            Self::Model { name, .. } => f.debug_tuple("Model").field(name).finish(),
        }
    }
}

fn conform_through<T>(value: Value) -> Result<Value, CodecError>
where
    T: Serialize + DeserializeOwned,
{
    let model: T = crate::json::decode(value)?;
    crate::json::encode(&model)
}
