//! Route declarations and the descriptors they produce.

use cirrus_codec::ResponseCodec;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ContractError;
use crate::method::HttpMethod;
use crate::path::PathTemplate;
use crate::signature::{Param, Signature};

/// Which methods a definition accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MethodPolicy {
    /// `GET`, `POST`, `PUT`, `DELETE` and `PATCH`.
    #[default]
    Strict,
    /// The strict set plus `OPTIONS`, `HEAD` and `TRACE`.
    Permissive,
}

impl MethodPolicy {
    /// Whether `method` may be declared under this policy.
    #[must_use]
    pub fn allows(self, method: HttpMethod) -> bool {
        match self {
            Self::Strict => !method.is_extended(),
            Self::Permissive => true,
        }
    }
}

/// An unchecked route, as written by the contract author.
///
/// # Example
///
/// ```rust
/// use cirrus_core::RouteDeclaration;
///
/// let decl = RouteDeclaration::get("get_item", "/items/{id}")
///     .param("id")
///     .param_default("verbose", false);
/// assert_eq!(decl.name(), "get_item");
/// ```
#[derive(Debug, Clone)]
pub struct RouteDeclaration {
    name: String,
    method: HttpMethod,
    path: String,
    has_body: bool,
    params: Vec<Param>,
    response: ResponseCodec,
}

impl RouteDeclaration {
    /// Declare a route with an explicit method.
    #[must_use]
    pub fn new(name: impl Into<String>, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
            has_body: false,
            params: Vec::new(),
            response: ResponseCodec::Raw,
        }
    }

    /// Declare a `GET` route.
    #[must_use]
    pub fn get(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, HttpMethod::Get, path)
    }

    /// Declare a `POST` route.
    #[must_use]
    pub fn post(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, HttpMethod::Post, path)
    }

    /// Declare a `PUT` route.
    #[must_use]
    pub fn put(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, HttpMethod::Put, path)
    }

    /// Declare a `DELETE` route.
    #[must_use]
    pub fn delete(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, HttpMethod::Delete, path)
    }

    /// Declare a `PATCH` route.
    #[must_use]
    pub fn patch(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, HttpMethod::Patch, path)
    }

    /// Mark the route as carrying a request body.
    #[must_use]
    pub fn with_body(mut self) -> Self {
        self.has_body = true;
        self
    }

    /// Append a required parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::required(name));
        self
    }

    /// Append a parameter with a default value.
    #[must_use]
    pub fn param_default(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.params.push(Param::with_default(name, default));
        self
    }

    /// Conform responses through `T`.
    #[must_use]
    pub fn returns<T>(mut self) -> Self
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        self.response = ResponseCodec::model::<T>();
        self
    }

    /// Set the response codec directly.
    #[must_use]
    pub fn response(mut self, codec: ResponseCodec) -> Self {
        self.response = codec;
        self
    }

    /// Route name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check the declaration on its own and turn it into a descriptor.
    pub(crate) fn into_descriptor(
        self,
        policy: MethodPolicy,
    ) -> Result<RouteDescriptor, ContractError> {
        let invalid = |reason: String| ContractError::InvalidRouteDeclaration {
            route: self.name.clone(),
            reason,
        };

        if !policy.allows(self.method) {
            return Err(invalid(format!(
                "method {} requires a permissive definition",
                self.method
            )));
        }
        if self.has_body && self.method.forbids_body() {
            return Err(invalid(format!("{} routes cannot declare a body", self.method)));
        }

        let path = PathTemplate::parse(self.path.as_str()).map_err(|e| invalid(e.to_string()))?;

        let mut signature = Signature::new();
        for param in self.params {
            if signature.contains(param.name()) {
                return Err(invalid(format!("parameter `{}` declared twice", param.name())));
            }
            signature.push(param);
        }

        if let Some(placeholder) = path.placeholders().find(|p| !signature.contains(p)) {
            return Err(ContractError::UnboundPathPlaceholder {
                route: self.name.clone(),
                placeholder: placeholder.to_string(),
            });
        }

        Ok(RouteDescriptor {
            name: self.name,
            method: self.method,
            path,
            has_body: self.has_body,
            signature,
            response: self.response,
        })
    }
}

/// Immutable metadata for one operation of a definition.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    name: String,
    method: HttpMethod,
    path: PathTemplate,
    has_body: bool,
    signature: Signature,
    response: ResponseCodec,
}

impl RouteDescriptor {
    /// Route name, unique within its definition.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Path template.
    #[must_use]
    pub fn path(&self) -> &PathTemplate {
        &self.path
    }

    /// Whether requests carry a body.
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.has_body
    }

    /// Parameter list.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Codec applied to response values.
    #[must_use]
    pub fn response(&self) -> ResponseCodec {
        self.response
    }

    /// Parameters not consumed by the path template, in signature order.
    pub fn extra_params(&self) -> impl Iterator<Item = &Param> {
        self.signature
            .params()
            .iter()
            .filter(|p| !self.path.has_placeholder(p.name()))
    }
}
