//! Route signatures and call binding.

use serde_json::Value;

use crate::args::{Arguments, CallArgs};
use crate::error::CirrusError;

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: String,
    default: Option<Value>,
}

impl Param {
    /// A parameter callers must supply.
    #[must_use]
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    /// A parameter with a default used when callers omit it.
    #[must_use]
    pub fn with_default(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default value, if any.
    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether callers must supply this parameter.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Ordered parameter list of a route.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    /// Create an empty signature.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, param: Param) {
        self.params.push(param);
    }

    /// Parameters in declaration order.
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Look up a parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Whether a parameter with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.param(name).is_some()
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the signature takes no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Bind call arguments to parameter names.
    ///
    /// Positional values fill parameters in order, named values fill the
    /// parameter of that name, and defaults fill whatever is left. Fails when
    /// there are too many positional values, an unknown or repeated name, or
    /// a required parameter with no value.
    pub fn bind(&self, route: &str, args: CallArgs) -> Result<Arguments, CirrusError> {
        let fail = |reason: String| CirrusError::ArgumentBinding {
            route: route.to_string(),
            reason,
        };

        let (positional, keyword) = args.into_parts();
        if positional.len() > self.params.len() {
            return Err(fail(format!(
                "takes {} argument(s) but {} positional were given",
                self.params.len(),
                positional.len()
            )));
        }

        let mut slots: Vec<Option<Value>> = vec![None; self.params.len()];
        for (slot, value) in slots.iter_mut().zip(positional) {
            *slot = Some(value);
        }

        for (name, value) in keyword {
            let index = self
                .params
                .iter()
                .position(|p| p.name == name)
                .ok_or_else(|| fail(format!("unexpected argument `{name}`")))?;
            if slots[index].is_some() {
                return Err(fail(format!("multiple values for argument `{name}`")));
            }
            slots[index] = Some(value);
        }

        let mut values = Vec::with_capacity(self.params.len());
        for (param, slot) in self.params.iter().zip(slots) {
            let value = match (slot, &param.default) {
                (Some(value), _) => value,
                (None, Some(default)) => default.clone(),
                (None, None) => {
                    return Err(fail(format!("missing required argument `{}`", param.name)));
                }
            };
            values.push((param.name.clone(), value));
        }

        Ok(Arguments::for_route(route, values))
    }
}
