//! Call arguments, before and after binding.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CirrusError;

/// Arguments as supplied by a caller: positional values plus named values.
///
/// ```rust
/// use cirrus_core::CallArgs;
///
/// let args = CallArgs::new().arg(42).kwarg("verbose", true);
/// assert_eq!(args.positional().len(), 1);
/// assert_eq!(args.keyword().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<Value>,
    keyword: Vec<(String, Value)>,
}

impl CallArgs {
    /// Create an empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Append a named argument.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.push((name.into(), value.into()));
        self
    }

    /// Append a positional argument of any serializable type.
    pub fn encode_arg<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, CirrusError> {
        Ok(self.arg(cirrus_codec::json::encode(value)?))
    }

    /// Append a named argument of any serializable type.
    pub fn encode_kwarg<T: Serialize + ?Sized>(
        self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<Self, CirrusError> {
        Ok(self.kwarg(name, cirrus_codec::json::encode(value)?))
    }

    /// Positional arguments in order.
    #[must_use]
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Named arguments in the order they were given.
    #[must_use]
    pub fn keyword(&self) -> &[(String, Value)] {
        &self.keyword
    }

    /// Check if no arguments were given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Vec<Value>, Vec<(String, Value)>) {
        (self.positional, self.keyword)
    }
}

/// Arguments bound to a route's parameter names, in signature order.
///
/// Produced by [`Signature::bind`](crate::Signature::bind); defaults are
/// already applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    route: String,
    values: Vec<(String, Value)>,
}

impl Arguments {
    /// Build bound arguments from name/value pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            route: String::new(),
            values: pairs.into_iter().collect(),
        }
    }

    pub(crate) fn for_route(route: &str, values: Vec<(String, Value)>) -> Self {
        Self {
            route: route.to_string(),
            values,
        }
    }

    /// Name of the route these arguments were bound for.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Get a bound value by parameter name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find_map(|(key, value)| (key == name).then_some(value))
    }

    /// Decode a bound value into a concrete type.
    ///
    /// Text values are decoded leniently, so a path segment `"42"` decodes
    /// into an integer parameter.
    pub fn decode<T: DeserializeOwned>(&self, name: &str) -> Result<T, CirrusError> {
        let value = self.get(name).ok_or_else(|| CirrusError::ArgumentBinding {
            route: self.route.clone(),
            reason: format!("no bound argument named `{name}`"),
        })?;
        Ok(cirrus_codec::json::decode(value.clone())?)
    }

    /// Iterate over bound values in signature order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of bound values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume into name/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, Value)> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_args_builder() {
        let args = CallArgs::new().arg(1).arg("two").kwarg("three", 3.0);
        assert_eq!(args.positional(), &[json!(1), json!("two")]);
        assert_eq!(args.keyword(), &[("three".to_string(), json!(3.0))]);
        assert!(!args.is_empty());
        assert!(CallArgs::new().is_empty());
    }

    #[test]
    fn test_encode_kwarg() {
        #[derive(Serialize)]
        struct Filter {
            tag: &'static str,
        }

        let args = CallArgs::new()
            .encode_kwarg("filter", &Filter { tag: "new" })
            .unwrap();
        assert_eq!(args.keyword()[0].1, json!({"tag": "new"}));
    }

    #[test]
    fn test_arguments_decode() {
        let args = Arguments::from_pairs([
            ("id".to_string(), json!("42")),
            ("name".to_string(), json!("bolt")),
        ]);
        assert_eq!(args.decode::<u64>("id").unwrap(), 42);
        assert_eq!(args.decode::<String>("name").unwrap(), "bolt");
        assert!(matches!(
            args.decode::<u64>("missing"),
            Err(CirrusError::ArgumentBinding { .. })
        ));
        assert!(matches!(
            args.decode::<u64>("name"),
            Err(CirrusError::Codec(_))
        ));
    }
}
