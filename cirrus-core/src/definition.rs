//! Interface definitions and their route registry.

use std::fmt;
use std::sync::Arc;

use crate::error::ContractError;
use crate::route::{MethodPolicy, RouteDeclaration, RouteDescriptor};

/// A direct base of a definition.
#[derive(Clone)]
pub enum ContractBase {
    /// The contract root marker. Valid definitions have only this base.
    Root,
    /// Another definition, making this one a layered contract.
    Definition(Arc<InterfaceDefinition>),
}

impl ContractBase {
    /// Display name of the base.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Root => "Root",
            Self::Definition(def) => def.name(),
        }
    }

    /// Whether this is the root marker.
    #[must_use]
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }
}

impl fmt::Debug for ContractBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("Root"),
            Self::Definition(def) => f.debug_tuple("Definition").field(&def.name()).finish(),
        }
    }
}

/// A contract: an ordered registry of route descriptors.
///
/// Built once through [`DefinitionBuilder`] and shared behind an `Arc` by the
/// server binder and every client synthesized from it.
#[derive(Debug)]
pub struct InterfaceDefinition {
    name: String,
    bases: Vec<ContractBase>,
    policy: MethodPolicy,
    routes: Vec<RouteDescriptor>,
}

impl InterfaceDefinition {
    /// Definition name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct bases.
    #[must_use]
    pub fn bases(&self) -> &[ContractBase] {
        &self.bases
    }

    /// Method policy routes were checked against.
    #[must_use]
    pub fn policy(&self) -> MethodPolicy {
        self.policy
    }

    /// Routes in declaration order.
    #[must_use]
    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    /// Look up a route by name.
    #[must_use]
    pub fn route(&self, name: &str) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|r| r.name() == name)
    }

    /// Number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check if the definition declares no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Builder that accumulates routes into an [`InterfaceDefinition`].
///
/// Each [`route`](Self::route) call checks the declaration against the
/// routes already registered, so a builder never holds an invalid registry.
///
/// # Example
///
/// ```rust
/// use cirrus_core::{DefinitionBuilder, RouteDeclaration};
///
/// # fn main() -> Result<(), cirrus_core::ContractError> {
/// let def = DefinitionBuilder::new("Inventory")
///     .route(RouteDeclaration::get("list", "/items"))?
///     .route(RouteDeclaration::get("get", "/items/{id}").param("id"))?
///     .build();
///
/// assert_eq!(def.len(), 2);
/// assert_eq!(def.routes()[0].name(), "list");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DefinitionBuilder {
    name: String,
    bases: Vec<ContractBase>,
    policy: MethodPolicy,
    routes: Vec<RouteDescriptor>,
}

impl DefinitionBuilder {
    /// Start a definition rooted at the contract marker.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: vec![ContractBase::Root],
            policy: MethodPolicy::Strict,
            routes: Vec::new(),
        }
    }

    /// Accept `OPTIONS`, `HEAD` and `TRACE` routes.
    ///
    /// Call before registering routes that use them.
    #[must_use]
    pub fn permissive(mut self) -> Self {
        self.policy = MethodPolicy::Permissive;
        self
    }

    /// Add another definition as a direct base.
    ///
    /// The result can be built but is not a valid contract.
    #[must_use]
    pub fn extends(mut self, parent: Arc<InterfaceDefinition>) -> Self {
        self.bases.push(ContractBase::Definition(parent));
        self
    }

    /// Register a route.
    pub fn route(mut self, decl: RouteDeclaration) -> Result<Self, ContractError> {
        let desc = decl.into_descriptor(self.policy)?;
        self.check_conflicts(&desc)?;
        self.routes.push(desc);
        Ok(self)
    }

    /// Freeze the registry.
    #[must_use]
    pub fn build(self) -> Arc<InterfaceDefinition> {
        tracing::debug!(
            definition = %self.name,
            routes = self.routes.len(),
            "built interface definition"
        );
        Arc::new(InterfaceDefinition {
            name: self.name,
            bases: self.bases,
            policy: self.policy,
            routes: self.routes,
        })
    }

    fn check_conflicts(&self, desc: &RouteDescriptor) -> Result<(), ContractError> {
        let invalid = |reason: String| ContractError::InvalidRouteDeclaration {
            route: desc.name().to_string(),
            reason,
        };

        let shape = desc.path().shape();
        for existing in &self.routes {
            if existing.name() == desc.name() {
                return Err(invalid("route name already registered".to_string()));
            }
            if existing.path().shape() != shape {
                continue;
            }
            if existing.method() == desc.method() {
                return Err(invalid(format!(
                    "{} {} is already served by `{}`",
                    desc.method(),
                    desc.path(),
                    existing.name()
                )));
            }
            if !existing.path().placeholders().eq(desc.path().placeholders()) {
                return Err(invalid(format!(
                    "path {} conflicts with {} of `{}`; use the same placeholder names",
                    desc.path(),
                    existing.path(),
                    existing.name()
                )));
            }
        }
        Ok(())
    }
}
