//! Bound implementations: a definition plus a callable per route.

use std::sync::Arc;

use serde_json::Value;

use crate::args::CallArgs;
use crate::definition::InterfaceDefinition;
use crate::error::{CirrusError, ContractError};
use crate::handler::{AsyncHandler, BlockingHandler};
use crate::route::RouteDescriptor;

/// A named member of an implementation.
#[derive(Debug, Clone)]
pub enum Member<H> {
    /// A member marked as the override of the route with the same name.
    Route(H),
    /// A callable that shares a route's name but was not marked as its override.
    Plain(H),
}

impl<H> Member<H> {
    /// Whether the member is a marked route override.
    #[must_use]
    pub fn is_route(&self) -> bool {
        matches!(self, Self::Route(_))
    }

    /// The wrapped callable.
    #[must_use]
    pub fn handler(&self) -> &H {
        match self {
            Self::Route(h) | Self::Plain(h) => h,
        }
    }
}

/// A concrete implementation of one definition.
///
/// `H` is the callable kind: [`AsyncHandler`] for server handlers and
/// suspending clients, [`BlockingHandler`] for blocking clients. The shape is
/// checked by [`require_implementation`](crate::require_implementation), not
/// at construction.
#[derive(Debug, Clone)]
pub struct Implementation<H> {
    name: String,
    bases: Vec<Arc<InterfaceDefinition>>,
    members: Vec<(String, Member<H>)>,
}

impl<H> Implementation<H> {
    /// Start an implementation of `definition`.
    #[must_use]
    pub fn builder(
        name: impl Into<String>,
        definition: Arc<InterfaceDefinition>,
    ) -> ImplementationBuilder<H> {
        ImplementationBuilder::new(name).implements(definition)
    }

    /// Implementation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct bases.
    #[must_use]
    pub fn bases(&self) -> &[Arc<InterfaceDefinition>] {
        &self.bases
    }

    /// The first direct base, if any.
    #[must_use]
    pub fn definition(&self) -> Option<&Arc<InterfaceDefinition>> {
        self.bases.first()
    }

    /// Look up a member by name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Member<H>> {
        self.members
            .iter()
            .find_map(|(key, member)| (key == name).then_some(member))
    }

    /// Members in insertion order.
    pub fn members(&self) -> impl Iterator<Item = (&str, &Member<H>)> {
        self.members.iter().map(|(k, m)| (k.as_str(), m))
    }

    /// Find the descriptor and marked override for `route`.
    pub fn resolve(&self, route: &str) -> Result<(&RouteDescriptor, &H), CirrusError> {
        let desc = self
            .definition()
            .and_then(|def| def.route(route))
            .ok_or_else(|| CirrusError::RouteNotFound(route.to_string()))?;

        match self.member(route) {
            Some(Member::Route(handler)) => Ok((desc, handler)),
            Some(Member::Plain(_)) => Err(ContractError::MissingOverrideMarker {
                implementation: self.name.clone(),
                route: route.to_string(),
            }
            .into()),
            None => Err(ContractError::IncompleteImplementation {
                implementation: self.name.clone(),
                missing: vec![route.to_string()],
            }
            .into()),
        }
    }
}

impl Implementation<AsyncHandler> {
    /// Bind `args` against the route's signature and await its member.
    pub async fn call(&self, route: &str, args: CallArgs) -> Result<Value, CirrusError> {
        let (desc, handler) = self.resolve(route)?;
        let bound = desc.signature().bind(desc.name(), args)?;
        handler.call(bound).await
    }
}

impl Implementation<BlockingHandler> {
    /// Bind `args` against the route's signature and run its member.
    pub fn call(&self, route: &str, args: CallArgs) -> Result<Value, CirrusError> {
        let (desc, handler) = self.resolve(route)?;
        let bound = desc.signature().bind(desc.name(), args)?;
        handler.call(bound)
    }
}

/// Builder for [`Implementation`].
#[derive(Debug)]
pub struct ImplementationBuilder<H> {
    name: String,
    bases: Vec<Arc<InterfaceDefinition>>,
    members: Vec<(String, Member<H>)>,
}

impl<H> ImplementationBuilder<H> {
    /// Start an implementation with no bases.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Add a definition as a direct base.
    #[must_use]
    pub fn implements(mut self, definition: Arc<InterfaceDefinition>) -> Self {
        self.bases.push(definition);
        self
    }

    /// Add a marked route override. Replaces any member with the same name.
    #[must_use]
    pub fn route(self, name: impl Into<String>, handler: H) -> Self {
        self.member(name.into(), Member::Route(handler))
    }

    /// Add an unmarked member. Replaces any member with the same name.
    #[must_use]
    pub fn plain(self, name: impl Into<String>, handler: H) -> Self {
        self.member(name.into(), Member::Plain(handler))
    }

    fn member(mut self, name: String, member: Member<H>) -> Self {
        match self.members.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = member,
            None => self.members.push((name, member)),
        }
        self
    }

    /// Finish the implementation.
    #[must_use]
    pub fn build(self) -> Implementation<H> {
        Implementation {
            name: self.name,
            bases: self.bases,
            members: self.members,
        }
    }
}
