//! Structural checks shared by the server binder and both client synthesizers.

use std::sync::Arc;

use crate::definition::InterfaceDefinition;
use crate::error::ContractError;
use crate::implementation::Implementation;

/// Check that a definition's only direct base is the contract root.
pub fn require_definition(definition: &InterfaceDefinition) -> Result<(), ContractError> {
    match definition.bases() {
        [base] if base.is_root() => Ok(()),
        bases => {
            let names: Vec<_> = bases.iter().map(|b| b.name()).collect();
            Err(ContractError::ContractViolation {
                subject: definition.name().to_string(),
                reason: format!(
                    "a definition must derive only from the contract root, found [{}]",
                    names.join(", ")
                ),
                source: None,
            })
        }
    }
}

/// Check that an implementation has one valid definition as its base and a
/// member for every route of it.
///
/// Returns the base definition on success.
pub fn require_implementation<H>(
    implementation: &Implementation<H>,
) -> Result<&Arc<InterfaceDefinition>, ContractError> {
    let definition = match implementation.bases() {
        [definition] => definition,
        bases => {
            return Err(ContractError::ContractViolation {
                subject: implementation.name().to_string(),
                reason: format!(
                    "an implementation must have exactly one direct base, found {}",
                    bases.len()
                ),
                source: None,
            });
        }
    };

    require_definition(definition).map_err(|e| ContractError::ContractViolation {
        subject: implementation.name().to_string(),
        reason: format!("base `{}` is not a valid definition", definition.name()),
        source: Some(Box::new(e)),
    })?;

    let missing: Vec<String> = definition
        .routes()
        .iter()
        .filter(|route| implementation.member(route.name()).is_none())
        .map(|route| route.name().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ContractError::IncompleteImplementation {
            implementation: implementation.name().to_string(),
            missing,
        });
    }

    Ok(definition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::DefinitionBuilder;
    use crate::handler::BlockingHandler;
    use crate::route::RouteDeclaration;
    use serde_json::Value;
    use std::error::Error;

    fn shop() -> Arc<InterfaceDefinition> {
        DefinitionBuilder::new("Shop")
            .route(RouteDeclaration::get("list", "/items"))
            .unwrap()
            .route(RouteDeclaration::post("buy", "/items/{id}/buy").param("id"))
            .unwrap()
            .build()
    }

    fn noop() -> BlockingHandler {
        BlockingHandler::new(|_| Ok(Value::Null))
    }

    #[test]
    fn test_complete_implementation_passes() {
        let def = shop();
        let imp = Implementation::builder("ShopImpl", def.clone())
            .route("list", noop())
            .route("buy", noop())
            .build();
        let base = require_implementation(&imp).unwrap();
        assert!(Arc::ptr_eq(base, &def));
    }

    #[test]
    fn test_missing_one_override() {
        let imp = Implementation::builder("ShopImpl", shop())
            .route("list", noop())
            .build();
        assert_eq!(
            require_implementation(&imp).unwrap_err(),
            ContractError::IncompleteImplementation {
                implementation: "ShopImpl".into(),
                missing: vec!["buy".into()],
            }
        );
    }

    #[test]
    fn test_plain_member_counts_as_present() {
        let imp = Implementation::builder("ShopImpl", shop())
            .route("list", noop())
            .plain("buy", noop())
            .build();
        assert!(require_implementation(&imp).is_ok());
    }

    #[test]
    fn test_layered_definition_rejected() {
        let child = DefinitionBuilder::new("Child").extends(shop()).build();
        assert!(matches!(
            require_definition(&child),
            Err(ContractError::ContractViolation { .. })
        ));

        let imp = Implementation::<BlockingHandler>::builder("ChildImpl", child).build();
        let err = require_implementation(&imp).unwrap_err();
        assert!(matches!(err, ContractError::ContractViolation { .. }));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_implementation_base_count() {
        let two = Implementation::<BlockingHandler>::builder("Two", shop())
            .implements(shop())
            .build();
        let none = crate::ImplementationBuilder::<BlockingHandler>::new("None").build();

        for imp in [two, none] {
            let err = require_implementation(&imp).unwrap_err();
            assert!(matches!(err, ContractError::ContractViolation { source: None, .. }));
        }
    }
}
