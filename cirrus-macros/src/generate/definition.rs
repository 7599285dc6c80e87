//! Generate the interface definition constructor.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::parse::{ContractDefinition, RouteMethod};

/// Generate `definition()`, which builds the registry entry once.
pub fn generate_definition(contract: &ContractDefinition) -> TokenStream {
    let trait_name = contract.name.to_string();
    let permissive = contract.permissive.then(|| quote! { .permissive() });
    let routes = contract.routes.iter().map(generate_declaration);

    quote! {
        /// Interface definition derived from the trait, built once per process.
        pub fn definition() -> ::std::result::Result<
            ::std::sync::Arc<::cirrus::InterfaceDefinition>,
            ::cirrus::ContractError,
        > {
            static DEFINITION: ::std::sync::OnceLock<::std::sync::Arc<::cirrus::InterfaceDefinition>> =
                ::std::sync::OnceLock::new();

            if let Some(definition) = DEFINITION.get() {
                return Ok(definition.clone());
            }

            let definition = ::cirrus::DefinitionBuilder::new(#trait_name)
                #permissive
                #(#routes)*
                .build();
            Ok(DEFINITION.get_or_init(|| definition).clone())
        }
    }
}

fn generate_declaration(route: &RouteMethod) -> TokenStream {
    let name = route.name.to_string();
    let method = format_ident!("{}", route.method.variant());
    let path = &route.path;
    let ok_type = &route.return_type.ok_type;
    let body = route.has_body.then(|| quote! { .with_body() });

    let params = route.args.iter().map(|arg| {
        let arg_name = arg.name.to_string();
        match &arg.default {
            Some(default) => quote! { .param_default(#arg_name, #default) },
            None => quote! { .param(#arg_name) },
        }
    });

    quote! {
        .route(
            ::cirrus::RouteDeclaration::new(#name, ::cirrus::HttpMethod::#method, #path)
                #body
                #(#params)*
                .returns::<#ok_type>()
        )?
    }
}
