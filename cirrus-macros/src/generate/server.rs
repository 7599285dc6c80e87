//! Generate the server adapter.

use proc_macro2::TokenStream;
use quote::quote;

use crate::parse::{ContractDefinition, RouteMethod};

/// Generate `server()`, which binds a service to the contract's routes.
pub fn generate_server(contract: &ContractDefinition) -> TokenStream {
    let trait_name = &contract.name;
    let server_name = format!("{}Server", contract.name);
    let handlers = contract.routes.iter().map(generate_handler);

    quote! {
        /// Bind `service` to every route of the contract.
        ///
        /// The result can be mounted with `cirrus::make_server_router`.
        pub fn server<S>(
            service: S,
        ) -> ::std::result::Result<
            ::cirrus::Implementation<::cirrus::AsyncHandler>,
            ::cirrus::ContractError,
        >
        where
            S: #trait_name + 'static,
        {
            let service = ::std::sync::Arc::new(service);
            let implementation = ::cirrus::Implementation::builder(#server_name, Self::definition()?)
                #(#handlers)*
                .build();
            ::cirrus::require_implementation(&implementation)?;
            Ok(implementation)
        }
    }
}

fn generate_handler(route: &RouteMethod) -> TokenStream {
    let method_name = &route.name;
    let route_name = route.name.to_string();

    let decodes = route.args.iter().map(|arg| {
        let name = &arg.name;
        let key = name.to_string();
        let ty = &arg.ty;
        quote! { let #name: #ty = __cirrus_args.decode(#key)?; }
    });
    let names = route.args.iter().map(|arg| &arg.name);

    quote! {
        .route(#route_name, {
            let __cirrus_service = service.clone();
            ::cirrus::AsyncHandler::new(move |__cirrus_args: ::cirrus::Arguments| {
                let __cirrus_service = __cirrus_service.clone();
                async move {
                    #(#decodes)*
                    let __cirrus_output = __cirrus_service
                        .#method_name(#(#names),*)
                        .await
                        .map_err(::std::convert::Into::<::cirrus::CirrusError>::into)?;
                    ::cirrus::encode_value(&__cirrus_output)
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ContractArgs;

    #[test]
    fn test_generate_handlers() {
        let item: syn::ItemTrait = syn::parse_quote! {
            trait Calculator {
                #[get("/add/{a}/{b}")]
                async fn add(&self, a: i32, b: i32) -> Result<i32, E>;
                #[get("/zero")]
                async fn zero(&self) -> Result<i32, E>;
            }
        };
        let contract = ContractDefinition::parse(&ContractArgs::default(), item).unwrap();
        let rendered = generate_server(&contract).to_string();

        assert!(rendered.contains("\"CalculatorServer\""));
        assert!(rendered.contains("let a : i32 = __cirrus_args . decode (\"a\") ?"));
        assert!(rendered.contains(". add (a , b)"));
        assert!(rendered.contains(". zero ()"));
        assert!(rendered.contains("require_implementation"));
    }
}
