//! Generate typed clients.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::parse::{ContractDefinition, RouteMethod};

/// Generate the client constructors on the contract struct.
pub fn generate_constructors(contract: &ContractDefinition) -> TokenStream {
    let client_name = format_ident!("{}Client", contract.name);
    let blocking_name = format_ident!("{}BlockingClient", contract.name);

    quote! {
        /// Suspending client for the service at `config.base_url`.
        pub fn client(
            config: ::cirrus::ClientConfig,
        ) -> ::std::result::Result<#client_name, ::cirrus::CirrusError> {
            Self::client_with(config, ::cirrus::InterceptorChain::new())
        }

        /// Suspending client whose calls pass through `interceptors`.
        pub fn client_with(
            config: ::cirrus::ClientConfig,
            interceptors: ::cirrus::InterceptorChain,
        ) -> ::std::result::Result<#client_name, ::cirrus::CirrusError> {
            let definition = Self::definition()?;
            let inner = ::cirrus::make_client_with(&definition, config, interceptors)?;
            Ok(#client_name { inner })
        }

        /// Blocking client for the service at `config.base_url`.
        #[cfg(not(target_arch = "wasm32"))]
        pub fn blocking_client(
            config: ::cirrus::ClientConfig,
        ) -> ::std::result::Result<#blocking_name, ::cirrus::CirrusError> {
            Self::blocking_client_with(config, ::cirrus::InterceptorChain::new())
        }

        /// Blocking client whose calls pass through `interceptors`.
        #[cfg(not(target_arch = "wasm32"))]
        pub fn blocking_client_with(
            config: ::cirrus::ClientConfig,
            interceptors: ::cirrus::InterceptorChain,
        ) -> ::std::result::Result<#blocking_name, ::cirrus::CirrusError> {
            let definition = Self::definition()?;
            let inner = ::cirrus::make_blocking_client_with(&definition, config, interceptors)?;
            Ok(#blocking_name { inner })
        }
    }
}

/// Generate the typed suspending and blocking client structs.
pub fn generate_clients(contract: &ContractDefinition) -> TokenStream {
    let vis = &contract.vis;
    let trait_name = &contract.name;
    let client_name = format_ident!("{}Client", contract.name);
    let blocking_name = format_ident!("{}BlockingClient", contract.name);
    let client_doc = format!("Typed suspending client for [`{trait_name}`].");
    let blocking_doc = format!(
        "Typed blocking client for [`{trait_name}`].\n\nCalls must not be made from inside an async runtime."
    );

    let async_methods = contract
        .routes
        .iter()
        .map(|route| generate_method(route, true));
    let blocking_methods = contract
        .routes
        .iter()
        .map(|route| generate_method(route, false));

    quote! {
        #[doc = #client_doc]
        #[derive(Debug)]
        #vis struct #client_name {
            inner: ::cirrus::Implementation<::cirrus::AsyncHandler>,
        }

        impl #client_name {
            /// Untyped implementation behind this client.
            pub fn implementation(&self) -> &::cirrus::Implementation<::cirrus::AsyncHandler> {
                &self.inner
            }

            #(#async_methods)*
        }

        #[doc = #blocking_doc]
        #[cfg(not(target_arch = "wasm32"))]
        #[derive(Debug)]
        #vis struct #blocking_name {
            inner: ::cirrus::Implementation<::cirrus::BlockingHandler>,
        }

        #[cfg(not(target_arch = "wasm32"))]
        impl #blocking_name {
            /// Untyped implementation behind this client.
            pub fn implementation(&self) -> &::cirrus::Implementation<::cirrus::BlockingHandler> {
                &self.inner
            }

            #(#blocking_methods)*
        }
    }
}

fn generate_method(route: &RouteMethod, suspending: bool) -> TokenStream {
    let method_name = &route.name;
    let route_name = route.name.to_string();
    let docs = &route.docs;
    let ok_type = &route.return_type.ok_type;

    let params = route.args.iter().map(|arg| {
        let name = &arg.name;
        let ty = &arg.ty;
        quote! { #name: #ty }
    });
    let encodes = route.args.iter().map(|arg| {
        let name = &arg.name;
        let key = name.to_string();
        quote! { .encode_kwarg(#key, &#name)? }
    });

    let (asyncness, call) = if suspending {
        (
            quote! { async },
            quote! { self.inner.call(#route_name, args).await? },
        )
    } else {
        (quote! {}, quote! { self.inner.call(#route_name, args)? })
    };

    quote! {
        #(#docs)*
        pub #asyncness fn #method_name(
            &self,
            #(#params),*
        ) -> ::std::result::Result<#ok_type, ::cirrus::CirrusError> {
            let args = ::cirrus::CallArgs::new()#(#encodes)*;
            let value = #call;
            ::cirrus::decode_value(value)
        }
    }
}
