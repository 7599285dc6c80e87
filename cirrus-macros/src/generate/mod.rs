//! Code generation for the contract macro.

mod client;
mod definition;
mod server;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{FnArg, ItemTrait, Result, ReturnType, TraitItem};

use crate::parse::{ContractArgs, ContractDefinition, DEFAULT_ATTR, ROUTE_ATTRS};

/// Generate all code for a contract trait.
pub fn generate_contract(args: ContractArgs, item: ItemTrait) -> Result<TokenStream> {
    let contract = ContractDefinition::parse(&args, item)?;

    let original_trait = generate_trait(&contract);
    let definition = definition::generate_definition(&contract);
    let server = server::generate_server(&contract);
    let constructors = client::generate_constructors(&contract);
    let clients = client::generate_clients(&contract);

    let vis = &contract.vis;
    let trait_name = &contract.name;
    let contract_name = format_ident!("{}Contract", contract.name);
    let doc =
        format!("Registry entry, server adapter and client constructors for [`{trait_name}`].");

    Ok(quote! {
        #original_trait

        #[doc = #doc]
        #[derive(Debug, Clone, Copy)]
        #vis struct #contract_name;

        impl #contract_name {
            #definition
            #server
            #constructors
        }

        #clients
    })
}

/// Re-emit the trait with route attributes removed and `Send` futures.
fn generate_trait(contract: &ContractDefinition) -> TokenStream {
    let vis = &contract.vis;
    let name = &contract.name;
    let attrs = &contract.original.attrs;

    let items = contract.original.items.iter().filter_map(|item| {
        let TraitItem::Fn(method) = item else {
            return None;
        };
        let attrs = method.attrs.iter().filter(|attr| {
            !ROUTE_ATTRS.iter().any(|route| attr.path().is_ident(route))
        });

        let mut sig = method.sig.clone();
        sig.asyncness = None;
        for input in &mut sig.inputs {
            if let FnArg::Typed(arg) = input {
                arg.attrs.retain(|attr| !attr.path().is_ident(DEFAULT_ATTR));
            }
        }
        let output = match &sig.output {
            ReturnType::Type(_, ty) => quote! { #ty },
            ReturnType::Default => quote! { () },
        };
        sig.output = syn::parse_quote! {
            -> impl ::std::future::Future<Output = #output> + ::std::marker::Send
        };

        Some(quote! {
            #(#attrs)*
            #sig;
        })
    });

    quote! {
        #(#attrs)*
        #vis trait #name: ::std::marker::Send + ::std::marker::Sync {
            #(#items)*
        }
    }
}
