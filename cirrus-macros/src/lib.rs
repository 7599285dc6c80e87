//! # cirrus-macros
//!
//! Proc macros for the Cirrus HTTP contract framework.
//!
//! This crate provides the `#[contract]` attribute macro, which turns a trait
//! into a Cirrus contract: one declaration from which the route registry, a
//! server adapter and typed clients are all derived.
//!
//! ## Generated Items
//!
//! For a trait named `Inventory`, the macro generates:
//! - `Inventory` - the trait itself, with route attributes removed
//! - `InventoryContract` - definition, server and client constructors
//! - `InventoryClient` - typed suspending client
//! - `InventoryBlockingClient` - typed blocking client (native targets only)

mod generate;
mod parse;

use proc_macro::TokenStream;
use syn::{ItemTrait, parse_macro_input};

/// Declare an HTTP contract from a trait.
///
/// ## Usage
///
/// Every method must be `async`, take `&self`, return `Result<T, E>` and
/// carry exactly one route attribute:
///
/// - `#[get("/path")]`, `#[delete("/path")]`
/// - `#[post("/path", body)]`, `#[put("/path", body)]`, `#[patch("/path", body)]`
///   (`body` is optional)
/// - `#[route("OPTIONS", "/path")]` for any method; `OPTIONS`, `HEAD` and
///   `TRACE` require `#[contract(permissive)]`
///
/// Path placeholders such as `{id}` must name a parameter. Parameters may
/// carry `#[default(expr)]`, where `expr` converts into a JSON value.
///
/// `T` must be serializable and deserializable, and `E` must convert into
/// `cirrus::CirrusError`.
///
/// ## Example
///
/// ```rust,ignore
/// #[cirrus::contract]
/// pub trait Inventory {
///     #[get("/items/{id}")]
///     async fn get_item(&self, id: u64, #[default(false)] verbose: bool) -> Result<Item, CirrusError>;
///
///     #[post("/items", body)]
///     async fn create_item(&self, name: String) -> Result<Item, CirrusError>;
/// }
/// ```
#[proc_macro_attribute]
pub fn contract(attr: TokenStream, input: TokenStream) -> TokenStream {
    let args = match parse::ContractArgs::parse(attr.into()) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };
    let item = parse_macro_input!(input as ItemTrait);

    match generate::generate_contract(args, item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
