//! Parsing utilities for the contract macro.

use proc_macro2::TokenStream;
use syn::parse::ParseStream;
use syn::{
    Attribute, Error, Expr, FnArg, Ident, ItemTrait, LitStr, Pat, PatType, Result, ReturnType,
    Token, TraitItem, TraitItemFn, Type,
};

/// Method-level attributes consumed by the macro.
pub const ROUTE_ATTRS: [&str; 6] = ["get", "post", "put", "delete", "patch", "route"];

/// Parameter-level attribute consumed by the macro.
pub const DEFAULT_ATTR: &str = "default";

/// Arguments passed to the #[contract] attribute.
#[derive(Debug, Default)]
pub struct ContractArgs {
    /// Accept `OPTIONS`, `HEAD` and `TRACE` routes.
    pub permissive: bool,
}

impl ContractArgs {
    pub fn parse(attr: TokenStream) -> Result<Self> {
        let mut args = Self::default();
        if attr.is_empty() {
            return Ok(args);
        }
        let parser = syn::meta::parser(|meta| {
            if meta.path.is_ident("permissive") {
                args.permissive = true;
                Ok(())
            } else {
                Err(meta.error("unsupported contract option; expected `permissive`"))
            }
        });
        syn::parse::Parser::parse2(parser, attr)?;
        Ok(args)
    }
}

/// HTTP method named by a route attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl Method {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "PATCH" => Self::Patch,
            "OPTIONS" => Self::Options,
            "HEAD" => Self::Head,
            "TRACE" => Self::Trace,
            _ => return None,
        })
    }

    /// Variant name of `cirrus::HttpMethod`.
    pub fn variant(self) -> &'static str {
        match self {
            Self::Get => "Get",
            Self::Post => "Post",
            Self::Put => "Put",
            Self::Delete => "Delete",
            Self::Patch => "Patch",
            Self::Options => "Options",
            Self::Head => "Head",
            Self::Trace => "Trace",
        }
    }

    fn forbids_body(self) -> bool {
        matches!(self, Self::Get | Self::Delete | Self::Head | Self::Trace)
    }

    fn is_extended(self) -> bool {
        matches!(self, Self::Options | Self::Head | Self::Trace)
    }
}

/// Parsed contract definition.
#[derive(Debug)]
pub struct ContractDefinition {
    /// Visibility of the trait.
    pub vis: syn::Visibility,
    /// Name of the contract trait.
    pub name: Ident,
    /// Whether extended methods are accepted.
    pub permissive: bool,
    /// Parsed routes in declaration order.
    pub routes: Vec<RouteMethod>,
    /// Original trait item (for re-emission).
    pub original: ItemTrait,
}

/// Parsed route method.
#[derive(Debug)]
pub struct RouteMethod {
    /// Method name, also the route name.
    pub name: Ident,
    /// HTTP method.
    pub method: Method,
    /// Path template literal.
    pub path: LitStr,
    /// Whether the route carries a body.
    pub has_body: bool,
    /// Method arguments (excluding self).
    pub args: Vec<RouteArg>,
    /// Return type info.
    pub return_type: ReturnTypeInfo,
    /// Doc comments, copied onto client methods.
    pub docs: Vec<Attribute>,
}

/// A route argument.
#[derive(Debug)]
pub struct RouteArg {
    /// Argument name.
    pub name: Ident,
    /// Argument type.
    pub ty: Type,
    /// Value used when callers omit the argument.
    pub default: Option<Expr>,
}

/// Information about the return type.
#[derive(Debug)]
pub struct ReturnTypeInfo {
    /// The success type (T in Result<T, E>).
    pub ok_type: Type,
    /// The error type (E in Result<T, E>).
    pub err_type: Type,
}

struct RouteAttr {
    method: Method,
    path: LitStr,
    has_body: bool,
}

impl ContractDefinition {
    /// Parse a trait into a contract definition.
    pub fn parse(args: &ContractArgs, item: ItemTrait) -> Result<Self> {
        if !item.generics.params.is_empty() {
            return Err(Error::new_spanned(
                &item.generics,
                "contract traits cannot be generic",
            ));
        }

        let mut routes: Vec<RouteMethod> = Vec::new();
        for trait_item in &item.items {
            let TraitItem::Fn(method) = trait_item else {
                return Err(Error::new_spanned(
                    trait_item,
                    "contract traits may only contain route methods",
                ));
            };
            let route = RouteMethod::parse(method, args.permissive)?;

            let shape = path_shape(&route.path.value());
            if let Some(existing) = routes
                .iter()
                .find(|r| r.method == route.method && path_shape(&r.path.value()) == shape)
            {
                return Err(Error::new_spanned(
                    &route.path,
                    format!(
                        "{} {} is already served by `{}`",
                        route.method.variant().to_ascii_uppercase(),
                        route.path.value(),
                        existing.name
                    ),
                ));
            }
            routes.push(route);
        }

        if routes.is_empty() {
            return Err(Error::new_spanned(
                &item.ident,
                "contract trait must have at least one route",
            ));
        }

        Ok(Self {
            vis: item.vis.clone(),
            name: item.ident.clone(),
            permissive: args.permissive,
            routes,
            original: item,
        })
    }
}

impl RouteMethod {
    /// Parse a trait method into a route.
    pub fn parse(method: &TraitItemFn, permissive: bool) -> Result<Self> {
        let sig = &method.sig;

        if method.default.is_some() {
            return Err(Error::new_spanned(
                sig,
                "route methods cannot have a default body",
            ));
        }
        if sig.asyncness.is_none() {
            return Err(Error::new_spanned(sig, "route methods must be async"));
        }
        if !sig.generics.params.is_empty() {
            return Err(Error::new_spanned(
                &sig.generics,
                "route methods cannot be generic",
            ));
        }
        match sig.inputs.first() {
            Some(FnArg::Receiver(recv)) if recv.reference.is_some() && recv.mutability.is_none() => {}
            _ => {
                return Err(Error::new_spanned(sig, "route methods must take &self"));
            }
        }

        let route = Self::parse_route_attr(method)?;

        if route.method.is_extended() && !permissive {
            return Err(Error::new_spanned(
                &route.path,
                "OPTIONS, HEAD and TRACE routes require #[contract(permissive)]",
            ));
        }
        if route.has_body && route.method.forbids_body() {
            return Err(Error::new_spanned(
                &route.path,
                format!(
                    "{} routes cannot declare a body",
                    route.method.variant().to_ascii_uppercase()
                ),
            ));
        }

        let args = Self::parse_args(&sig.inputs)?;

        let placeholders =
            path_placeholders(&route.path.value()).map_err(|e| Error::new_spanned(&route.path, e))?;
        for placeholder in placeholders {
            if !args.iter().any(|a| a.name == placeholder) {
                return Err(Error::new_spanned(
                    &route.path,
                    format!("path placeholder `{{{placeholder}}}` has no matching parameter"),
                ));
            }
        }

        let return_type = Self::parse_return_type(&sig.output)?;

        Ok(Self {
            name: sig.ident.clone(),
            method: route.method,
            path: route.path,
            has_body: route.has_body,
            args,
            return_type,
            docs: method
                .attrs
                .iter()
                .filter(|a| a.path().is_ident("doc"))
                .cloned()
                .collect(),
        })
    }

    fn parse_route_attr(method: &TraitItemFn) -> Result<RouteAttr> {
        let mut found: Option<RouteAttr> = None;

        for attr in &method.attrs {
            let Some(ident) = attr.path().get_ident() else {
                continue;
            };
            let fixed = match ident.to_string().as_str() {
                "get" => Some(Method::Get),
                "post" => Some(Method::Post),
                "put" => Some(Method::Put),
                "delete" => Some(Method::Delete),
                "patch" => Some(Method::Patch),
                "route" => None,
                _ => continue,
            };

            let parsed = attr.parse_args_with(|input: ParseStream| {
                let method = match fixed {
                    Some(method) => method,
                    None => {
                        let name: LitStr = input.parse()?;
                        let method = Method::from_name(&name.value())
                            .ok_or_else(|| Error::new(name.span(), "unknown HTTP method"))?;
                        input.parse::<Token![,]>()?;
                        method
                    }
                };
                let path: LitStr = input.parse()?;

                let mut has_body = false;
                if input.parse::<Option<Token![,]>>()?.is_some() && !input.is_empty() {
                    let flag: Ident = input.parse()?;
                    if flag != "body" {
                        return Err(Error::new(flag.span(), "expected `body`"));
                    }
                    has_body = true;
                    input.parse::<Option<Token![,]>>()?;
                }

                Ok(RouteAttr {
                    method,
                    path,
                    has_body,
                })
            })?;

            if found.is_some() {
                return Err(Error::new_spanned(
                    attr,
                    "route methods take exactly one route attribute",
                ));
            }
            found = Some(parsed);
        }

        found.ok_or_else(|| {
            Error::new_spanned(
                &method.sig,
                "route methods need one of #[get], #[post], #[put], #[delete], #[patch] or #[route]",
            )
        })
    }

    fn parse_args(
        inputs: &syn::punctuated::Punctuated<FnArg, syn::token::Comma>,
    ) -> Result<Vec<RouteArg>> {
        let mut args = Vec::new();

        for input in inputs.iter().skip(1) {
            if let FnArg::Typed(PatType { pat, ty, attrs, .. }) = input {
                let name = match pat.as_ref() {
                    Pat::Ident(ident) => ident.ident.clone(),
                    _ => {
                        return Err(Error::new_spanned(
                            pat,
                            "expected identifier pattern for argument",
                        ));
                    }
                };

                let default = attrs
                    .iter()
                    .find(|a| a.path().is_ident(DEFAULT_ATTR))
                    .map(|a| a.parse_args::<Expr>())
                    .transpose()?;

                args.push(RouteArg {
                    name,
                    ty: ty.as_ref().clone(),
                    default,
                });
            }
        }

        Ok(args)
    }

    fn parse_return_type(output: &ReturnType) -> Result<ReturnTypeInfo> {
        if let ReturnType::Type(_, ty) = output
            && let Type::Path(type_path) = ty.as_ref()
            && let Some(segment) = type_path.path.segments.last()
            && segment.ident == "Result"
            && let syn::PathArguments::AngleBracketed(args) = &segment.arguments
        {
            let mut types = args.args.iter().filter_map(|arg| match arg {
                syn::GenericArgument::Type(t) => Some(t.clone()),
                _ => None,
            });
            if let (Some(ok_type), Some(err_type)) = (types.next(), types.next()) {
                return Ok(ReturnTypeInfo { ok_type, err_type });
            }
        }

        Err(Error::new_spanned(
            output,
            "route methods must return Result<T, E>",
        ))
    }
}

/// Placeholder names of a path template, in order.
pub fn path_placeholders(path: &str) -> std::result::Result<Vec<String>, String> {
    if !path.starts_with('/') {
        return Err(format!("path must start with `/`: {path}"));
    }

    let mut names = Vec::new();
    let mut rest = path;
    while let Some(open) = rest.find(['{', '}']) {
        if rest.as_bytes()[open] == b'}' {
            return Err(format!("unbalanced braces in path: {path}"));
        }
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| format!("unbalanced braces in path: {path}"))?;
        let name = &after[..close];
        if name.is_empty() || name.contains('{') {
            return Err(format!("invalid placeholder in path: {path}"));
        }
        names.push(name.to_string());
        rest = &after[close + 1..];
    }
    Ok(names)
}

/// Path with placeholder names erased, e.g. `/items/{}`.
fn path_shape(path: &str) -> String {
    let mut shape = String::with_capacity(path.len());
    let mut in_placeholder = false;
    for c in path.chars() {
        match c {
            '{' => {
                in_placeholder = true;
                shape.push_str("{}");
            }
            '}' => in_placeholder = false,
            c if !in_placeholder => shape.push(c),
            _ => {}
        }
    }
    shape
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    fn parse_trait(tokens: TokenStream) -> Result<ContractDefinition> {
        let item: ItemTrait = syn::parse2(tokens)?;
        ContractDefinition::parse(&ContractArgs::default(), item)
    }

    #[test]
    fn test_parse_contract() {
        let contract = parse_trait(quote! {
            pub trait Inventory {
                /// Fetch one item.
                #[get("/items/{id}")]
                async fn get_item(&self, id: u64, #[default(false)] verbose: bool) -> Result<Item, Error>;

                #[post("/items", body)]
                async fn create_item(&self, name: String) -> Result<Item, Error>;
            }
        })
        .unwrap();

        assert_eq!(contract.name.to_string(), "Inventory");
        assert_eq!(contract.routes.len(), 2);

        let get = &contract.routes[0];
        assert_eq!(get.method, Method::Get);
        assert_eq!(get.path.value(), "/items/{id}");
        assert!(!get.has_body);
        assert_eq!(get.args.len(), 2);
        assert!(get.args[0].default.is_none());
        assert!(get.args[1].default.is_some());
        assert_eq!(get.docs.len(), 1);

        let create = &contract.routes[1];
        assert_eq!(create.method, Method::Post);
        assert!(create.has_body);
    }

    #[test]
    fn test_parse_route_attr_with_method() {
        let item: ItemTrait = syn::parse2(quote! {
            trait Probe {
                #[route("options", "/probe")]
                async fn probe(&self) -> Result<(), Error>;
            }
        })
        .unwrap();

        assert!(ContractDefinition::parse(&ContractArgs::default(), item.clone()).is_err());

        let contract =
            ContractDefinition::parse(&ContractArgs { permissive: true }, item).unwrap();
        assert_eq!(contract.routes[0].method, Method::Options);
    }

    #[test]
    fn test_body_on_get_error() {
        let result = parse_trait(quote! {
            trait Bad {
                #[get("/items", body)]
                async fn list(&self) -> Result<(), Error>;
            }
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_unbound_placeholder_error() {
        let result = parse_trait(quote! {
            trait Bad {
                #[delete("/items/{id}")]
                async fn remove(&self, key: u64) -> Result<(), Error>;
            }
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_route_error() {
        let result = parse_trait(quote! {
            trait Bad {
                #[get("/items/{id}")]
                async fn one(&self, id: u64) -> Result<(), Error>;
                #[get("/items/{key}")]
                async fn two(&self, key: u64) -> Result<(), Error>;
            }
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_non_async_method_error() {
        let result = parse_trait(quote! {
            trait Bad {
                #[get("/sync")]
                fn sync_method(&self) -> Result<(), Error>;
            }
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_no_result_return_error() {
        let result = parse_trait(quote! {
            trait Bad {
                #[get("/text")]
                async fn no_result(&self) -> String;
            }
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_route_attr_error() {
        let result = parse_trait(quote! {
            trait Bad {
                async fn bare(&self) -> Result<(), Error>;
            }
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_contract_args() {
        assert!(!ContractArgs::parse(TokenStream::new()).unwrap().permissive);
        assert!(ContractArgs::parse(quote!(permissive)).unwrap().permissive);
        assert!(ContractArgs::parse(quote!(strict)).is_err());
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(
            path_placeholders("/users/{user}/orders/{id}").unwrap(),
            ["user", "id"]
        );
        assert!(path_placeholders("items").is_err());
        assert!(path_placeholders("/items/{id").is_err());
        assert!(path_placeholders("/items/id}").is_err());
        assert_eq!(path_shape("/users/{user}/orders"), "/users/{}/orders");
    }
}
