//! Request preparation and response handling shared by both client variants.

use std::time::Duration;

use cirrus_codec::json::parse_body;
use cirrus_codec::text::value_to_text;
use cirrus_core::{
    Arguments, CirrusError, Context, HttpMethod, RouteDescriptor, TransportError, Value,
};
use cirrus_middleware::InterceptorChain;

use crate::config::ClientConfig;

/// A call turned into HTTP terms, before any interceptor runs.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Resolved path, escaped, relative to the base URL.
    pub path: String,
    /// Query parameters, for routes without a body.
    pub query: Vec<(String, String)>,
    /// JSON object body, for routes with a body.
    pub body: Option<Value>,
}

impl PreparedRequest {
    /// Resolve the path and place every other bound parameter.
    ///
    /// Parameters not used by the path become query parameters when the route
    /// has no body (`null` values are left out), or fields of one JSON object
    /// body when it does.
    pub fn prepare(route: &RouteDescriptor, args: &Arguments) -> Result<Self, CirrusError> {
        let path = route.path().resolve(route.name(), args)?;
        let extras = route
            .extra_params()
            .filter_map(|param| args.get(param.name()).map(|value| (param.name(), value)));

        let (query, body) = if route.has_body() {
            let fields = extras
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect();
            (Vec::new(), Some(Value::Object(fields)))
        } else {
            let query = extras
                .filter(|(_, value)| !value.is_null())
                .map(|(name, value)| (name.to_string(), value_to_text(value).into_owned()))
                .collect();
            (query, None)
        };

        Ok(Self {
            method: route.method(),
            path,
            query,
            body,
        })
    }
}

/// Settings and interceptors behind every stub of one client.
pub(crate) struct Endpoint {
    base_url: String,
    timeout: Option<Duration>,
    headers: Vec<(String, String)>,
    interceptors: InterceptorChain,
}

impl Endpoint {
    pub(crate) fn new(
        config: ClientConfig,
        interceptors: InterceptorChain,
    ) -> Result<Self, TransportError> {
        Ok(Self {
            base_url: config.normalized_base_url()?,
            timeout: config.timeout,
            headers: config.headers,
            interceptors,
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fresh context for one call.
    pub(crate) fn context(&self) -> Context {
        let ctx = Context::new();
        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = self.timeout {
            return ctx.with_timeout(timeout);
        }
        ctx
    }

    /// Prepare the request and let interceptors adjust the context.
    pub(crate) fn begin(
        &self,
        ctx: &mut Context,
        route: &RouteDescriptor,
        args: &Arguments,
    ) -> Result<PreparedRequest, CirrusError> {
        let request = PreparedRequest::prepare(route, args)?;
        self.interceptors.intercept_request(ctx, route)?;
        tracing::debug!(
            route = route.name(),
            method = %request.method,
            path = %request.path,
            request_id = ctx.request_id,
            "sending request"
        );
        Ok(request)
    }

    pub(crate) fn url(&self, request: &PreparedRequest) -> String {
        format!("{}{}", self.base_url, request.path)
    }

    /// Configured headers followed by context metadata.
    pub(crate) fn headers<'a>(
        &'a self,
        ctx: &'a Context,
    ) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(ctx.headers())
    }

    /// Check the status, parse the body and run response interceptors.
    pub(crate) fn complete(
        &self,
        ctx: &Context,
        route: &RouteDescriptor,
        status: u16,
        body: &[u8],
    ) -> Result<Value, CirrusError> {
        if !(200..300).contains(&status) {
            return Err(CirrusError::RemoteCallFailure {
                status,
                body: String::from_utf8_lossy(body).into_owned(),
            });
        }

        let value = parse_body(body)?;
        let mut value = route.response().conform(value)?;
        self.interceptors.intercept_response(ctx, route, &mut value)?;
        Ok(value)
    }

    /// Log a failed call and notify interceptors.
    pub(crate) fn fail(
        &self,
        ctx: &Context,
        route: &RouteDescriptor,
        error: CirrusError,
    ) -> CirrusError {
        tracing::warn!(
            route = route.name(),
            status = error.status(),
            request_id = ctx.request_id,
            error = %error,
            "remote call failed"
        );
        self.interceptors.on_error(ctx, route, &error);
        error
    }

    pub(crate) fn transport_error(&self, error: &reqwest::Error) -> CirrusError {
        let error = if error.is_timeout() {
            TransportError::Timeout(self.timeout.unwrap_or_default())
        } else {
            TransportError::Request(error.to_string())
        };
        error.into()
    }
}

pub(crate) fn to_reqwest(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Options => reqwest::Method::OPTIONS,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Trace => reqwest::Method::TRACE,
    }
}
