use axum::http::HeaderMap;

/// Header names the hosting platform attaches to invocations.
pub mod headers {
    /// Conversation session identifier.
    pub const SESSION_ID: &str = "x-amzn-bedrock-agentcore-runtime-session-id";
    /// Caller identity forwarded by the platform.
    pub const USER_ID: &str = "x-amzn-bedrock-agentcore-runtime-user-id";
    /// Credentials presented by the caller.
    pub const AUTHORIZATION: &str = "authorization";
    /// Platform request identifier.
    pub const REQUEST_ID: &str = "x-amzn-requestid";
    /// Distributed tracing header.
    pub const TRACE_ID: &str = "x-amzn-trace-id";
    /// Token for calling downstream services on the caller's behalf.
    pub const WORKLOAD_ACCESS_TOKEN: &str = "workloadaccesstoken";
    /// Runtime-scoped spelling of the workload access token header.
    pub const RUNTIME_WORKLOAD_ACCESS_TOKEN: &str =
        "x-amzn-bedrock-agentcore-runtime-workload-accesstoken";
    /// Guest authentication assertion.
    pub const GUEST_AUTH: &str = "x-aws-guest-auth";
    /// W3C trace-context baggage.
    pub const BAGGAGE: &str = "baggage";
    /// Address of the platform proxy in front of the runtime.
    pub const PROXY_IP: &str = "x-aws-proxy-ip";
    /// Port of the platform proxy in front of the runtime.
    pub const PROXY_PORT: &str = "x-aws-proxy-port";
    /// Prefix of caller-defined headers relayed by the platform.
    pub const CUSTOM_HEADER_PREFIX: &str = "x-amzn-bedrock-agentcore-runtime-custom-";
}

/// Read-only view of the request headers passed to handlers.
///
/// Lookups are case-insensitive and return the first value of a repeated
/// header. Values that are not visible ASCII are treated as absent.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    headers: HeaderMap,
}

impl InvocationContext {
    /// Builds a context over the request headers.
    #[must_use]
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    /// The full header map.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of the header called `name`.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Session identifier supplied by the platform.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.header(headers::SESSION_ID)
    }

    /// Caller identity supplied by the platform.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.header(headers::USER_ID)
    }

    /// The `Authorization` header.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.header(headers::AUTHORIZATION)
    }

    /// Platform request identifier.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header(headers::REQUEST_ID)
    }

    /// Tracing header.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.header(headers::TRACE_ID)
    }

    /// Workload access token, under either of its header names.
    #[must_use]
    pub fn workload_access_token(&self) -> Option<&str> {
        self.header(headers::WORKLOAD_ACCESS_TOKEN)
            .or_else(|| self.header(headers::RUNTIME_WORKLOAD_ACCESS_TOKEN))
    }

    /// Guest authentication assertion.
    #[must_use]
    pub fn guest_auth(&self) -> Option<&str> {
        self.header(headers::GUEST_AUTH)
    }

    /// Trace-context baggage.
    #[must_use]
    pub fn baggage(&self) -> Option<&str> {
        self.header(headers::BAGGAGE)
    }

    /// Address of the platform proxy, when the request came through one.
    #[must_use]
    pub fn proxy_ip(&self) -> Option<&str> {
        self.header(headers::PROXY_IP)
    }

    /// Port of the platform proxy; absent when missing or not a port number.
    #[must_use]
    pub fn proxy_port(&self) -> Option<u16> {
        self.header(headers::PROXY_PORT)?.trim().parse().ok()
    }

    /// Caller-defined headers with the platform prefix stripped from the name.
    pub fn custom_headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().filter_map(|(name, value)| {
            let suffix = name.as_str().strip_prefix(headers::CUSTOM_HEADER_PREFIX)?;
            Some((suffix, value.to_str().ok()?))
        })
    }
}
