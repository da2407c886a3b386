use std::fmt;

/// Path of the business invocation route.
pub const INVOCATIONS_PATH: &str = "/invocations";

/// Path of the readiness route.
pub const PING_PATH: &str = "/ping";

/// Routes exposed by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `POST /invocations`.
    Invocations,
    /// `GET /ping`.
    Ping,
}

impl Route {
    /// URL path served by the route.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Invocations => INVOCATIONS_PATH,
            Self::Ping => PING_PATH,
        }
    }

    /// Maps a request path onto a known route.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            INVOCATIONS_PATH => Some(Self::Invocations),
            PING_PATH => Some(Self::Ping),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.path())
    }
}
