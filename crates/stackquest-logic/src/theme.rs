//! Collectible theme catalog.
//!
//! A theme is a named, ordered set of collectible tokens with display labels,
//! plus flags for whether gates are generated and whether out-of-order
//! collection counts as a handshake violation. The catalog is closed and
//! statically known; adding a theme is adding one entry here.

use serde::{Deserialize, Serialize};

/// The closed set of collectible themes a challenge config may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectibleTheme {
    /// TCP three-way handshake: SYN → SYN-ACK → ACK. Gated, strict order.
    Tcp,
    /// HTTP request lifecycle: request → response → render. Ungated.
    Http,
    /// Login flow: credentials → token → session. Gated, strict order.
    Auth,
    /// Request routing pipeline: route → handler → response. Ungated.
    Api,
    /// No collectibles, no gates.
    #[default]
    None,
}

/// One token in a theme's required order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpec {
    pub id: &'static str,
    /// Teaching text shown when the token is collected.
    pub label: &'static str,
}

/// Static definition of a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeSpec {
    /// Tokens in required collection order.
    pub tokens: &'static [TokenSpec],
    /// Whether the generator places a gate per token.
    pub gated: bool,
    /// Whether out-of-order collection is reported as a violation.
    pub handshake: bool,
}

const TCP_TOKENS: &[TokenSpec] = &[
    TokenSpec {
        id: "SYN",
        label: "SYN — the client asks the server to open a connection",
    },
    TokenSpec {
        id: "SYN-ACK",
        label: "SYN-ACK — the server acknowledges and answers back",
    },
    TokenSpec {
        id: "ACK",
        label: "ACK — the client confirms; the connection is established",
    },
];

const HTTP_TOKENS: &[TokenSpec] = &[
    TokenSpec {
        id: "REQUEST",
        label: "Request — the browser asks the server for a resource",
    },
    TokenSpec {
        id: "RESPONSE",
        label: "Response — the server answers with a status and body",
    },
    TokenSpec {
        id: "RENDER",
        label: "Render — the browser paints the document on screen",
    },
];

const AUTH_TOKENS: &[TokenSpec] = &[
    TokenSpec {
        id: "CREDENTIALS",
        label: "Credentials — the user proves who they are",
    },
    TokenSpec {
        id: "TOKEN",
        label: "Token — the server issues signed proof of identity",
    },
    TokenSpec {
        id: "SESSION",
        label: "Session — every request now carries the token",
    },
];

const API_TOKENS: &[TokenSpec] = &[
    TokenSpec {
        id: "ROUTE",
        label: "Route — the request is matched to an endpoint",
    },
    TokenSpec {
        id: "HANDLER",
        label: "Handler — server code runs for the matched route",
    },
    TokenSpec {
        id: "RESPONSE",
        label: "Response — the handler's result is serialized back",
    },
];

const TCP_SPEC: ThemeSpec = ThemeSpec {
    tokens: TCP_TOKENS,
    gated: true,
    handshake: true,
};
const HTTP_SPEC: ThemeSpec = ThemeSpec {
    tokens: HTTP_TOKENS,
    gated: false,
    handshake: false,
};
const AUTH_SPEC: ThemeSpec = ThemeSpec {
    tokens: AUTH_TOKENS,
    gated: true,
    handshake: true,
};
const API_SPEC: ThemeSpec = ThemeSpec {
    tokens: API_TOKENS,
    gated: false,
    handshake: false,
};
const NONE_SPEC: ThemeSpec = ThemeSpec {
    tokens: &[],
    gated: false,
    handshake: false,
};

impl CollectibleTheme {
    /// Parse a challenge-config theme string. Unknown values fall back to
    /// `None` rather than erroring; a bad theme is a config defect, not a
    /// runtime failure.
    pub fn parse(value: &str) -> Self {
        match value {
            "tcp" => Self::Tcp,
            "http" => Self::Http,
            "auth" => Self::Auth,
            "api" => Self::Api,
            _ => Self::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Http => "http",
            Self::Auth => "auth",
            Self::Api => "api",
            Self::None => "none",
        }
    }

    pub fn spec(&self) -> &'static ThemeSpec {
        match self {
            Self::Tcp => &TCP_SPEC,
            Self::Http => &HTTP_SPEC,
            Self::Auth => &AUTH_SPEC,
            Self::Api => &API_SPEC,
            Self::None => &NONE_SPEC,
        }
    }
}
