//! Development server settings.

use serde::{Deserialize, Serialize};

use crate::context::BuildContext;

/// Path pattern matching every request.
pub const PROXY_ALL: &str = "**";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevServerDescriptor {
    pub host: String,
    pub port: u16,
    /// Requests under this prefix are answered from the in-memory bundle
    pub public_path: String,
    pub proxy: ProxyRule,
    /// Hot module replacement
    pub hot: bool,
    pub overlay: OverlayOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRule {
    pub context: String,
    pub target: String,
}

/// Build problems shown over the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayOptions {
    pub errors: bool,
    pub warnings: bool,
}

impl DevServerDescriptor {
    pub fn for_context(ctx: &BuildContext) -> Self {
        Self {
            host: "localhost".to_string(),
            port: ctx.layout.dev_server_port,
            public_path: ctx.layout.public_path.clone(),
            proxy: ProxyRule {
                context: PROXY_ALL.to_string(),
                target: format!("http://localhost:{}", ctx.port),
            },
            hot: true,
            overlay: OverlayOptions {
                errors: true,
                warnings: true,
            },
        }
    }

    pub fn proxy_target(&self) -> &str {
        &self.proxy.target
    }

    /// Whether a request goes to the backend instead of the bundle.
    pub fn forwards(&self, request_path: &str) -> bool {
        !request_path.starts_with(&self.public_path)
    }
}
