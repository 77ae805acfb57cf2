//! Proxy route kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three ways the player reaches the CMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// SOAP/XML procedure calls relayed to `xmds.php`
    ProcedureCall,
    /// Generic HTTP/JSON API calls
    RestCall,
    /// Media and layout downloads, range-capable
    FileDownload,
}

impl RouteKind {
    /// Short code used as the `error` field of 500 responses.
    pub const fn error_code(self) -> &'static str {
        match self {
            Self::ProcedureCall => "Proxy error",
            Self::RestCall => "REST proxy error",
            Self::FileDownload => "File proxy error",
        }
    }

    /// Local path the route is mounted on.
    pub const fn mount_path(self) -> &'static str {
        match self {
            Self::ProcedureCall => "/xmds-proxy",
            Self::RestCall => "/rest-proxy",
            Self::FileDownload => "/file-proxy",
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProcedureCall => write!(f, "xmds"),
            Self::RestCall => write!(f, "rest"),
            Self::FileDownload => write!(f, "file"),
        }
    }
}
