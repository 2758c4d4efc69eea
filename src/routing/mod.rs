//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request URI (path, query)
//!     → resolver.rs (strategy-specific path extraction)
//!     → Return: ResolvedPath or MissingPath
//!
//! Resolver construction (at startup):
//!     PathConfig → PathStrategy + prefix + query parameter
//!     → Freeze as immutable PathResolver
//! ```
//!
//! # Design Decisions
//! - Resolver built at startup, immutable at runtime
//! - Deterministic: same URI always resolves to the same target
//! - No regex in hot path (prefix stripping only)

pub mod resolver;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use resolver::{PathResolver, ResolvedPath};

/// How the backend-relative path is carried on the inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStrategy {
    /// Catch-all segments below the routing prefix.
    #[default]
    Parameter,
    /// A single query parameter, possibly repeated.
    Query,
    /// Whatever follows the routing prefix, verbatim.
    Residual,
}

impl FromStr for PathStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parameter" => Ok(Self::Parameter),
            "query" => Ok(Self::Query),
            "residual" => Ok(Self::Residual),
            other => Err(format!(
                "unknown path strategy '{}' (expected parameter, query or residual)",
                other
            )),
        }
    }
}

impl std::fmt::Display for PathStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Parameter => "parameter",
            Self::Query => "query",
            Self::Residual => "residual",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("Query".parse::<PathStrategy>().unwrap(), PathStrategy::Query);
        assert_eq!(" residual ".parse::<PathStrategy>().unwrap(), PathStrategy::Residual);
        assert!("catchall".parse::<PathStrategy>().is_err());
    }
}
