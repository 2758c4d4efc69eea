//! Backend-relative path resolution.
//!
//! # Responsibilities
//! - Extract the backend-relative path from the inbound URI
//! - Carry the inbound query string to the target URL untouched
//! - Reject requests with no usable path before anything is sent
//!
//! # Design Decisions
//! - One resolver, three addressing strategies picked at startup
//! - Segment order is preserved; nothing is re-encoded
//! - An empty path is a missing path, never the backend root
//! - Dot segments are refused in every spelling the outbound URL parser
//!   would resolve, so the path always stays below the origin

use axum::http::Uri;
use url::form_urlencoded;

use crate::relay::error::RelayError;
use crate::routing::PathStrategy;

/// Backend-relative path plus the query string to forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Path without a leading slash, e.g. `api/users/42`.
    pub path: String,
    /// Raw query string, without the `?`.
    pub query: Option<String>,
}

impl ResolvedPath {
    /// Target URL below `origin`. A trailing slash on the origin is ignored.
    pub fn target_url(&self, origin: &str) -> String {
        let mut url = format!("{}/{}", origin.trim_end_matches('/'), self.path);
        if let Some(query) = &self.query {
            url.push('?');
            url.push_str(query);
        }
        url
    }
}

/// Resolves inbound URIs according to the configured strategy.
#[derive(Debug, Clone)]
pub struct PathResolver {
    strategy: PathStrategy,
    prefix: String,
    query_param: String,
}

impl PathResolver {
    pub fn new(strategy: PathStrategy, prefix: impl Into<String>, query_param: impl Into<String>) -> Self {
        Self {
            strategy,
            prefix: prefix.into(),
            query_param: query_param.into(),
        }
    }

    pub fn resolve(&self, uri: &Uri) -> Result<ResolvedPath, RelayError> {
        let resolved = match self.strategy {
            PathStrategy::Parameter => self.from_segments(uri),
            PathStrategy::Query => self.from_query(uri),
            PathStrategy::Residual => self.from_residual(uri),
        };

        match resolved {
            Some(r) if r.path.is_empty() => Err(RelayError::MissingPath),
            Some(r) if r.path.split(['/', '\\']).any(is_dot_segment) => Err(RelayError::InvalidPath),
            Some(r) => Ok(r),
            None => Err(RelayError::MissingPath),
        }
    }

    /// Path below the routing prefix, or `None` if the prefix does not match.
    fn below_prefix<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.prefix.is_empty() {
            return Some(path);
        }
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() || rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }

    fn from_segments(&self, uri: &Uri) -> Option<ResolvedPath> {
        let rest = self.below_prefix(uri.path())?;
        let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        Some(ResolvedPath {
            path: segments.join("/"),
            query: non_empty(uri.query()),
        })
    }

    fn from_residual(&self, uri: &Uri) -> Option<ResolvedPath> {
        let rest = self.below_prefix(uri.path())?;
        Some(ResolvedPath {
            path: rest.trim_start_matches('/').to_string(),
            query: non_empty(uri.query()),
        })
    }

    /// Only the prefix itself accepts `?path=`; anything below it is unrouted.
    fn from_query(&self, uri: &Uri) -> Option<ResolvedPath> {
        let rest = self.below_prefix(uri.path())?;
        if !rest.trim_matches('/').is_empty() {
            return None;
        }
        let query = uri.query()?;
        let mut values = Vec::new();
        let mut kept = Vec::new();

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let decoded = form_urlencoded::parse(pair.as_bytes()).next();
            match decoded {
                Some((key, value)) if key == self.query_param.as_str() => {
                    let value = value.trim_matches('/').to_string();
                    if !value.is_empty() {
                        values.push(value);
                    }
                }
                _ => kept.push(pair),
            }
        }

        if values.is_empty() {
            return None;
        }

        Some(ResolvedPath {
            path: values.join("/"),
            query: non_empty(Some(&kept.join("&"))),
        })
    }
}

/// `.` or `..`, literal or percent-encoded in any case.
fn is_dot_segment(segment: &str) -> bool {
    let segment = segment.to_ascii_lowercase().replace("%2e", ".");
    segment == "." || segment == ".."
}

fn non_empty(query: Option<&str>) -> Option<String> {
    query.filter(|q| !q.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    fn resolver(strategy: PathStrategy) -> PathResolver {
        PathResolver::new(strategy, "/api/proxy", "path")
    }

    #[test]
    fn test_parameter_joins_segments_in_order() {
        let r = resolver(PathStrategy::Parameter)
            .resolve(&uri("/api/proxy/a/b/c?x=1"))
            .unwrap();
        assert_eq!(r.path, "a/b/c");
        assert_eq!(r.query.as_deref(), Some("x=1"));
        assert_eq!(r.target_url("https://backend.internal"), "https://backend.internal/a/b/c?x=1");
    }

    #[test]
    fn test_parameter_drops_empty_segments() {
        let r = resolver(PathStrategy::Parameter)
            .resolve(&uri("/api/proxy//users//42/"))
            .unwrap();
        assert_eq!(r.path, "users/42");
        assert_eq!(r.query, None);
    }

    #[test]
    fn test_parameter_keeps_duplicate_segments() {
        let r = resolver(PathStrategy::Parameter)
            .resolve(&uri("/api/proxy/b/a/b"))
            .unwrap();
        assert_eq!(r.path, "b/a/b");
    }

    #[test]
    fn test_empty_path_is_missing() {
        for strategy in [PathStrategy::Parameter, PathStrategy::Residual] {
            let resolver = resolver(strategy);
            assert!(matches!(resolver.resolve(&uri("/api/proxy")), Err(RelayError::MissingPath)));
            assert!(matches!(resolver.resolve(&uri("/api/proxy/")), Err(RelayError::MissingPath)));
            assert!(matches!(resolver.resolve(&uri("/api/proxy?x=1")), Err(RelayError::MissingPath)));
        }
    }

    #[test]
    fn test_prefix_must_match_whole_segment() {
        let resolver = resolver(PathStrategy::Residual);
        assert!(matches!(resolver.resolve(&uri("/api/proxyfoo/a")), Err(RelayError::MissingPath)));
        assert!(matches!(resolver.resolve(&uri("/other/a")), Err(RelayError::MissingPath)));
    }

    #[test]
    fn test_residual_is_verbatim() {
        let r = resolver(PathStrategy::Residual)
            .resolve(&uri("/api/proxy/api/users/%C3%A9t%C3%A9?sort=desc&page=2"))
            .unwrap();
        assert_eq!(r.path, "api/users/%C3%A9t%C3%A9");
        assert_eq!(r.query.as_deref(), Some("sort=desc&page=2"));
    }

    #[test]
    fn test_empty_prefix_takes_whole_path() {
        let r = PathResolver::new(PathStrategy::Residual, "", "path")
            .resolve(&uri("/users/me"))
            .unwrap();
        assert_eq!(r.path, "users/me");
    }

    #[test]
    fn test_query_single_value() {
        let r = resolver(PathStrategy::Query)
            .resolve(&uri("/api/proxy?path=api%2Fmeetings%2F7&expand=true"))
            .unwrap();
        assert_eq!(r.path, "api/meetings/7");
        assert_eq!(r.query.as_deref(), Some("expand=true"));
    }

    #[test]
    fn test_query_repeated_values_form_array() {
        let r = resolver(PathStrategy::Query)
            .resolve(&uri("/api/proxy?path=api&path=groups&path=3"))
            .unwrap();
        assert_eq!(r.path, "api/groups/3");
        assert_eq!(r.query, None);
    }

    #[test]
    fn test_query_keeps_other_pairs_verbatim() {
        let r = resolver(PathStrategy::Query)
            .resolve(&uri("/api/proxy?q=a%20b&path=search&limit=10"))
            .unwrap();
        assert_eq!(r.query.as_deref(), Some("q=a%20b&limit=10"));
    }

    #[test]
    fn test_query_missing_or_empty() {
        let resolver = resolver(PathStrategy::Query);
        assert!(matches!(resolver.resolve(&uri("/api/proxy")), Err(RelayError::MissingPath)));
        assert!(matches!(resolver.resolve(&uri("/api/proxy?path=")), Err(RelayError::MissingPath)));
        assert!(matches!(resolver.resolve(&uri("/api/proxy?other=1")), Err(RelayError::MissingPath)));
    }

    #[test]
    fn test_dot_segments_are_invalid() {
        for strategy in [PathStrategy::Parameter, PathStrategy::Residual] {
            let resolver = resolver(strategy);
            for path in [
                "/api/proxy/a/../../admin",
                "/api/proxy/%2e%2e/admin",
                "/api/proxy/%2E%2e/admin",
                "/api/proxy/.%2E/admin",
                "/api/proxy/a/./b",
                "/api/proxy/%2e/b",
                "/api/proxy/a/..",
            ] {
                assert!(
                    matches!(resolver.resolve(&uri(path)), Err(RelayError::InvalidPath)),
                    "{:?} accepted {}",
                    strategy,
                    path
                );
            }
        }
    }

    #[test]
    fn test_query_dot_segments_are_invalid() {
        let resolver = resolver(PathStrategy::Query);
        for path in [
            "/api/proxy?path=..%2Fadmin",
            "/api/proxy?path=a&path=..&path=admin",
            "/api/proxy?path=%252e%252e%2Fadmin",
            "/api/proxy?path=a%5C..%5Cadmin",
        ] {
            assert!(
                matches!(resolver.resolve(&uri(path)), Err(RelayError::InvalidPath)),
                "accepted {}",
                path
            );
        }
    }

    #[test]
    fn test_dots_inside_segments_are_kept() {
        let r = resolver(PathStrategy::Parameter)
            .resolve(&uri("/api/proxy/files/v1.2/..hidden/a..b"))
            .unwrap();
        assert_eq!(r.path, "files/v1.2/..hidden/a..b");
    }

    #[test]
    fn test_query_requires_prefix() {
        let resolver = resolver(PathStrategy::Query);
        assert!(matches!(resolver.resolve(&uri("/anything?path=users")), Err(RelayError::MissingPath)));
        assert!(matches!(resolver.resolve(&uri("/api/proxy/extra?path=users")), Err(RelayError::MissingPath)));
        assert_eq!(resolver.resolve(&uri("/api/proxy/?path=users")).unwrap().path, "users");
    }

    #[test]
    fn test_target_url_ignores_origin_trailing_slash() {
        let resolved = ResolvedPath {
            path: "a".into(),
            query: None,
        };
        assert_eq!(resolved.target_url("http://10.0.0.5:8000/base/"), "http://10.0.0.5:8000/base/a");
    }
}
