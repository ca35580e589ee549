//! Client-side routes

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    /// `/`
    #[default]
    Search,
    /// `/results`
    Results,
}

impl Route {
    /// Unknown paths redirect to `/`
    pub fn from_path(path: &str) -> Self {
        let path = path.trim();
        let path = path.split(['?', '#']).next().unwrap_or_default();
        match path.trim_end_matches('/') {
            "/results" | "results" => Route::Results,
            _ => {
                if !matches!(path, "" | "/") {
                    tracing::debug!(path, "unknown route, redirecting to /");
                }
                Route::Search
            }
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Search => "/",
            Route::Results => "/results",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_routes() {
        assert_eq!(Route::from_path("/"), Route::Search);
        assert_eq!(Route::from_path("/results"), Route::Results);
        assert_eq!(Route::from_path("/results/"), Route::Results);
        assert_eq!(Route::from_path("/results?x=1"), Route::Results);
    }

    #[test]
    fn test_unknown_redirects_home() {
        assert_eq!(Route::from_path("/nope"), Route::Search);
        assert_eq!(Route::from_path(""), Route::Search);
        assert_eq!(Route::from_path("/results/extra"), Route::Search);
    }
}
