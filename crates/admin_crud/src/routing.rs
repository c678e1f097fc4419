use std::collections::HashMap;

use thiserror::Error;
use url::{form_urlencoded, Url};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("route `{0}` is not registered")]
    UnknownRoute(String),
    #[error("route `{route}` requires parameter `{param}`")]
    MissingParameter { route: String, param: String },
    #[error("route `{0}` does not form a valid path")]
    InvalidPath(String),
}

/// Scratch origin the path is assembled on; only the path part is kept.
const PATH_ORIGIN: &str = "http://localhost/";

/// Named URL patterns. Segments starting with `:` are parameters, matching
/// the path syntax the server mounts them with.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, String>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, pattern: impl Into<String>) -> &mut Self {
        self.routes.insert(name.into(), pattern.into());
        self
    }

    /// Fills the pattern of `name`; parameters the pattern does not use are
    /// appended as a query string.
    pub fn generate<K, V>(&self, name: &str, params: &[(K, V)]) -> Result<String, RouteError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let pattern = self
            .routes
            .get(name)
            .ok_or_else(|| RouteError::UnknownRoute(name.to_string()))?;

        let invalid = || RouteError::InvalidPath(name.to_string());
        let mut scratch = Url::parse(PATH_ORIGIN).map_err(|_| invalid())?;
        let mut used = vec![false; params.len()];
        {
            let mut path = scratch.path_segments_mut().map_err(|_| invalid())?;
            path.clear();
            for segment in pattern.strip_prefix('/').unwrap_or(pattern).split('/') {
                let Some(param) = segment.strip_prefix(':') else {
                    path.push(segment);
                    continue;
                };
                let position = params
                    .iter()
                    .position(|(key, _)| key.as_ref() == param)
                    .ok_or_else(|| RouteError::MissingParameter {
                        route: name.to_string(),
                        param: param.to_string(),
                    })?;
                used[position] = true;
                path.push(params[position].1.as_ref());
            }
        }

        let mut url = scratch.path().to_string();
        let mut extra = params
            .iter()
            .zip(&used)
            .filter(|(_, used)| !**used)
            .map(|((key, value), _)| (key.as_ref(), value.as_ref()))
            .peekable();
        if extra.peek().is_some() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(extra)
                .finish();
            url.push('?');
            url.push_str(&query);
        }
        Ok(url)
    }
}
