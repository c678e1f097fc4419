use std::collections::HashMap;

use axum::http::{HeaderMap, Method};

pub const TURBO_FRAME_HEADER: &str = "turbo-frame";
pub const REQUESTED_WITH_HEADER: &str = "x-requested-with";

/// Read-only view of the inbound request handed to every CRUD operation.
#[derive(Debug, Clone)]
pub struct AdminRequest {
    method: Method,
    route: String,
    route_params: Vec<(String, String)>,
    query: HashMap<String, String>,
    headers: HeaderMap,
    form: HashMap<String, String>,
}

impl AdminRequest {
    pub fn new(method: Method, route: impl Into<String>) -> Self {
        Self {
            method,
            route: route.into(),
            route_params: Vec::new(),
            query: HashMap::new(),
            headers: HeaderMap::new(),
            form: HashMap::new(),
        }
    }

    pub fn with_route_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.route_params.push((name.into(), value.to_string()));
        self
    }

    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_form(mut self, form: HashMap<String, String>) -> Self {
        self.form = form;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Name of the matched route.
    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn route_params(&self) -> &[(String, String)] {
        &self.route_params
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn form(&self) -> &HashMap<String, String> {
        &self.form
    }

    pub fn form_field(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(String::as_str)
    }

    /// Requested page, falling back to 1 for missing, malformed or zero values.
    pub fn page(&self) -> usize {
        self.query_param("page")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1)
    }

    /// Target frame of a partial-page client; empty values count as absent.
    pub fn turbo_frame(&self) -> Option<&str> {
        self.header(TURBO_FRAME_HEADER).filter(|v| !v.is_empty())
    }

    pub fn is_xhr(&self) -> bool {
        self.header(REQUESTED_WITH_HEADER)
            .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
    }
}
