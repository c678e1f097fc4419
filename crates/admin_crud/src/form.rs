use std::collections::HashMap;

use axum::http::Method;
use serde::Serialize;

use crate::request::AdminRequest;

pub type FormFields = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormError {
    /// `None` for errors attached to the form as a whole.
    pub field: Option<String>,
    pub message: String,
}

impl FormError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn global(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

/// Describes how submitted fields map onto a command and which values it accepts.
pub trait FormSchema<C>: Send + Sync {
    fn name(&self) -> &str;

    /// Copies submitted values into `command`. Returns conversion errors.
    fn bind(&self, command: &mut C, fields: &FormFields) -> Vec<FormError>;

    fn validate(&self, command: &C) -> Vec<FormError>;
}

#[derive(Debug, Clone)]
pub struct Form<C> {
    name: String,
    action: String,
    data: C,
    submitted: bool,
    errors: Vec<FormError>,
}

#[derive(Debug, Serialize)]
pub struct FormView<'a, C> {
    pub name: &'a str,
    pub action: &'a str,
    pub submitted: bool,
    pub valid: bool,
    pub values: &'a C,
    pub errors: &'a [FormError],
}

impl<C> Form<C> {
    pub fn build<S>(schema: &S, data: C, action: impl Into<String>) -> Self
    where
        S: FormSchema<C> + ?Sized,
    {
        Self {
            name: schema.name().to_string(),
            action: action.into(),
            data,
            submitted: false,
            errors: Vec::new(),
        }
    }

    /// Binds and validates the request when it is a POST; otherwise leaves the
    /// form untouched and unsubmitted.
    pub fn handle_request<S>(mut self, schema: &S, request: &AdminRequest) -> Self
    where
        S: FormSchema<C> + ?Sized,
    {
        if request.method() != Method::POST {
            return self;
        }

        self.submitted = true;
        let conversion_errors = schema.bind(&mut self.data, request.form());
        self.errors.extend(conversion_errors);
        let violations = schema.validate(&self.data);
        self.errors.extend(violations);
        self
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn is_valid(&self) -> bool {
        self.submitted && self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: FormError) {
        self.errors.push(error);
    }

    pub fn data(&self) -> &C {
        &self.data
    }

    pub fn view(&self) -> FormView<'_, C> {
        FormView {
            name: &self.name,
            action: &self.action,
            submitted: self.submitted,
            valid: self.is_valid(),
            values: &self.data,
            errors: &self.errors,
        }
    }
}
