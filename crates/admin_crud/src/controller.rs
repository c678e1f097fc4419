use std::sync::Arc;

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use shared::{domain::HasIdentity, error::SafeMessage, repository::DataSource};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    csrf::CsrfValidator,
    dispatch::{Command, CommandDispatcher, DispatchResult},
    flash::FlashBag,
    form::{Form, FormError, FormSchema},
    naming::CrudNaming,
    pagination::{paginate, PAGE_SIZE},
    request::AdminRequest,
    response::CrudResponse,
    routing::{RouteError, RouteTable},
    view::{RenderError, ViewContext, ViewRenderer},
};

const NO_PARAMS: &[(&str, &str)] = &[];

/// Failures outside command execution. These are not caught by the
/// controller and end up as server errors.
#[derive(Debug, Error)]
pub enum CrudError {
    #[error("data source failed: {0:#}")]
    DataSource(anyhow::Error),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to build view context: {0}")]
    Context(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct CrudContext {
    pub dispatcher: Arc<dyn CommandDispatcher>,
    pub renderer: Arc<dyn ViewRenderer>,
    pub routes: Arc<RouteTable>,
    pub csrf: Arc<dyn CsrfValidator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOptions {
    pub view: String,
    pub override_form_views: bool,
    pub redirect_to: Option<String>,
    pub has_index: bool,
    /// Names the action in the success notification.
    pub success_label: Option<String>,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            view: "new".to_string(),
            override_form_views: false,
            redirect_to: None,
            has_index: true,
            success_label: None,
        }
    }
}

impl FormOptions {
    pub fn edit() -> Self {
        Self::default().view("edit")
    }

    pub fn view(mut self, view: impl Into<String>) -> Self {
        self.view = view.into();
        self
    }

    pub fn override_form_views(mut self) -> Self {
        self.override_form_views = true;
        self
    }

    pub fn redirect_to(mut self, path: impl Into<String>) -> Self {
        self.redirect_to = Some(path.into());
        self
    }

    pub fn without_index(mut self) -> Self {
        self.has_index = false;
        self
    }

    pub fn success_label(mut self, label: impl Into<String>) -> Self {
        self.success_label = Some(label.into());
        self
    }
}

/// List, form and delete handling for one entity.
#[derive(Clone)]
pub struct CrudController {
    naming: CrudNaming,
    ctx: CrudContext,
}

impl CrudController {
    pub fn new(naming: CrudNaming, ctx: CrudContext) -> Self {
        Self { naming, ctx }
    }

    pub fn route_name(&self, action: &str) -> String {
        self.naming.route_name(action)
    }

    pub fn view_path(&self, action: &str, override_form_views: bool) -> String {
        self.naming.view_path(action, override_form_views)
    }

    pub fn url(&self, action: &str) -> Result<String, CrudError> {
        Ok(self.ctx.routes.generate(&self.route_name(action), NO_PARAMS)?)
    }

    pub fn show_url(&self, identity: &str) -> Result<String, CrudError> {
        Ok(self
            .ctx
            .routes
            .generate(&self.route_name("show"), &[("id", identity)])?)
    }

    /// Renders the paginated list of every record `source` holds.
    pub async fn query_index<T, S>(
        &self,
        request: &AdminRequest,
        source: &S,
        flashes: &mut FlashBag,
    ) -> Result<CrudResponse, CrudError>
    where
        T: Serialize,
        S: DataSource<T> + ?Sized,
    {
        let records = source.find_all().await.map_err(CrudError::DataSource)?;
        let page = paginate(records, request.page(), PAGE_SIZE);

        let mut context = self.base_context();
        context.insert("data".into(), serde_json::to_value(&page)?);
        self.render(&self.view_path("index", false), context, StatusCode::OK, flashes)
    }

    /// Binds `command` through `schema` and dispatches it once the form is
    /// submitted and valid.
    ///
    /// On success the client is sent to the row's `show` page, then to
    /// `options.redirect_to`, then to `index`. A failed dispatch re-renders
    /// the form: frame-aware clients get the message as a form error, others
    /// get an error flash and a 422.
    pub async fn execute_form_command<C, S, R>(
        &self,
        request: &AdminRequest,
        flashes: &mut FlashBag,
        command: C,
        schema: &S,
        row: Option<&R>,
        options: FormOptions,
    ) -> Result<CrudResponse, CrudError>
    where
        C: Command + Clone + Serialize,
        S: FormSchema<C> + ?Sized,
        R: HasIdentity + Serialize + ?Sized,
    {
        let turbo_frame = request.turbo_frame();
        let action = self
            .ctx
            .routes
            .generate(request.route(), request.route_params())?;
        let mut form = Form::build(schema, command, action).handle_request(schema, request);
        let mut status = StatusCode::OK;

        if form.is_submitted() && form.is_valid() {
            match self.dispatch(form.data().clone()).await {
                Ok(()) => {
                    flashes.action_succeeded(options.success_label.as_deref());
                    if let Some(row) = row {
                        return self.redirect_to_show(&row.identity());
                    }
                    return self.redirect(options.redirect_to);
                }
                Err(error) => {
                    let message = error.safe_message();
                    if turbo_frame.is_some() {
                        form.add_error(FormError::global(message));
                    } else {
                        flashes.error(message);
                        status = StatusCode::UNPROCESSABLE_ENTITY;
                    }
                }
            }
        }

        let mut context = self.base_context();
        context.insert("form".into(), serde_json::to_value(form.view())?);
        context.insert(
            "data".into(),
            match row {
                Some(row) => serde_json::to_value(row)?,
                None => Value::Null,
            },
        );
        context.insert(
            "_turbo_frame_target".into(),
            turbo_frame.map_or(Value::Null, |frame| Value::String(frame.to_string())),
        );
        context.insert(
            "_index_url".into(),
            if options.has_index {
                Value::String(self.url("index")?)
            } else {
                Value::Null
            },
        );
        context.insert(
            "_show_url".into(),
            match row {
                Some(row) => Value::String(self.show_url(&row.identity())?),
                None => Value::Null,
            },
        );

        self.render(
            &self.view_path(&options.view, options.override_form_views),
            context,
            status,
            flashes,
        )
    }

    /// Dispatches a deletion once the row's token checks out.
    ///
    /// XHR clients get 202 or a 400 JSON error; everyone else, including
    /// requests with a bad token, is redirected.
    pub async fn execute_delete_command<C, R>(
        &self,
        request: &AdminRequest,
        flashes: &mut FlashBag,
        command: C,
        row: &R,
        redirect_to: Option<String>,
    ) -> Result<CrudResponse, CrudError>
    where
        C: Command,
        R: HasIdentity + ?Sized,
    {
        let identity = row.identity();
        if self.ctx.csrf.is_delete_token_valid(&identity, request) {
            match self.dispatch(command).await {
                Ok(()) => {
                    if request.is_xhr() {
                        return Ok(CrudResponse::Accepted);
                    }
                    flashes.action_succeeded(Some("deletion"));
                }
                Err(error) => {
                    if request.is_xhr() {
                        return Ok(CrudResponse::Failure(SafeMessage::from(&error)));
                    }
                    flashes.error(error.safe_message());
                }
            }
        } else {
            warn!(
                domain = self.naming.domain(),
                entity = self.naming.entity(),
                %identity,
                "deletion refused: invalid token"
            );
        }

        self.redirect(redirect_to)
    }

    /// Dispatches a form-less command and redirects to the row, or the index
    /// without one. `success_label` names the action in the notification.
    pub async fn execute_command<C, R>(
        &self,
        flashes: &mut FlashBag,
        command: C,
        row: Option<&R>,
        success_label: &str,
    ) -> Result<CrudResponse, CrudError>
    where
        C: Command,
        R: HasIdentity + ?Sized,
    {
        match self.dispatch(command).await {
            Ok(()) => flashes.action_succeeded(Some(success_label)),
            Err(error) => flashes.error(error.safe_message()),
        }

        match row {
            Some(row) => self.redirect_to_show(&row.identity()),
            None => self.redirect(None),
        }
    }

    /// Renders `view`, moving pending flashes into the `_flashes` key.
    pub fn render(
        &self,
        view: &str,
        mut context: ViewContext,
        status: StatusCode,
        flashes: &mut FlashBag,
    ) -> Result<CrudResponse, CrudError> {
        context.insert("_flashes".into(), serde_json::to_value(flashes.take())?);
        let body = self.ctx.renderer.render(view, &context)?;
        Ok(CrudResponse::View { status, body })
    }

    /// Context keys every view of this entity receives.
    pub fn base_context(&self) -> ViewContext {
        let mut context = ViewContext::new();
        context.insert(
            "_domain".into(),
            Value::String(self.naming.domain().to_string()),
        );
        context.insert(
            "_entity".into(),
            Value::String(self.naming.entity().to_string()),
        );
        context
    }

    fn redirect(&self, redirect_to: Option<String>) -> Result<CrudResponse, CrudError> {
        let location = match redirect_to {
            Some(path) => path,
            None => self.url("index")?,
        };
        Ok(CrudResponse::SeeOther { location })
    }

    fn redirect_to_show(&self, identity: &str) -> Result<CrudResponse, CrudError> {
        Ok(CrudResponse::SeeOther {
            location: self.show_url(identity)?,
        })
    }

    async fn dispatch<C: Command>(&self, command: C) -> DispatchResult {
        let name = command.command_name();
        let result = self.ctx.dispatcher.dispatch(Box::new(command)).await;
        match &result {
            Ok(()) => info!(
                command = name,
                domain = self.naming.domain(),
                entity = self.naming.entity(),
                "command dispatched"
            ),
            Err(error) => warn!(
                command = name,
                domain = self.naming.domain(),
                entity = self.naming.entity(),
                %error,
                "command failed"
            ),
        }
        result
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
