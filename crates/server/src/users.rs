use std::{collections::HashMap, sync::Arc};

use admin_api::{BanUser, CreateUser, DeleteUser, UnbanUser, UpdateUser, UserForm};
use admin_crud::{AdminRequest, CrudError, CrudNaming, FormOptions, RouteTable};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode},
    response::Response,
    routing::{get, post},
    Form, Router,
};
use serde_json::Value;
use shared::domain::{HasIdentity, User, UserId};

use crate::{app_state::AppState, flash_cookie::IncomingFlashes, HttpError};

pub(crate) const DOMAIN: &str = "authentication";
pub(crate) const ENTITY: &str = "user";
pub(crate) const BASE_PATH: &str = "/admin/authentication/users";

type Fields = HashMap<String, String>;

pub(crate) fn register_routes(naming: &CrudNaming, routes: &mut RouteTable) {
    routes
        .register(naming.route_name("index"), BASE_PATH)
        .register(naming.route_name("new"), format!("{BASE_PATH}/new"))
        .register(naming.route_name("show"), format!("{BASE_PATH}/:id"))
        .register(naming.route_name("edit"), format!("{BASE_PATH}/:id/edit"))
        .register(naming.route_name("delete"), format!("{BASE_PATH}/:id/delete"))
        .register(naming.route_name("ban"), format!("{BASE_PATH}/:id/ban"))
        .register(naming.route_name("unban"), format!("{BASE_PATH}/:id/unban"));
}

pub(crate) fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(BASE_PATH, get(index))
        .route(&format!("{BASE_PATH}/new"), get(new_form).post(create))
        .route(&format!("{BASE_PATH}/:id"), get(show))
        .route(&format!("{BASE_PATH}/:id/edit"), get(edit_form).post(update))
        .route(&format!("{BASE_PATH}/:id/delete"), post(delete))
        .route(&format!("{BASE_PATH}/:id/ban"), post(ban))
        .route(&format!("{BASE_PATH}/:id/unban"), post(unban))
}

fn admin_request(state: &AppState, method: Method, action: &str, id: Option<i64>) -> AdminRequest {
    let request = AdminRequest::new(method, state.users.route_name(action));
    match id {
        Some(id) => request.with_route_param("id", id),
        None => request,
    }
}

async fn load_user(state: &AppState, id: i64) -> Result<User, HttpError> {
    state
        .storage
        .find_user(UserId(id))
        .await
        .map_err(HttpError::Storage)?
        .ok_or(HttpError::NotFound("user not found"))
}

async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<Fields>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    let request = admin_request(&state, Method::GET, "index", None)
        .with_query(query)
        .with_headers(headers);
    let mut flashes = IncomingFlashes::from_headers(request.headers(), &state.tokens);
    let response = state
        .users
        .query_index::<User, _>(&request, &state.storage, &mut flashes.bag)
        .await?;
    Ok(flashes.respond(response))
}

async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    let user = load_user(&state, id).await?;
    let mut flashes = IncomingFlashes::from_headers(&headers, &state.tokens);

    let mut context = state.users.base_context();
    context.insert(
        "data".into(),
        serde_json::to_value(&user).map_err(CrudError::from)?,
    );
    context.insert(
        "_delete_token".into(),
        Value::String(state.tokens.delete_token(&user.identity())),
    );
    context.insert("_index_url".into(), Value::String(state.users.url("index")?));

    let response = state.users.render(
        &state.users.view_path("show", false),
        context,
        StatusCode::OK,
        &mut flashes.bag,
    )?;
    Ok(flashes.respond(response))
}

async fn new_form(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    submit_new(&state, Method::GET, headers, Fields::new()).await
}

async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(fields): Form<Fields>,
) -> Result<Response, HttpError> {
    submit_new(&state, Method::POST, headers, fields).await
}

async fn submit_new(
    state: &AppState,
    method: Method,
    headers: HeaderMap,
    fields: Fields,
) -> Result<Response, HttpError> {
    let request = admin_request(state, method, "new", None)
        .with_headers(headers)
        .with_form(fields);
    let mut flashes = IncomingFlashes::from_headers(request.headers(), &state.tokens);
    let response = state
        .users
        .execute_form_command(
            &request,
            &mut flashes.bag,
            CreateUser::default(),
            &UserForm,
            None::<&User>,
            FormOptions::default().success_label("creation"),
        )
        .await?;
    Ok(flashes.respond(response))
}

async fn edit_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    submit_edit(&state, Method::GET, id, headers, Fields::new()).await
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Form(fields): Form<Fields>,
) -> Result<Response, HttpError> {
    submit_edit(&state, Method::POST, id, headers, fields).await
}

async fn submit_edit(
    state: &AppState,
    method: Method,
    id: i64,
    headers: HeaderMap,
    fields: Fields,
) -> Result<Response, HttpError> {
    let user = load_user(state, id).await?;
    let request = admin_request(state, method, "edit", Some(id))
        .with_headers(headers)
        .with_form(fields);
    let mut flashes = IncomingFlashes::from_headers(request.headers(), &state.tokens);
    let response = state
        .users
        .execute_form_command(
            &request,
            &mut flashes.bag,
            UpdateUser::for_user(&user),
            &UserForm,
            Some(&user),
            FormOptions::edit().success_label("update"),
        )
        .await?;
    Ok(flashes.respond(response))
}

async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    form: Option<Form<Fields>>,
) -> Result<Response, HttpError> {
    let user = load_user(&state, id).await?;
    let fields = form.map(|Form(fields)| fields).unwrap_or_default();
    let request = admin_request(&state, Method::POST, "delete", Some(id))
        .with_headers(headers)
        .with_form(fields);
    let mut flashes = IncomingFlashes::from_headers(request.headers(), &state.tokens);
    let response = state
        .users
        .execute_delete_command(
            &request,
            &mut flashes.bag,
            DeleteUser { id: user.id },
            &user,
            None,
        )
        .await?;
    Ok(flashes.respond(response))
}

async fn ban(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    let user = load_user(&state, id).await?;
    let mut flashes = IncomingFlashes::from_headers(&headers, &state.tokens);
    let response = state
        .users
        .execute_command(&mut flashes.bag, BanUser { id: user.id }, Some(&user), "ban")
        .await?;
    Ok(flashes.respond(response))
}

async fn unban(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    let user = load_user(&state, id).await?;
    let mut flashes = IncomingFlashes::from_headers(&headers, &state.tokens);
    let response = state
        .users
        .execute_command(
            &mut flashes.bag,
            UnbanUser { id: user.id },
            Some(&user),
            "unban",
        )
        .await?;
    Ok(flashes.respond(response))
}
