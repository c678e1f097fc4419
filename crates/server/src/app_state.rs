use std::sync::Arc;

use admin_crud::{
    CrudContext, CrudController, CrudNaming, DeleteTokenManager, HtmlViewRenderer, RouteTable,
};
use storage::Storage;

use crate::{config::Settings, users};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) storage: Storage,
    pub(crate) users: CrudController,
    pub(crate) tokens: DeleteTokenManager,
    pub(crate) max_form_bytes: usize,
}

impl AppState {
    pub(crate) fn new(storage: Storage, settings: &Settings) -> Self {
        let naming = CrudNaming::new(&settings.route_prefix, users::DOMAIN, users::ENTITY);
        let mut routes = RouteTable::new();
        users::register_routes(&naming, &mut routes);

        let tokens = DeleteTokenManager::new(&settings.csrf_secret);
        let ctx = CrudContext {
            dispatcher: Arc::new(admin_api::command_bus(storage.clone())),
            renderer: Arc::new(HtmlViewRenderer::default()),
            routes: Arc::new(routes),
            csrf: Arc::new(tokens.clone()),
        };

        Self {
            storage,
            users: CrudController::new(naming, ctx),
            tokens,
            max_form_bytes: settings.max_form_bytes,
        }
    }
}
