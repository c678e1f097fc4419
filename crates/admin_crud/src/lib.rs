//! Generic list / form / delete request handling for back-office entities.
//!
//! [`CrudController`] turns an [`AdminRequest`] into a [`CrudResponse`]: it
//! renders views, binds forms, hands commands to a [`CommandDispatcher`] and
//! decides where to redirect. Persistence, templates and routing stay behind
//! the collaborator traits exported here.

pub mod controller;
pub mod csrf;
pub mod dispatch;
pub mod flash;
pub mod form;
pub mod naming;
pub mod pagination;
pub mod request;
pub mod response;
pub mod routing;
pub mod view;

pub use controller::{CrudContext, CrudController, CrudError, FormOptions};
pub use csrf::{CsrfValidator, DeleteTokenManager, DEFAULT_CSRF_SECRET};
pub use dispatch::{Command, CommandBus, CommandDispatcher, CommandHandler, DispatchResult};
pub use flash::{Flash, FlashBag, FlashLevel};
pub use form::{Form, FormError, FormFields, FormSchema};
pub use naming::CrudNaming;
pub use pagination::{paginate, Page, PAGE_SIZE};
pub use request::AdminRequest;
pub use response::CrudResponse;
pub use routing::{RouteError, RouteTable};
pub use view::{HtmlViewRenderer, RenderError, ViewContext, ViewRenderer};
