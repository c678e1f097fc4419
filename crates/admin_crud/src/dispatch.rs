use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    marker::PhantomData,
    sync::Arc,
};

use async_trait::async_trait;
use shared::error::CommandError;

pub type DispatchResult = Result<(), CommandError>;

/// An intent object. The controller never looks inside one; it only hands it
/// to a [`CommandDispatcher`].
pub trait Command: Any + Send + fmt::Debug {
    fn command_name(&self) -> &'static str;
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl<T: Any + Send + fmt::Debug> Command for T {
    fn command_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    /// Runs `command` to completion.
    async fn dispatch(&self, command: Box<dyn Command>) -> DispatchResult;
}

#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    async fn handle(&self, command: C) -> DispatchResult;
}

#[async_trait]
trait ErasedHandler: Send + Sync {
    async fn handle_any(&self, command: Box<dyn Any + Send>) -> DispatchResult;
}

struct Typed<C, H> {
    handler: H,
    _command: PhantomData<fn(C)>,
}

#[async_trait]
impl<C, H> ErasedHandler for Typed<C, H>
where
    C: Command,
    H: CommandHandler<C>,
{
    async fn handle_any(&self, command: Box<dyn Any + Send>) -> DispatchResult {
        let command = command
            .downcast::<C>()
            .map_err(|_| CommandError::Unhandled(std::any::type_name::<C>()))?;
        self.handler.handle(*command).await
    }
}

/// Synchronous command bus: one handler per command type.
#[derive(Clone, Default)]
pub struct CommandBus {
    handlers: HashMap<TypeId, Arc<dyn ErasedHandler>>,
}

impl CommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `C`, replacing any previous handler.
    pub fn register<C, H>(&mut self, handler: H) -> &mut Self
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        self.handlers.insert(
            TypeId::of::<C>(),
            Arc::new(Typed {
                handler,
                _command: PhantomData,
            }),
        );
        self
    }

    pub fn handles<C: Command>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<C>())
    }
}

#[async_trait]
impl CommandDispatcher for CommandBus {
    async fn dispatch(&self, command: Box<dyn Command>) -> DispatchResult {
        let name = (*command).command_name();
        let command = command.into_any();
        let Some(handler) = self.handlers.get(&(*command).type_id()) else {
            return Err(CommandError::Unhandled(name));
        };
        handler.handle_any(command).await
    }
}
