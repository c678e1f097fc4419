//! Back-office commands for user accounts and the bus that runs them.

pub mod commands;
pub mod forms;

use admin_crud::CommandBus;
use storage::Storage;

pub use commands::{BanUser, CreateUser, DeleteUser, UnbanUser, UpdateUser, UserCommandHandler};
pub use forms::UserForm;

pub fn command_bus(storage: Storage) -> CommandBus {
    let handler = UserCommandHandler::new(storage);
    let mut bus = CommandBus::new();
    bus.register::<CreateUser, _>(handler.clone())
        .register::<UpdateUser, _>(handler.clone())
        .register::<DeleteUser, _>(handler.clone())
        .register::<BanUser, _>(handler.clone())
        .register::<UnbanUser, _>(handler);
    bus
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
