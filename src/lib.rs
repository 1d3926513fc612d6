pub mod config;
pub mod mediator;
pub mod session;
pub mod staging;
pub mod task;

pub use config::{Config, ConfigError, Endpoint};
pub use mediator::{AzureMediator, Mediator};
pub use session::SessionState;
pub use staging::StagedUpload;
pub use task::{TaskKind, TaskOutput, TaskRequest, TaskResult};
