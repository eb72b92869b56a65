pub use args::Args;
pub use sink::{MessageId, Notifier, Sink};

mod args;
mod discord;
mod sink;
