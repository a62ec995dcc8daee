pub use command::Command;
pub use event::{ConnStatus, Event};
pub(crate) use event_loop::{EventLoop, EventLoopConfig};

mod command;
mod event;
mod event_loop;
