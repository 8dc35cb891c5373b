pub mod bus;
pub mod types;

pub use bus::{RenderBus, RenderReceiver, RenderSender};
pub use types::RenderCommand;
