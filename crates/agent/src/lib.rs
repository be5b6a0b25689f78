//! Battle automation driver: replays a decoded plan through an input device,
//! reconciled against vision signals.

mod battle;
mod device;
mod error;
mod executor;
mod report;
mod retry;
mod sim;
mod support;

pub use battle::*;
pub use device::*;
pub use error::*;
pub use executor::*;
pub use report::*;
pub use retry::*;
pub use sim::*;
pub use support::*;
