//! Social feed wrappers.

mod chan;
mod reddit;
mod x;

pub use chan::ChanWrapper;
pub use reddit::RedditWrapper;
pub use x::{CommandRunner, SystemCommandRunner, XWrapper};
