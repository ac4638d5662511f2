//! News wrappers.

mod cryptopanic;
mod duckduckgo;
mod googlenews;
mod newsapi;

pub use cryptopanic::{CryptoPanicPlan, CryptoPanicWrapper};
pub use duckduckgo::DuckDuckGoWrapper;
pub use googlenews::GoogleNewsWrapper;
pub use newsapi::NewsApiWrapper;
