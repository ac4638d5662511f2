//! Market data wrappers.

mod binance;
mod coinbase;
mod cryptocompare;
mod yfinance;

pub use binance::BinanceWrapper;
pub use coinbase::CoinBaseWrapper;
pub use cryptocompare::CryptoCompareWrapper;
pub use yfinance::YFinanceWrapper;
