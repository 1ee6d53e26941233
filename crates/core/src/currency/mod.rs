//! Exchange-rate lookup and currency conversion.

pub mod conversion;
pub mod rates;

#[cfg(test)]
mod props;

pub use conversion::convert;
pub use rates::RateTable;
