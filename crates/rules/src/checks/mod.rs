//! Leaf risk checks plugged into a [`ChainedEvaluator`](crate::evaluator::ChainedEvaluator).

mod account_age;
mod gas_price;
mod label;
mod null_address;

pub use account_age::{AccountAgeCheck, AccountAgeCheckConfig, Clock, SystemClock};
pub use gas_price::{
    GasPriceCheck, GasPriceCheckConfig, GAS_PRICE_THRESHOLD_IN_USD, HIGH_GAS_SCORE,
};
pub use label::{LabelCheck, LabelCheckConfig, Subject};
pub use null_address::{NullAddressDetector, NULL_ADDRESS, NULL_ADDRESS_SCORE};
