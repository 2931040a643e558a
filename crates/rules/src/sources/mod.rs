//! External collaborators consumed by the leaf checks.
//!
//! The checks only see the traits in [`types`]. Concrete HTTP-backed
//! implementations live next to them (`arkm`, `rpc`); the Postgres label
//! cache is provided by the server crate, keeping this crate free of any
//! database dependency.

mod arkm;
mod memory;
mod prices;
mod resolver;
mod rpc;
mod types;

pub use arkm::{ArkmClient, DEFAULT_ARKM_BASE_URL};
pub use memory::MemoryLabelCache;
pub use prices::NativeTokenPrices;
pub use resolver::LabelResolver;
pub use rpc::JsonRpcGasPriceSource;
pub use types::*;
