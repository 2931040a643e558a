//! Static native-token fiat prices.

use std::collections::HashMap;

/// Static fiat price per native token unit, keyed by chain id.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeTokenPrices(HashMap<u64, f64>);

impl Default for NativeTokenPrices {
    /// ETH and BNB reference prices.
    fn default() -> Self {
        Self(HashMap::from([(1, 2000.0), (56, 700.0)]))
    }
}

impl NativeTokenPrices {
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    pub fn with(mut self, chain_id: u64, price: f64) -> Self {
        self.0.insert(chain_id, price);
        self
    }

    pub fn get(&self, chain_id: u64) -> Option<f64> {
        self.0.get(&chain_id).copied()
    }
}

impl FromIterator<(u64, f64)> for NativeTokenPrices {
    fn from_iter<I: IntoIterator<Item = (u64, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
