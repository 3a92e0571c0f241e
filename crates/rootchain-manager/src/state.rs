//! Operator-side root chain state.

use alloy_primitives::U256;

/// The mutable record behind the manager lock: the active fork, the
/// operator's next submission nonce, the adaptive submission gas price and
/// the cost attached to block submissions.
#[derive(Debug, Clone)]
pub struct RootChainState {
    current_fork: u64,
    nonce: u64,
    gas_price: U256,
    cost_nrb: U256,
}

impl RootChainState {
    pub fn new(current_fork: u64, nonce: u64, gas_price: U256, cost_nrb: U256) -> Self {
        assert!(!gas_price.is_zero(), "gas price must be positive");
        RootChainState {
            current_fork,
            nonce,
            gas_price,
            cost_nrb,
        }
    }

    pub fn current_fork(&self) -> u64 {
        self.current_fork
    }

    pub fn set_current_fork(&mut self, fork: u64) {
        self.current_fork = fork;
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn inc_nonce(&mut self) {
        self.nonce += 1;
    }

    pub fn gas_price(&self) -> U256 {
        self.gas_price
    }

    pub fn set_gas_price(&mut self, gas_price: U256) {
        assert!(!gas_price.is_zero(), "gas price must be positive");
        self.gas_price = gas_price;
    }

    pub fn cost_nrb(&self) -> U256 {
        self.cost_nrb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_is_monotonic() {
        let mut state = RootChainState::new(0, 5, U256::from(1u64), U256::ZERO);
        state.inc_nonce();
        state.inc_nonce();
        assert_eq!(state.nonce(), 7);
    }

    #[test]
    #[should_panic(expected = "gas price must be positive")]
    fn zero_gas_price_is_rejected() {
        let mut state = RootChainState::new(0, 0, U256::from(1u64), U256::ZERO);
        state.set_gas_price(U256::ZERO);
    }
}
