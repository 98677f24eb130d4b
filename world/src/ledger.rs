//! Shared resource ledger.

use lane_defence_core::PlacementError;
use thiserror::Error;

/// Error returned when a debit exceeds the ledger balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("debit of {required} exceeds the balance of {available}")]
pub struct InsufficientResources {
    /// Amount requested by the debit.
    pub required: u32,
    /// Balance at the time of the debit.
    pub available: u32,
}

impl From<InsufficientResources> for PlacementError {
    fn from(error: InsufficientResources) -> Self {
        PlacementError::InsufficientResources {
            required: error.required,
            available: error.available,
        }
    }
}

/// Scalar counter of resource units shared by placement and generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceLedger {
    balance: u32,
}

impl ResourceLedger {
    /// Creates a ledger holding the provided opening balance.
    #[must_use]
    pub const fn new(balance: u32) -> Self {
        Self { balance }
    }

    /// Current balance.
    #[must_use]
    pub const fn balance(&self) -> u32 {
        self.balance
    }

    /// Adds resources and returns the new balance.
    ///
    /// # Panics
    ///
    /// Panics when the balance would overflow, which indicates a broken
    /// generation invariant rather than a recoverable condition.
    pub fn credit(&mut self, amount: u32) -> u32 {
        self.balance = self
            .balance
            .checked_add(amount)
            .unwrap_or_else(|| panic!("ledger overflow crediting {amount} to {}", self.balance));
        self.balance
    }

    /// Removes resources, leaving the balance untouched when it cannot cover
    /// the amount.
    pub fn debit(&mut self, amount: u32) -> Result<u32, InsufficientResources> {
        let remaining =
            self.balance
                .checked_sub(amount)
                .ok_or(InsufficientResources {
                    required: amount,
                    available: self.balance,
                })?;
        self.balance = remaining;
        Ok(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debit_is_atomic_on_failure() {
        let mut ledger = ResourceLedger::new(5);
        assert_eq!(
            ledger.debit(7),
            Err(InsufficientResources {
                required: 7,
                available: 5,
            })
        );
        assert_eq!(ledger.balance(), 5);
        assert_eq!(ledger.debit(5), Ok(0));
        assert_eq!(ledger.balance(), 0);
    }

    #[test]
    fn credit_reports_new_balance() {
        let mut ledger = ResourceLedger::new(2);
        assert_eq!(ledger.credit(3), 5);
    }

    #[test]
    #[should_panic(expected = "ledger overflow")]
    fn credit_overflow_is_fatal() {
        let mut ledger = ResourceLedger::new(u32::MAX);
        let _ = ledger.credit(1);
    }

    #[test]
    fn shortfall_converts_into_placement_error() {
        let error: PlacementError = InsufficientResources {
            required: 3,
            available: 1,
        }
        .into();
        assert_eq!(
            error,
            PlacementError::InsufficientResources {
                required: 3,
                available: 1,
            }
        );
    }
}
