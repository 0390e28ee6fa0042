//! Common Test Assertions
//!
//! Balance and lifecycle checks shared by unit tests and the live
//! end-to-end scenarios.

use alloy::primitives::U256;
use eyre::{eyre, Result};
use std::future::Future;
use std::time::{Duration, Instant};

use crate::types::WithdrawalFinalizationState;

/// Assert that a balance grew by at least `expected`
pub fn assert_balance_increased_at_least(
    balance_before: U256,
    balance_after: U256,
    expected: U256,
) -> Result<()> {
    let actual = balance_after.saturating_sub(balance_before);
    if actual < expected {
        return Err(eyre!(
            "Balance increase too small: expected at least {}, got {} (before: {}, after: {})",
            expected,
            actual,
            balance_before,
            balance_after
        ));
    }
    Ok(())
}

/// Assert that a balance shrank by at least `expected` (fees push it further)
pub fn assert_balance_decreased_at_least(
    balance_before: U256,
    balance_after: U256,
    expected: U256,
) -> Result<()> {
    let actual = balance_before.saturating_sub(balance_after);
    if actual < expected {
        return Err(eyre!(
            "Balance decrease too small: expected at least {}, got {} (before: {}, after: {})",
            expected,
            actual,
            balance_before,
            balance_after
        ));
    }
    Ok(())
}

/// Assert a withdrawal has not been finalized yet
pub fn assert_not_finalized(state: WithdrawalFinalizationState) -> Result<()> {
    if state == WithdrawalFinalizationState::Finalized {
        return Err(eyre!("Expected unfinalized withdrawal, got {}", state));
    }
    Ok(())
}

/// Wait for a condition to be true, with timeout and polling
pub async fn wait_for_condition<F, Fut>(
    condition_name: &str,
    check_fn: F,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();

    loop {
        match check_fn().await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Error checking condition {}", condition_name);
            }
        }

        if start.elapsed() >= timeout {
            return Err(eyre!(
                "Timeout waiting for condition '{}' after {:?}",
                condition_name,
                timeout
            ));
        }

        tokio::time::sleep(poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_increase() {
        let ten = U256::from(10u64);
        let ok = assert_balance_increased_at_least(ten, U256::from(20u64), ten);
        assert!(ok.is_ok());
        let short = assert_balance_increased_at_least(ten, U256::from(15u64), ten);
        assert!(short.is_err());
    }

    #[test]
    fn test_balance_decrease_tolerates_fees() {
        let before = U256::from(100u64);
        let ok = assert_balance_decreased_at_least(before, U256::from(80u64), U256::from(15u64));
        assert!(ok.is_ok());
        let grew = assert_balance_decreased_at_least(before, U256::from(120u64), U256::from(1u64));
        assert!(grew.is_err());
    }

    #[test]
    fn test_not_finalized() {
        assert!(assert_not_finalized(WithdrawalFinalizationState::Processable).is_ok());
        assert!(assert_not_finalized(WithdrawalFinalizationState::Finalized).is_err());
    }

    #[tokio::test]
    async fn test_wait_for_condition_times_out() {
        let result = wait_for_condition(
            "never",
            || async { Ok(false) },
            Duration::from_millis(20),
            Duration::from_millis(5),
        )
        .await;
        assert!(result.is_err());
    }
}
