//! Gas and prefund accounting over wire-level operations.

use ethers::types::U256;

use crate::error::OperationError;
use crate::types::UserOperation;

/// Total gas the entry point charges for: `callGasLimit +
/// verificationGasLimit * m + preVerificationGas`.
///
/// A sponsored operation (non-empty `paymasterAndData`) runs validation in
/// the paymaster context on top of the wallet context, so `m = 3`; a
/// self-paying operation uses `m = 1`.
pub fn required_gas(op: &UserOperation) -> Result<U256, OperationError> {
    let multiplier = if op.paymaster_and_data.is_empty() {
        U256::one()
    } else {
        U256::from(3u8)
    };
    op.verification_gas_limit
        .checked_mul(multiplier)
        .and_then(|gas| gas.checked_add(op.call_gas_limit))
        .and_then(|gas| gas.checked_add(op.pre_verification_gas))
        .ok_or(OperationError::ArithmeticOverflow("required gas"))
}

/// Maximum value the sender must hold before execution. Uses the fee cap,
/// not the realized price, so it over-approximates the actual cost.
pub fn required_prefund(op: &UserOperation) -> Result<U256, OperationError> {
    required_gas(op)?
        .checked_mul(op.max_fee_per_gas)
        .ok_or(OperationError::ArithmeticOverflow("required prefund"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::{Address, Bytes};

    fn op() -> UserOperation {
        UserOperation {
            sender: Address::repeat_byte(0x11),
            nonce: U256::zero(),
            init_code: Bytes::default(),
            call_data: Bytes::default(),
            call_gas_limit: U256::from(2_000_000u64),
            verification_gas_limit: U256::from(500_000u64),
            pre_verification_gas: U256::from(60_000u64),
            max_fee_per_gas: U256::from(10_000_000_000u64),
            max_priority_fee_per_gas: U256::from(10_000_000_000u64),
            paymaster_and_data: Bytes::default(),
            signature: Bytes::default(),
        }
    }

    #[test]
    fn self_paying_operation_uses_unit_multiplier() {
        assert_eq!(required_gas(&op()).unwrap(), U256::from(2_560_000u64));
    }

    #[test]
    fn sponsored_operation_triples_verification_gas() {
        let sponsored = UserOperation {
            paymaster_and_data: Bytes::from(vec![0x01]),
            ..op()
        };
        // 2_000_000 + 3 * 500_000 + 60_000
        assert_eq!(required_gas(&sponsored).unwrap(), U256::from(3_560_000u64));
    }

    #[test]
    fn prefund_is_gas_times_fee_cap() {
        assert_eq!(
            required_prefund(&op()).unwrap(),
            U256::from(2_560_000u64) * U256::from(10_000_000_000u64)
        );
    }

    #[test]
    fn gas_overflow_is_rejected() {
        let saturated = UserOperation {
            call_gas_limit: U256::MAX,
            verification_gas_limit: U256::MAX,
            ..op()
        };
        assert!(matches!(
            required_gas(&saturated),
            Err(OperationError::ArithmeticOverflow(_))
        ));
    }

    #[test]
    fn prefund_overflow_is_rejected() {
        let expensive = UserOperation {
            call_gas_limit: U256::MAX / 2,
            max_fee_per_gas: U256::MAX,
            ..op()
        };
        assert!(matches!(
            required_prefund(&expensive),
            Err(OperationError::ArithmeticOverflow(_))
        ));
    }
}
