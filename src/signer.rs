use ethers::signers::{LocalWallet, Signer};
use ethers::types::Bytes;
use tracing::debug;

use crate::eip712::{safe_operation_hash, Eip712Domain};
use crate::error::OperationError;
use crate::types::{SafeOperation, SafeSignature};

/// Sign the operation's typed-data digest with the owner key.
///
/// The digest already carries the `0x1901` domain prefix, so it is signed
/// raw; running it through a personal-message signer would prefix it a
/// second time and the verifying contract would recover the wrong address.
pub fn sign_safe_op(
    wallet: &LocalWallet,
    domain: &Eip712Domain,
    op: &SafeOperation,
) -> Result<SafeSignature, OperationError> {
    let digest = safe_operation_hash(domain, op)?;
    let signature = wallet
        .sign_hash(digest)
        .map_err(|err| OperationError::Signer(err.to_string()))?;
    debug!(signer = %wallet.address(), digest = %digest, "signed safe operation");
    Ok(SafeSignature {
        signer: wallet.address(),
        data: Bytes::from(signature.to_vec()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::{Address, Signature, U256};

    fn wallet() -> LocalWallet {
        "4646464646464646464646464646464646464646464646464646464646464646"
            .parse()
            .unwrap()
    }

    fn op() -> SafeOperation {
        SafeOperation {
            safe: Address::repeat_byte(0x11),
            call_data: Bytes::default(),
            nonce: U256::zero(),
            pre_verification_gas: U256::from(60_000u64),
            verification_gas_limit: U256::from(500_000u64),
            call_gas_limit: U256::from(2_000_000u64),
            max_fee_per_gas: U256::from(10_000_000_000u64),
            max_priority_fee_per_gas: U256::from(10_000_000_000u64),
            entry_point: Address::repeat_byte(0x22),
        }
    }

    #[test]
    fn signature_carries_signer_identity() {
        let wallet = wallet();
        let domain = Eip712Domain::new(1, Address::repeat_byte(0x22));
        let signature = sign_safe_op(&wallet, &domain, &op()).unwrap();
        assert_eq!(signature.signer, wallet.address());
        assert_eq!(signature.data.len(), 65);
    }

    #[test]
    fn signing_is_deterministic() {
        let wallet = wallet();
        let domain = Eip712Domain::new(1, Address::repeat_byte(0x22));
        let first = sign_safe_op(&wallet, &domain, &op()).unwrap();
        let second = sign_safe_op(&wallet, &domain, &op()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn signature_recovers_over_digest() {
        let wallet = wallet();
        let domain = Eip712Domain::new(1, Address::repeat_byte(0x22));
        let operation = op();
        let signed = sign_safe_op(&wallet, &domain, &operation).unwrap();

        let digest = safe_operation_hash(&domain, &operation).unwrap();
        let signature = Signature::try_from(signed.data.as_ref()).unwrap();
        assert_eq!(signature.recover(digest).unwrap(), wallet.address());
    }

    #[test]
    fn domain_change_yields_different_signature() {
        let wallet = wallet();
        let operation = op();
        let mainnet = sign_safe_op(&wallet, &Eip712Domain::new(1, Address::repeat_byte(0x22)), &operation).unwrap();
        let other = sign_safe_op(&wallet, &Eip712Domain::new(1, Address::repeat_byte(0x99)), &operation).unwrap();
        assert_ne!(mainnet.data, other.data);
    }
}
