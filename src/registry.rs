//! The boundary to the external entry point: the registry query for
//! supported verifying contracts, the submission trait, and the mapping of
//! the verifier's revert reasons onto the local error taxonomy.

use async_trait::async_trait;
use ethers::providers::{JsonRpcClient, Provider, ProviderError};
use ethers::types::{Address, H256, U256};
use ethers::utils::to_checksum;
use tracing::{debug, info};

use crate::error::OperationError;
use crate::types::{parse_checksummed, UserOperation};

/// Submission interface to the verifier/executor contract. Implementations
/// are external collaborators; the core only defines the call shape and
/// reports outcomes. No retry lives here: a rejected operation needs a
/// caller decision (usually re-signing) before it can be sent again.
#[async_trait]
pub trait OperationExecutor {
    async fn execute_operation(
        &self,
        op: &UserOperation,
        fee_recipient_payment: U256,
    ) -> Result<H256, OperationError>;
}

/// Fetch the verifying contracts the target node currently supports.
///
/// Fails with [`OperationError::UnreachableEndpoint`] when the transport
/// cannot deliver the call and [`OperationError::MalformedResponse`] when
/// the response is not a list of well-formed addresses.
pub async fn get_supported_entry_points<P: JsonRpcClient>(
    provider: &Provider<P>,
) -> Result<Vec<Address>, OperationError> {
    let raw: Vec<String> = provider
        .request("eth_supportedEntryPoints", ())
        .await
        .map_err(|err| match err {
            ProviderError::SerdeJson(err) => OperationError::MalformedResponse(err.to_string()),
            other => OperationError::UnreachableEndpoint(other.to_string()),
        })?;
    info!(count = raw.len(), "fetched supported entry points");
    let entry_points = normalize_entry_points(&raw)?;
    for entry_point in &entry_points {
        debug!(entry_point = %to_checksum(entry_point, None), "supported entry point");
    }
    Ok(entry_points)
}

/// Validate and parse every returned entry; one malformed address fails the
/// whole response.
pub fn normalize_entry_points(raw: &[String]) -> Result<Vec<Address>, OperationError> {
    raw.iter().map(|entry| parse_checksummed(entry)).collect()
}

/// Map a revert reason surfaced by the entry point onto the error taxonomy.
/// The reason text is preserved verbatim; nothing is re-validated locally.
pub fn classify_revert(reason: &str) -> OperationError {
    if reason.contains("Signature validation failed") {
        OperationError::SignatureValidationFailed(reason.to_string())
    } else if let Some(nonce) = reason
        .strip_prefix("InvalidNonce(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        OperationError::ReplayedNonce(nonce.to_string())
    } else {
        OperationError::ExecutionReverted(reason.to_string())
    }
}
