//! Default filling and assembly of operations.
//!
//! Two default tables exist on purpose: the wallet-level table used when
//! finalizing a [`SafeOperation`] and the wire-level table used when a
//! [`UserOperation`] is built from a partial template. Their magnitudes
//! differ (the executor layer carries its own safety margin) and both are
//! compatibility surfaces, so they must not be unified.

use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Bytes, U256};
use tracing::debug;

use crate::calls::{CallEncoder, ExecutorSelector};
use crate::eip712::Eip712Domain;
use crate::error::OperationError;
use crate::signer::sign_safe_op;
use crate::types::{
    CallKind, SafeOperation, SafeOperationOverrides, SafeOperationTemplate, SafeSignature,
    UserOperation,
};

/// Gas and fee fallback values for one layer of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasDefaults {
    pub call_gas_limit: U256,
    pub verification_gas_limit: U256,
    pub pre_verification_gas: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
}

/// Wallet-level defaults. `max_fee_per_gas == max_priority_fee_per_gas`
/// keeps the effective gas price independent of the dynamic base fee, which
/// makes prefund checks reproducible.
pub const SAFE_OP_DEFAULTS: GasDefaults = GasDefaults {
    call_gas_limit: U256([2_000_000, 0, 0, 0]),
    verification_gas_limit: U256([500_000, 0, 0, 0]),
    pre_verification_gas: U256([60_000, 0, 0, 0]),
    max_fee_per_gas: U256([10_000_000_000, 0, 0, 0]),
    max_priority_fee_per_gas: U256([10_000_000_000, 0, 0, 0]),
};

/// Wire-level defaults, applied when a template field is still unset at
/// wire-build time. Deliberately different from [`SAFE_OP_DEFAULTS`].
pub const USER_OP_DEFAULTS: GasDefaults = GasDefaults {
    call_gas_limit: U256([2_000_000, 0, 0, 0]),
    verification_gas_limit: U256([300_000, 0, 0, 0]),
    pre_verification_gas: U256([50_000, 0, 0, 0]),
    max_fee_per_gas: U256([5_000_000_000, 0, 0, 0]),
    max_priority_fee_per_gas: U256([1_500_000_000, 0, 0, 0]),
};

/// Finalize a wallet-level operation, filling unset fields from
/// [`SAFE_OP_DEFAULTS`].
pub fn build_safe_op(template: &SafeOperationTemplate) -> SafeOperation {
    SafeOperation {
        safe: template.safe,
        nonce: template.nonce,
        entry_point: template.entry_point,
        call_data: template.call_data.clone().unwrap_or_default(),
        pre_verification_gas: template
            .pre_verification_gas
            .unwrap_or(SAFE_OP_DEFAULTS.pre_verification_gas),
        verification_gas_limit: template
            .verification_gas_limit
            .unwrap_or(SAFE_OP_DEFAULTS.verification_gas_limit),
        call_gas_limit: template
            .call_gas_limit
            .unwrap_or(SAFE_OP_DEFAULTS.call_gas_limit),
        max_fee_per_gas: template
            .max_fee_per_gas
            .unwrap_or(SAFE_OP_DEFAULTS.max_fee_per_gas),
        max_priority_fee_per_gas: template
            .max_priority_fee_per_gas
            .unwrap_or(SAFE_OP_DEFAULTS.max_priority_fee_per_gas),
    }
}

/// Build the template for an operation that performs one call through the
/// wallet's executor interface. `overrides` are merged last and win over
/// the computed fields.
#[allow(clippy::too_many_arguments)]
pub fn build_safe_op_transaction(
    encoder: &dyn CallEncoder,
    from: Address,
    to: Address,
    value: U256,
    data: Bytes,
    nonce: U256,
    entry_point: Address,
    kind: CallKind,
    bubble_revert_reason: bool,
    overrides: Option<SafeOperationOverrides>,
) -> SafeOperationTemplate {
    let selector = if bubble_revert_reason {
        ExecutorSelector::BubbleError
    } else {
        ExecutorSelector::Silent
    };
    let call_data = encoder.encode(selector, to, value, &data, kind);

    let mut template = SafeOperationTemplate::new(from, nonce, entry_point);
    template.call_data = Some(call_data);
    if let Some(overrides) = overrides {
        template.apply(overrides);
    }
    template
}

/// Fold a signed template into the wire-level record the entry point
/// consumes. Unset gas fields fall back to [`USER_OP_DEFAULTS`]; a missing
/// `init_code` becomes empty bytes, and `paymaster_and_data` starts empty
/// (sponsoring is a later, separate step).
pub fn build_user_operation(
    template: &SafeOperationTemplate,
    signature: Bytes,
    init_code: Option<Bytes>,
) -> UserOperation {
    UserOperation {
        sender: template.safe,
        nonce: template.nonce,
        init_code: init_code.unwrap_or_default(),
        call_data: template.call_data.clone().unwrap_or_default(),
        call_gas_limit: template
            .call_gas_limit
            .unwrap_or(USER_OP_DEFAULTS.call_gas_limit),
        verification_gas_limit: template
            .verification_gas_limit
            .unwrap_or(USER_OP_DEFAULTS.verification_gas_limit),
        pre_verification_gas: template
            .pre_verification_gas
            .unwrap_or(USER_OP_DEFAULTS.pre_verification_gas),
        max_fee_per_gas: template
            .max_fee_per_gas
            .unwrap_or(USER_OP_DEFAULTS.max_fee_per_gas),
        max_priority_fee_per_gas: template
            .max_priority_fee_per_gas
            .unwrap_or(USER_OP_DEFAULTS.max_priority_fee_per_gas),
        paymaster_and_data: Bytes::default(),
        signature,
    }
}

/// Concatenate signature contributions in caller-supplied order. Ordering
/// policy (e.g. sorting by signer for multi-owner wallets) is the caller's
/// concern.
pub fn build_signature_bytes(signatures: &[SafeSignature]) -> Bytes {
    let mut combined = Vec::with_capacity(signatures.iter().map(|s| s.data.len()).sum());
    for signature in signatures {
        combined.extend_from_slice(&signature.data);
    }
    Bytes::from(combined)
}

/// Full pipeline: encode the call, finalize the wallet-level operation,
/// hash and sign it under `(chain_id, entry_point)`, and emit the wire
/// record ready for submission.
#[allow(clippy::too_many_arguments)]
pub fn build_wire_operation(
    encoder: &dyn CallEncoder,
    wallet: &LocalWallet,
    chain_id: u64,
    safe: Address,
    to: Address,
    value: U256,
    data: Bytes,
    nonce: U256,
    entry_point: Address,
    kind: CallKind,
    bubble_revert_reason: bool,
    overrides: Option<SafeOperationOverrides>,
    init_code: Option<Bytes>,
) -> Result<UserOperation, OperationError> {
    let template = build_safe_op_transaction(
        encoder,
        safe,
        to,
        value,
        data,
        nonce,
        entry_point,
        kind,
        bubble_revert_reason,
        overrides,
    );
    let safe_op = build_safe_op(&template);
    let domain = Eip712Domain::new(chain_id, safe_op.entry_point);
    let signature = sign_safe_op(wallet, &domain, &safe_op)?;
    let signature_bytes = build_signature_bytes(&[signature]);

    let finalized = SafeOperationTemplate::from(&safe_op);
    let user_op = build_user_operation(&finalized, signature_bytes, init_code);
    debug!(
        sender = %user_op.sender,
        nonce = %user_op.nonce,
        signer = %wallet.address(),
        "assembled wire operation"
    );
    Ok(user_op)
}
