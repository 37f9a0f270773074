//! Build, hash, and sign ERC-4337 user operations for Safe-style smart
//! accounts.
//!
//! The pipeline runs caller intent to submittable record: encode the inner
//! call ([`calls`]), finalize the wallet-level [`types::SafeOperation`] with
//! its default table ([`builder`]), compute the domain-separated digest
//! ([`eip712`]), sign it ([`signer`]), and fold everything into the
//! wire-level [`types::UserOperation`] ([`builder::build_user_operation`]).
//! [`gas`] answers how much value the sender must pre-fund, and
//! [`registry`] talks to the external entry point.
//!
//! All computation is pure and synchronous except key access and the entry
//! point query; operations are immutable once built and no nonce or replay
//! state is tracked locally.

pub mod builder;
pub mod calls;
pub mod eip712;
pub mod error;
pub mod gas;
pub mod registry;
pub mod signer;
pub mod types;

pub use builder::{
    build_safe_op, build_safe_op_transaction, build_signature_bytes, build_user_operation,
    build_wire_operation, GasDefaults, SAFE_OP_DEFAULTS, USER_OP_DEFAULTS,
};
pub use calls::{CallEncoder, ExecutorSelector, SafeCallEncoder};
pub use eip712::{safe_operation_hash, Eip712Domain, SAFE_OP_TYPE};
pub use error::OperationError;
pub use gas::{required_gas, required_prefund};
pub use registry::{classify_revert, get_supported_entry_points, OperationExecutor};
pub use signer::sign_safe_op;
pub use types::{
    CallKind, SafeOperation, SafeOperationOverrides, SafeOperationTemplate, SafeSignature,
    UserOperation,
};
