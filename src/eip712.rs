//! Generic EIP-712 structured-record hashing.
//!
//! The hasher is schema-driven: a [`TypeSchema`] is an explicit ordered list
//! of named, typed fields, and the digest is computed from the schema plus a
//! matching value list. Keeping the schema first-class (rather than
//! hand-rolled concatenation) makes the encoding auditable against known
//! vectors and keeps field order, the part the verifier is most sensitive
//! to, in one place.

use ethers::types::{Address, Bytes, H256, U256};
use ethers::utils::keccak256;

use crate::error::OperationError;
use crate::types::SafeOperation;

pub const EIP712_DOMAIN_TYPE: &str = "EIP712Domain(uint256 chainId,address verifyingContract)";

/// Signing domain: the digest is bound to one chain and one verifying
/// contract, so a signature cannot be replayed across either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eip712Domain {
    pub chain_id: U256,
    pub verifying_contract: Address,
}

impl Eip712Domain {
    pub fn new(chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            chain_id: U256::from(chain_id),
            verifying_contract,
        }
    }

    pub fn separator(&self) -> H256 {
        let mut encoded = Vec::with_capacity(96);
        encoded.extend_from_slice(&keccak256(EIP712_DOMAIN_TYPE.as_bytes()));
        encoded.extend_from_slice(&uint_word(self.chain_id));
        encoded.extend_from_slice(&address_word(self.verifying_contract));
        H256::from(keccak256(encoded))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Address,
    Uint256,
    Bytes,
}

impl FieldType {
    fn solidity_name(self) -> &'static str {
        match self {
            FieldType::Address => "address",
            FieldType::Uint256 => "uint256",
            FieldType::Bytes => "bytes",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
}

#[derive(Debug, Clone, Copy)]
pub struct TypeSchema {
    pub name: &'static str,
    pub fields: &'static [Field],
}

/// The `SafeOp` schema. Field order is part of the wire contract with the
/// verifying module; reordering changes every digest.
pub const SAFE_OP_TYPE: TypeSchema = TypeSchema {
    name: "SafeOp",
    fields: &[
        Field { name: "safe", ty: FieldType::Address },
        Field { name: "callData", ty: FieldType::Bytes },
        Field { name: "nonce", ty: FieldType::Uint256 },
        Field { name: "preVerificationGas", ty: FieldType::Uint256 },
        Field { name: "verificationGasLimit", ty: FieldType::Uint256 },
        Field { name: "callGasLimit", ty: FieldType::Uint256 },
        Field { name: "maxFeePerGas", ty: FieldType::Uint256 },
        Field { name: "maxPriorityFeePerGas", ty: FieldType::Uint256 },
        Field { name: "entryPoint", ty: FieldType::Address },
    ],
};

/// One field value paired positionally with the schema.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Address(Address),
    Uint(U256),
    Bytes(&'a [u8]),
}

impl FieldValue<'_> {
    fn ty(&self) -> FieldType {
        match self {
            FieldValue::Address(_) => FieldType::Address,
            FieldValue::Uint(_) => FieldType::Uint256,
            FieldValue::Bytes(_) => FieldType::Bytes,
        }
    }
}

impl TypeSchema {
    /// `Name(type1 name1,type2 name2,...)`, the preimage of the type hash.
    pub fn encode_type(&self) -> String {
        let args = self
            .fields
            .iter()
            .map(|field| format!("{} {}", field.ty.solidity_name(), field.name))
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({})", self.name, args)
    }

    pub fn type_hash(&self) -> H256 {
        H256::from(keccak256(self.encode_type().as_bytes()))
    }

    /// `keccak256(typeHash || word(v1) || ... || word(vn))` where dynamic
    /// `bytes` values contribute their own keccak hash.
    pub fn struct_hash(&self, values: &[FieldValue<'_>]) -> Result<H256, OperationError> {
        if values.len() != self.fields.len() {
            return Err(OperationError::invalid_field(
                self.name,
                format!(
                    "schema has {} fields but {} values were supplied",
                    self.fields.len(),
                    values.len()
                ),
            ));
        }
        let mut encoded = Vec::with_capacity(32 * (values.len() + 1));
        encoded.extend_from_slice(self.type_hash().as_bytes());
        for (field, value) in self.fields.iter().zip(values) {
            if value.ty() != field.ty {
                return Err(OperationError::invalid_field(
                    field.name,
                    format!(
                        "expected {} value, got {}",
                        field.ty.solidity_name(),
                        value.ty().solidity_name()
                    ),
                ));
            }
            let word = match value {
                FieldValue::Address(address) => address_word(*address),
                FieldValue::Uint(value) => uint_word(*value),
                FieldValue::Bytes(bytes) => keccak256(bytes),
            };
            encoded.extend_from_slice(&word);
        }
        Ok(H256::from(keccak256(encoded)))
    }
}

/// Full EIP-712 digest: `keccak256(0x1901 || domainSeparator || structHash)`.
pub fn typed_data_digest(
    domain: &Eip712Domain,
    schema: &TypeSchema,
    values: &[FieldValue<'_>],
) -> Result<H256, OperationError> {
    let mut encoded = Vec::with_capacity(66);
    encoded.extend_from_slice(&[0x19, 0x01]);
    encoded.extend_from_slice(domain.separator().as_bytes());
    encoded.extend_from_slice(schema.struct_hash(values)?.as_bytes());
    Ok(H256::from(keccak256(encoded)))
}

/// The digest a signer commits to for one wallet-level operation.
pub fn safe_operation_hash(
    domain: &Eip712Domain,
    op: &SafeOperation,
) -> Result<H256, OperationError> {
    typed_data_digest(
        domain,
        &SAFE_OP_TYPE,
        &[
            FieldValue::Address(op.safe),
            FieldValue::Bytes(&op.call_data),
            FieldValue::Uint(op.nonce),
            FieldValue::Uint(op.pre_verification_gas),
            FieldValue::Uint(op.verification_gas_limit),
            FieldValue::Uint(op.call_gas_limit),
            FieldValue::Uint(op.max_fee_per_gas),
            FieldValue::Uint(op.max_priority_fee_per_gas),
            FieldValue::Address(op.entry_point),
        ],
    )
}

/// Tightly packed hash of `(callData, nonce, entryPoint, chainId)`, used to
/// correlate an operation with the transaction that carried it.
pub fn intermediate_tx_hash(
    call_data: &Bytes,
    nonce: U256,
    entry_point: Address,
    chain_id: U256,
) -> H256 {
    let mut encoded = Vec::with_capacity(call_data.len() + 84);
    encoded.extend_from_slice(call_data);
    encoded.extend_from_slice(&uint_word(nonce));
    encoded.extend_from_slice(entry_point.as_bytes());
    encoded.extend_from_slice(&uint_word(chain_id));
    H256::from(keccak256(encoded))
}

fn uint_word(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

fn address_word(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}
