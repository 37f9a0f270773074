use ethers::types::{Address, Bytes, U256};
use ethers::utils::to_checksum;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::OperationError;

/// Wallet-level operation, the record that gets hashed and signed.
///
/// Field order mirrors the `SafeOp` typed-data schema; every field is
/// concrete once built (defaults applied by [`crate::builder::build_safe_op`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeOperation {
    pub safe: Address,
    pub call_data: Bytes,
    pub nonce: U256,
    pub pre_verification_gas: U256,
    pub verification_gas_limit: U256,
    pub call_gas_limit: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    pub entry_point: Address,
}

/// Partial input for a [`SafeOperation`]: `safe`, `nonce` and `entry_point`
/// are mandatory, everything else falls back to a default table.
///
/// Numeric fields deserialize from decimal text, `0x`-hex text, or JSON
/// numbers, without precision loss up to 2^256-1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeOperationTemplate {
    pub safe: Address,
    #[serde(deserialize_with = "deserialize_uint")]
    pub nonce: U256,
    pub entry_point: Address,
    #[serde(default)]
    pub call_data: Option<Bytes>,
    #[serde(default, deserialize_with = "deserialize_opt_uint")]
    pub pre_verification_gas: Option<U256>,
    #[serde(default, deserialize_with = "deserialize_opt_uint")]
    pub verification_gas_limit: Option<U256>,
    #[serde(default, deserialize_with = "deserialize_opt_uint")]
    pub call_gas_limit: Option<U256>,
    #[serde(default, deserialize_with = "deserialize_opt_uint")]
    pub max_fee_per_gas: Option<U256>,
    #[serde(default, deserialize_with = "deserialize_opt_uint")]
    pub max_priority_fee_per_gas: Option<U256>,
}

impl SafeOperationTemplate {
    pub fn new(safe: Address, nonce: U256, entry_point: Address) -> Self {
        Self {
            safe,
            nonce,
            entry_point,
            call_data: None,
            pre_verification_gas: None,
            verification_gas_limit: None,
            call_gas_limit: None,
            max_fee_per_gas: None,
            max_priority_fee_per_gas: None,
        }
    }

    /// Merge `overrides` into the template. Set overrides always win,
    /// including over the mandatory fields.
    pub fn apply(&mut self, overrides: SafeOperationOverrides) {
        if let Some(safe) = overrides.safe {
            self.safe = safe;
        }
        if let Some(nonce) = overrides.nonce {
            self.nonce = nonce;
        }
        if let Some(entry_point) = overrides.entry_point {
            self.entry_point = entry_point;
        }
        if let Some(call_data) = overrides.call_data {
            self.call_data = Some(call_data);
        }
        if let Some(v) = overrides.pre_verification_gas {
            self.pre_verification_gas = Some(v);
        }
        if let Some(v) = overrides.verification_gas_limit {
            self.verification_gas_limit = Some(v);
        }
        if let Some(v) = overrides.call_gas_limit {
            self.call_gas_limit = Some(v);
        }
        if let Some(v) = overrides.max_fee_per_gas {
            self.max_fee_per_gas = Some(v);
        }
        if let Some(v) = overrides.max_priority_fee_per_gas {
            self.max_priority_fee_per_gas = Some(v);
        }
    }
}

impl From<&SafeOperation> for SafeOperationTemplate {
    fn from(op: &SafeOperation) -> Self {
        Self {
            safe: op.safe,
            nonce: op.nonce,
            entry_point: op.entry_point,
            call_data: Some(op.call_data.clone()),
            pre_verification_gas: Some(op.pre_verification_gas),
            verification_gas_limit: Some(op.verification_gas_limit),
            call_gas_limit: Some(op.call_gas_limit),
            max_fee_per_gas: Some(op.max_fee_per_gas),
            max_priority_fee_per_gas: Some(op.max_priority_fee_per_gas),
        }
    }
}

/// Caller-supplied overrides applied last when assembling an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeOperationOverrides {
    #[serde(default)]
    pub safe: Option<Address>,
    #[serde(default, deserialize_with = "deserialize_opt_uint")]
    pub nonce: Option<U256>,
    #[serde(default)]
    pub entry_point: Option<Address>,
    #[serde(default)]
    pub call_data: Option<Bytes>,
    #[serde(default, deserialize_with = "deserialize_opt_uint")]
    pub pre_verification_gas: Option<U256>,
    #[serde(default, deserialize_with = "deserialize_opt_uint")]
    pub verification_gas_limit: Option<U256>,
    #[serde(default, deserialize_with = "deserialize_opt_uint")]
    pub call_gas_limit: Option<U256>,
    #[serde(default, deserialize_with = "deserialize_opt_uint")]
    pub max_fee_per_gas: Option<U256>,
    #[serde(default, deserialize_with = "deserialize_opt_uint")]
    pub max_priority_fee_per_gas: Option<U256>,
}

/// Wire-level operation, the record the entry point consumes.
///
/// `U256` fields serialize as minimal `0x`-prefixed hex and byte fields as
/// `0x`-prefixed hex (empty value is exactly `"0x"`), which is the format
/// bundler endpoints expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    pub sender: Address,
    pub nonce: U256,
    pub init_code: Bytes,
    pub call_data: Bytes,
    pub call_gas_limit: U256,
    pub verification_gas_limit: U256,
    pub pre_verification_gas: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    pub paymaster_and_data: Bytes,
    pub signature: Bytes,
}

/// One signer's contribution to an operation signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeSignature {
    pub signer: Address,
    pub data: Bytes,
}

/// How the wallet dispatches the inner call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum CallKind {
    #[default]
    Call = 0,
    DelegateCall = 1,
}

/// Parse a non-negative 256-bit integer from decimal or `0x`-hex text.
pub fn parse_uint(field: &str, text: &str) -> Result<U256, OperationError> {
    let trimmed = text.trim();
    let (digits, radix) = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex_digits) => (hex_digits, 16),
        None => (trimmed, 10),
    };
    if digits.is_empty() {
        return Err(OperationError::invalid_field(field, "empty numeric value"));
    }
    U256::from_str_radix(digits, radix)
        .map_err(|err| OperationError::invalid_field(field, err.to_string()))
}

/// Minimal big-endian hex rendering of a 256-bit integer (`0` is `"0x0"`).
pub fn to_min_hex(value: U256) -> String {
    format!("{value:#x}")
}

/// Parse an address string, enforcing the EIP-55 checksum when the input
/// is mixed-case. Lowercase inputs are accepted and normalized.
pub fn parse_checksummed(text: &str) -> Result<Address, OperationError> {
    let address: Address = text
        .parse()
        .map_err(|err| OperationError::MalformedResponse(format!("{text}: {err}")))?;
    let body = text.strip_prefix("0x").unwrap_or(text);
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    if has_upper && has_lower && to_checksum(&address, None) != format!("0x{body}") {
        return Err(OperationError::MalformedResponse(format!(
            "{text}: checksum mismatch"
        )));
    }
    Ok(address)
}

fn deserialize_uint<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    match UintRepr::deserialize(deserializer)? {
        UintRepr::Number(n) => Ok(U256::from(n)),
        UintRepr::Text(t) => parse_uint("uint256", &t).map_err(de::Error::custom),
    }
}

fn deserialize_opt_uint<'de, D>(deserializer: D) -> Result<Option<U256>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<UintRepr>::deserialize(deserializer)?
        .map(|repr| match repr {
            UintRepr::Number(n) => Ok(U256::from(n)),
            UintRepr::Text(t) => parse_uint("uint256", &t).map_err(de::Error::custom),
        })
        .transpose()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UintRepr {
    Number(u64),
    Text(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const UINT256_MAX_DEC: &str =
        "115792089237316195423570985008687907853269984665640564039457584007913129639935";

    #[test]
    fn parses_decimal_and_hex() {
        assert_eq!(parse_uint("n", "0").unwrap(), U256::zero());
        assert_eq!(parse_uint("n", "2000000").unwrap(), U256::from(2_000_000u64));
        assert_eq!(parse_uint("n", "0x271000").unwrap(), U256::from(2_560_000u64));
        assert_eq!(parse_uint("n", "0x0").unwrap(), U256::zero());
        assert_eq!(parse_uint("n", UINT256_MAX_DEC).unwrap(), U256::MAX);
    }

    #[test]
    fn rejects_malformed_numbers() {
        for bad in ["", "0x", "-5", "12abc", "0xzz", "1.5"] {
            assert!(
                matches!(
                    parse_uint("nonce", bad),
                    Err(OperationError::InvalidField { .. })
                ),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn rejects_overflowing_decimal() {
        // 2^256, one past the representable range
        let too_big =
            "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert!(parse_uint("n", too_big).is_err());
    }

    #[test]
    fn min_hex_round_trips() {
        for value in [
            U256::zero(),
            U256::one(),
            U256::from(2_560_000u64),
            U256::from(10_000_000_000u64),
            U256::MAX,
        ] {
            let encoded = to_min_hex(value);
            assert!(encoded.starts_with("0x"));
            assert_eq!(parse_uint("n", &encoded).unwrap(), value);
        }
        assert_eq!(to_min_hex(U256::zero()), "0x0");
        assert_eq!(to_min_hex(U256::from(2_560_000u64)), "0x271000");
    }

    #[test]
    fn wire_fields_serialize_as_minimal_hex() {
        let op = UserOperation {
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
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["nonce"], "0x0");
        assert_eq!(json["callGasLimit"], "0x1e8480");
        assert_eq!(json["maxFeePerGas"], "0x2540be400");
        assert_eq!(json["initCode"], "0x");
        assert_eq!(json["paymasterAndData"], "0x");
        assert_eq!(json["signature"], "0x");

        let back: UserOperation = serde_json::from_value(json).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn template_accepts_decimal_text_fields() {
        let template: SafeOperationTemplate = serde_json::from_value(serde_json::json!({
            "safe": "0x1111111111111111111111111111111111111111",
            "nonce": "0",
            "entryPoint": "0x2222222222222222222222222222222222222222",
            "callGasLimit": "2000000",
            "maxFeePerGas": "0x2540be400",
            "verificationGasLimit": 500000u64,
        }))
        .unwrap();
        assert_eq!(template.nonce, U256::zero());
        assert_eq!(template.call_gas_limit, Some(U256::from(2_000_000u64)));
        assert_eq!(template.max_fee_per_gas, Some(U256::from(10_000_000_000u64)));
        assert_eq!(template.verification_gas_limit, Some(U256::from(500_000u64)));
        assert_eq!(template.pre_verification_gas, None);
    }

    #[test]
    fn checksummed_addresses_accepted() {
        let canonical = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        let parsed = parse_checksummed(canonical).unwrap();
        assert_eq!(to_checksum(&parsed, None), canonical);

        // lowercase input is accepted and maps to the same address
        let lower = parse_checksummed("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(lower, parsed);
    }

    #[test]
    fn bad_checksum_rejected() {
        let flipped = "0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert!(matches!(
            parse_checksummed(flipped),
            Err(OperationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn non_address_rejected() {
        for bad in ["0x1234", "not-an-address", "0xgggggggggggggggggggggggggggggggggggggggg"] {
            assert!(parse_checksummed(bad).is_err(), "accepted {bad:?}");
        }
    }
}
