//! Encoding of the wallet's two executor entry points.
//!
//! The wallet contract dispatches an operation's inner call through one of
//! two fixed functions; their selectors and argument layout are a versioned
//! external contract. Everything else in the crate treats the produced
//! `callData` as opaque bytes.

use ethers::abi::{encode, Token};
use ethers::types::{Address, Bytes, U256};
use ethers::utils::id;

use crate::types::CallKind;

/// Which executor function carries the call: the silent one swallows the
/// inner revert reason, the other bubbles it up as an error string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorSelector {
    Silent,
    BubbleError,
}

impl ExecutorSelector {
    pub fn signature(self) -> &'static str {
        match self {
            ExecutorSelector::Silent => "executeUserOp(address,uint256,bytes,uint8)",
            ExecutorSelector::BubbleError => {
                "executeUserOpWithErrorString(address,uint256,bytes,uint8)"
            }
        }
    }
}

/// Injected capability that turns an intended call into executor call data.
pub trait CallEncoder {
    fn encode(
        &self,
        selector: ExecutorSelector,
        to: Address,
        value: U256,
        data: &Bytes,
        kind: CallKind,
    ) -> Bytes;
}

/// Default encoder for the Safe 4337 module's dispatch interface.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafeCallEncoder;

impl CallEncoder for SafeCallEncoder {
    fn encode(
        &self,
        selector: ExecutorSelector,
        to: Address,
        value: U256,
        data: &Bytes,
        kind: CallKind,
    ) -> Bytes {
        let mut call_data = id(selector.signature()).to_vec();
        call_data.extend_from_slice(&encode(&[
            Token::Address(to),
            Token::Uint(value),
            Token::Bytes(data.to_vec()),
            Token::Uint(U256::from(kind as u8)),
        ]));
        Bytes::from(call_data)
    }
}
