//! Translate - External transactions to prepared transaction data
//!
//! ```text
//! ExternalTransaction
//!   ├── outputs()        ──► JSON bytes ──► Output ──► InputSigningData (one per output)
//!   └── essence_bytes()  ──► 0x-hex ──► TransactionEssence { networkId: "" }
//! ```

use crate::error::{Error, Result};
use crate::types::{
    Bip32Chain, CoinType, InputSigningData, Output, PreparedTransactionData, TransactionEssence, HD_WALLET_TYPE,
};
use serde::Serialize;
use std::fmt::Display;

/// Transaction model from another library.
pub trait ExternalTransaction {
    type Output: Serialize;
    type EncodeError: Display;

    fn outputs(&self) -> &[Self::Output];

    /// Canonical encoding of the signable part, without validation.
    fn essence_bytes(&self) -> std::result::Result<Vec<u8>, Self::EncodeError>;
}

/// Builds the prepared data for a signing request.
pub fn try_translate<T: ExternalTransaction + ?Sized>(transaction: &T) -> Result<PreparedTransactionData> {
    let inputs_data = transaction
        .outputs()
        .iter()
        .enumerate()
        .map(|(index, output)| {
            let bytes = serde_json::to_vec(output).map_err(|source| Error::OutputEncoding { index, source })?;
            let output: Output =
                serde_json::from_slice(&bytes).map_err(|source| Error::OutputEncoding { index, source })?;
            Ok(InputSigningData::new(output))
        })
        .collect::<Result<Vec<_>>>()?;

    let essence = transaction
        .essence_bytes()
        .map_err(|e| Error::EssenceEncoding(e.to_string()))?;

    Ok(PreparedTransactionData {
        essence: TransactionEssence::regular("", format!("0x{}", hex::encode(essence))),
        inputs_data,
    })
}

/// Like [`try_translate`].
///
/// # Panics
/// If the essence cannot be encoded, or if an output has no JSON form. Either way
/// the transaction cannot be signed.
pub fn translate<T: ExternalTransaction + ?Sized>(transaction: &T) -> PreparedTransactionData {
    match try_translate(transaction) {
        Ok(prepared) => prepared,
        Err(err) => panic!("transaction translation failed: {err}"),
    }
}

/// `(44, coin_type, account, change, address)` where change is 1 for internal addresses.
pub fn build_derivation_path(coin_type: CoinType, account_index: u32, internal: bool, address_index: u32) -> Bip32Chain {
    Bip32Chain([HD_WALLET_TYPE, coin_type.into(), account_index, u32::from(internal), address_index])
}

#[cfg(feature = "bitcoin")]
mod bitcoin_impl {
    use super::ExternalTransaction;
    use bitcoin::{ScriptBuf, Transaction, TxOut, Witness};
    use std::convert::Infallible;

    /// The essence is the transaction with every script sig and witness cleared.
    impl ExternalTransaction for Transaction {
        type Output = TxOut;
        type EncodeError = Infallible;

        fn outputs(&self) -> &[TxOut] {
            &self.output
        }

        fn essence_bytes(&self) -> Result<Vec<u8>, Infallible> {
            let mut unsigned = self.clone();
            for input in &mut unsigned.input {
                input.script_sig = ScriptBuf::new();
                input.witness = Witness::new();
            }
            Ok(bitcoin::consensus::encode::serialize(&unsigned))
        }
    }
}
