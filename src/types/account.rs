//! Account-related types for the ledger reversal engine
//!
//! Two balance-holding account families exist on the platform: consumer
//! wallets and merchant accounts. Both balances are non-negative invariants
//! that every engine operation must preserve.

use super::transaction::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A consumer wallet
///
/// The paying side of a payment. A reversal credits the gross payment amount
/// back to `main_balance` so the consumer is made whole for what they paid,
/// independent of any fee the merchant absorbed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumerAccount {
    /// The account id referenced by `Transaction::sender_id`
    pub id: AccountId,

    /// Spendable balance; never negative
    pub main_balance: Decimal,
}

impl ConsumerAccount {
    pub fn new(id: impl Into<AccountId>, main_balance: Decimal) -> Self {
        ConsumerAccount {
            id: id.into(),
            main_balance,
        }
    }
}

/// A merchant account
///
/// The receiving side of a payment. A reversal debits the net settled amount
/// from `balance`; the balance guard rejects the reversal outright if that
/// debit would drive the balance negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantAccount {
    /// The account id referenced by `Transaction::receiver_id`/`merchant_id`
    pub id: AccountId,

    /// Settled balance; never negative
    pub balance: Decimal,
}

impl MerchantAccount {
    pub fn new(id: impl Into<AccountId>, balance: Decimal) -> Self {
        MerchantAccount {
            id: id.into(),
            balance,
        }
    }
}
