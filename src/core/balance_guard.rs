//! Balance guard: non-negativity protection for reversal debits
//!
//! Deliberately stateless and side-effect-free so it can be unit-tested
//! independent of storage. The engine consults the guard before buffering the
//! merchant debit, never after.

use rust_decimal::Decimal;

/// Whether `current_balance` can absorb a debit of `amount` without going
/// negative
///
/// This is the whole of invariant I3: a merchant balance never goes negative
/// as a result of a reversal.
pub fn can_debit(current_balance: Decimal, amount: Decimal) -> bool {
    current_balance >= amount
}
