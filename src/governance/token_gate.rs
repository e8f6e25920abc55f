//! Token gate constraint (spec.md §4.F #2): no external blockchain read in
//! the simulated model; a real deployment plugs a verifier in behind this
//! same yes/no interface.

use crate::wallet::WalletState;

pub fn check(required_token: &str, min_balance: u64, wallet: &WalletState) -> bool {
    wallet.token_balance(required_token) >= min_balance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_when_balance_meets_minimum() {
        let mut w = WalletState::default();
        w.tokens.insert("GATE".into(), 5);
        assert!(check("GATE", 5, &w));
        assert!(!check("GATE", 6, &w));
    }
}
