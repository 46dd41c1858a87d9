// src/utils/precision.rs
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Whole shares affordable with `budget` at `price`, rounded down.
/// Example: budget=1000, price=227.52 -> 4
pub fn whole_shares(budget: Decimal, price: Decimal) -> u64 {
    if price <= Decimal::ZERO || budget <= Decimal::ZERO {
        return 0;
    }
    (budget / price).floor().to_u64().unwrap_or(0)
}

/// Rounds a money amount to cents (banker's rounding, as rust_decimal does).
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn whole_shares_rounds_down() {
        let price = Decimal::from_str("227.52").unwrap();
        assert_eq!(whole_shares(Decimal::from(1000), price), 4);
        assert_eq!(whole_shares(Decimal::from(100), price), 0);
        assert_eq!(whole_shares(Decimal::from(100), Decimal::ZERO), 0);
    }

    #[test]
    fn round_cents_keeps_two_places() {
        let v = Decimal::from_str("2.236").unwrap();
        assert_eq!(round_cents(v), Decimal::from_str("2.24").unwrap());
    }
}
