//! Helpers for order-log derived metrics.

use meridian_types::Order;

/// Win rate over realizing orders.
///
/// Only orders that realized PnL (reducing fills) count toward the
/// population; pure position adds are neither wins nor losses.
#[must_use]
pub fn compute_win_rate(orders: &[Order]) -> f64 {
    let mut wins = 0u64;
    let mut realizing = 0u64;

    for order in orders {
        if order.realized_pnl > 0.0 {
            wins += 1;
            realizing += 1;
        } else if order.realized_pnl < 0.0 {
            realizing += 1;
        }
    }

    if realizing == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let rate = wins as f64 / realizing as f64;
    rate
}

/// Total commission and absolute slippage cost paid.
#[must_use]
pub fn compute_total_costs(orders: &[Order]) -> (f64, f64) {
    let commission: f64 = orders.iter().map(|o| o.commission).sum();
    let slippage: f64 = orders
        .iter()
        .map(|o| o.slippage.abs() * o.delta_qty.abs())
        .sum();
    (commission, slippage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn order(realized_pnl: f64) -> Order {
        Order {
            timestamp_ns: 0,
            symbol: "BTC".to_string(),
            delta_qty: 1.0,
            reference_price: 100.0,
            fill_price: 100.0,
            commission: 0.5,
            slippage: 0.1,
            realized_pnl,
        }
    }

    #[test]
    fn test_win_rate_counts_only_realizing_orders() {
        let orders = vec![order(10.0), order(-5.0), order(0.0), order(3.0)];
        // 2 wins out of 3 realizing orders; the pure add is excluded
        assert_relative_eq!(compute_win_rate(&orders), 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_win_rate_no_realizing_orders() {
        let orders = vec![order(0.0), order(0.0)];
        assert_relative_eq!(compute_win_rate(&orders), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_total_costs() {
        let orders = vec![order(0.0), order(1.0)];
        let (commission, slippage) = compute_total_costs(&orders);
        assert_relative_eq!(commission, 1.0, epsilon = 1e-12);
        assert_relative_eq!(slippage, 0.2, epsilon = 1e-12);
    }
}
