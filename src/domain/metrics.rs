//! Summary statistics over an equity curve and its trade ledger.

use serde::Serialize;

use super::portfolio::EquityPoint;
use super::position::ClosedTrade;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub total_return: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: i64,
    pub total_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub win_rate: f64,
    pub avg_trade_return_pct: f64,
    pub avg_holding_days: f64,
}

impl Metrics {
    pub fn compute(equity_curve: &[EquityPoint], trades: &[ClosedTrade]) -> Self {
        let total_return = match (equity_curve.first(), equity_curve.last()) {
            (Some(first), Some(last)) if first.value > 0.0 => {
                (last.value - first.value) / first.value
            }
            _ => 0.0,
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(equity_curve);

        let trades_won = trades.iter().filter(|t| t.exit_price > t.entry_price).count();
        let trades_lost = trades.iter().filter(|t| t.exit_price < t.entry_price).count();
        let total_trades = trades.len();

        let win_rate = if total_trades > 0 {
            trades_won as f64 / total_trades as f64
        } else {
            0.0
        };

        let avg_trade_return_pct = if total_trades > 0 {
            trades.iter().map(ClosedTrade::return_pct).sum::<f64>() / total_trades as f64
        } else {
            0.0
        };

        let avg_holding_days = if total_trades > 0 {
            trades.iter().map(|t| t.holding_days() as f64).sum::<f64>() / total_trades as f64
        } else {
            0.0
        };

        Metrics {
            total_return,
            max_drawdown,
            max_drawdown_duration,
            total_trades,
            trades_won,
            trades_lost,
            win_rate,
            avg_trade_return_pct,
            avg_holding_days,
        }
    }
}

/// Largest peak-to-trough fall (fraction of peak) and the longest run of
/// points spent below a prior peak.
fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, i64) {
    let Some(first) = equity_curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.value;
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0i64;
    let mut current_dd_duration = 0i64;

    for point in equity_curve {
        if point.value >= peak {
            peak = point.value;
            current_dd_duration = 0;
        } else if peak > 0.0 {
            let dd = (peak - point.value) / peak;
            max_dd = max_dd.max(dd);
            current_dd_duration += 1;
            max_dd_duration = max_dd_duration.max(current_dd_duration);
        }
    }

    (max_dd, max_dd_duration)
}
