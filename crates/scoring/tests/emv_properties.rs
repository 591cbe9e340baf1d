use futuretree_scoring::{
    apply_what_if_adjustments, breakeven_probability, calculate_emv, calculate_what_if, EmvInput,
    WhatIfAdjustments,
};
use proptest::prelude::*;

fn money() -> impl Strategy<Value = f64> {
    0.0f64..1_000_000.0
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * (1.0 + a.abs().max(b.abs()))
}

proptest! {
    #[test]
    fn certain_failure_loses_the_cost(revenue in money(), cost in money()) {
        let result = calculate_emv(&EmvInput { success_probability: 0.0, estimated_revenue: revenue, cost });
        prop_assert!(close(result.emv, -cost));
    }

    #[test]
    fn certain_success_earns_the_revenue(revenue in money(), cost in money()) {
        let result = calculate_emv(&EmvInput { success_probability: 1.0, estimated_revenue: revenue, cost });
        prop_assert!(close(result.emv, revenue));
    }

    #[test]
    fn emv_is_linear_in_probability(p in 0.0f64..=1.0, revenue in money(), cost in money()) {
        let result = calculate_emv(&EmvInput { success_probability: p, estimated_revenue: revenue, cost });
        let expected = -cost + p * (revenue + cost);
        prop_assert!(close(result.emv, expected));
        prop_assert!(close(result.emv, result.success_value - result.failure_loss));
    }

    #[test]
    fn emv_is_zero_at_breakeven(revenue in 1.0f64..1_000_000.0, cost in 1.0f64..1_000_000.0) {
        let p = breakeven_probability(revenue, cost);
        prop_assert!((0.0..=1.0).contains(&p));
        let result = calculate_emv(&EmvInput { success_probability: p, estimated_revenue: revenue, cost });
        prop_assert!(result.emv.abs() <= 1e-6 * (revenue + cost));
    }

    #[test]
    fn zero_adjustments_change_nothing(p in 0.0f64..=1.0, revenue in money(), cost in money()) {
        let base = EmvInput { success_probability: p, estimated_revenue: revenue, cost };
        let result = calculate_what_if(&base, &WhatIfAdjustments::default());
        prop_assert_eq!(result.emv_change, 0.0);
        prop_assert_eq!(result.emv_change_pct, 0.0);
        prop_assert_eq!(result.adjusted_input, base);
    }

    #[test]
    fn adjusted_inputs_stay_in_range(
        p in 0.0f64..=1.0,
        cost in money(),
        cost_pct in -200.0f64..200.0,
        pts in -150.0f64..150.0,
    ) {
        let base = EmvInput { success_probability: p, estimated_revenue: 10_000.0, cost };
        let adjusted = apply_what_if_adjustments(&base, &WhatIfAdjustments {
            cost_delta_pct: cost_pct,
            probability_delta_pts: pts,
            timeline_delta_weeks: 0.0,
        });
        prop_assert!(adjusted.cost >= 0.0);
        prop_assert!((0.0..=1.0).contains(&adjusted.success_probability));
        if pts != 0.0 {
            prop_assert!((0.01..=0.99).contains(&adjusted.success_probability));
        }
        prop_assert_eq!(adjusted.estimated_revenue, 10_000.0);
    }
}
