//! Decision function: trend alignment, regime thresholds, money-flow band and
//! confirmation guards combined into a directional verdict with levels.
//!
//! Deterministic and total over a valid bundle. Evaluation order:
//! 1. Choppy regime → no signal.
//! 2. Trend alignment picks at most one direction.
//! 3. Momentum threshold, money-flow band and guards must all pass.
//! 4. Levels: stop beyond the swing extreme, target `ATR * multiplier` away.

use rust_decimal::Decimal;

use crate::config::StrategyConfig;
use crate::core::guards::evaluate_guards;
use crate::core::regime::{classify_regime, regime_thresholds};
use crate::types::{Direction, FeatureBundle, Rationale, SignalVerdict};

/// Direction allowed by the higher-timeframe trend filter.
///
/// Long needs price above both EMAs, short needs price below both. The two
/// conditions cannot hold at once.
pub fn eligible_direction(bundle: &FeatureBundle) -> Option<Direction> {
    let above = bundle.price > bundle.ema_long && bundle.price > bundle.ema_mid;
    let below = bundle.price < bundle.ema_long && bundle.price < bundle.ema_mid;
    match (above, below) {
        (true, false) => Some(Direction::Long),
        (false, true) => Some(Direction::Short),
        _ => None,
    }
}

/// Evaluate one bundle. `None` means no alert this cycle.
pub fn decide(bundle: &FeatureBundle, strategy: &StrategyConfig) -> Option<SignalVerdict> {
    let regime = classify_regime(bundle.adx, &strategy.regime);
    let thresholds = regime_thresholds(regime, &strategy.regime)?;
    let direction = eligible_direction(bundle)?;

    let guards = evaluate_guards(bundle, &strategy.guards);
    if !guards.all_pass() {
        return None;
    }

    let band = strategy.guards.mfi_band;
    let (rsi_threshold, mfi_threshold, momentum_ok) = match direction {
        Direction::Long => {
            let ceiling = thresholds.long_ceiling + guards.macro_relief;
            let mfi_ceiling = ceiling + band;
            (
                ceiling,
                mfi_ceiling,
                bundle.rsi < ceiling && bundle.mfi < mfi_ceiling,
            )
        }
        Direction::Short => {
            let floor = thresholds.short_floor;
            let mfi_floor = floor - band;
            (
                floor,
                mfi_floor,
                bundle.rsi > floor && bundle.mfi > mfi_floor,
            )
        }
    };
    if !momentum_ok {
        return None;
    }

    let (stop_loss, take_profit) = levels(bundle, direction, strategy);

    Some(SignalVerdict {
        symbol: bundle.symbol.clone(),
        direction,
        entry_price: bundle.price,
        stop_loss,
        take_profit,
        rationale: Rationale {
            regime,
            adx: bundle.adx,
            rsi: bundle.rsi,
            rsi_threshold,
            mfi: bundle.mfi,
            mfi_threshold,
            guards,
            open_interest_value: bundle.open_interest_value,
            oi_change_pct: bundle.oi_change_pct,
            macro_change_pct: bundle.macro_change_pct,
        },
    })
}

fn levels(
    bundle: &FeatureBundle,
    direction: Direction,
    strategy: &StrategyConfig,
) -> (Decimal, Decimal) {
    let lv = &strategy.levels;
    let reach = bundle.atr * lv.atr_target_multiplier;
    match direction {
        Direction::Long => (bundle.swing_low * lv.long_stop_factor, bundle.price + reach),
        Direction::Short => (bundle.swing_high * lv.short_stop_factor, bundle.price - reach),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::guards::tests::base_bundle;
    use crate::types::Regime;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn short_bundle() -> FeatureBundle {
        FeatureBundle {
            price: dec!(100),
            ema_long: dec!(105),
            ema_mid: dec!(104),
            rsi: dec!(70),
            mfi: dec!(60),
            adx: dec!(30),
            ..base_bundle()
        }
    }

    // -- Scenarios ----------------------------------------------------------

    #[test]
    fn test_super_trend_long_pullback() {
        let cfg = StrategyConfig::default();
        let b = base_bundle();
        let v = decide(&b, &cfg).expect("expected LONG");
        assert_eq!(v.direction, Direction::Long);
        assert_eq!(v.entry_price, dec!(100));
        assert_eq!(v.stop_loss, dec!(97) * dec!(0.995));
        assert_eq!(v.take_profit, dec!(100) + dec!(2) * dec!(3.5));
        assert_eq!(v.rationale.regime, Regime::SuperTrend);
        assert_eq!(v.rationale.rsi_threshold, dec!(50));
        assert_eq!(v.rationale.mfi_threshold, dec!(65));
    }

    #[test]
    fn test_choppy_vetoes_everything() {
        let cfg = StrategyConfig::default();
        let b = FeatureBundle {
            adx: dec!(20),
            ..base_bundle()
        };
        assert_eq!(decide(&b, &cfg), None);
    }

    #[test]
    fn test_oi_build_up_vetoes_long() {
        let cfg = StrategyConfig::default();
        let b = FeatureBundle {
            oi_change_pct: dec!(2.0),
            ..base_bundle()
        };
        assert_eq!(decide(&b, &cfg), None);
    }

    #[test]
    fn test_macro_relief_unlocks_normal_trend_long() {
        let cfg = StrategyConfig::default();
        let b = FeatureBundle {
            adx: dec!(30),
            rsi: dec!(38),
            mfi: dec!(50),
            macro_change_pct: dec!(-4.0),
            ..base_bundle()
        };
        let v = decide(&b, &cfg).expect("relief should lift the ceiling to 40");
        assert_eq!(v.rationale.regime, Regime::NormalTrend);
        assert_eq!(v.rationale.rsi_threshold, dec!(40));
        assert_eq!(v.rationale.mfi_threshold, dec!(55));

        // Without the sell-off the same RSI is too high for a normal trend.
        let calm = FeatureBundle {
            macro_change_pct: dec!(-1.0),
            ..b
        };
        assert_eq!(decide(&calm, &cfg), None);
    }

    #[test]
    fn test_macro_relief_does_not_apply_to_shorts() {
        let cfg = StrategyConfig::default();
        let b = FeatureBundle {
            macro_change_pct: dec!(-8.0),
            ..short_bundle()
        };
        let v = decide(&b, &cfg).unwrap();
        assert_eq!(v.direction, Direction::Short);
        assert_eq!(v.rationale.rsi_threshold, dec!(65));
    }

    #[test]
    fn test_normal_trend_short() {
        let cfg = StrategyConfig::default();
        let v = decide(&short_bundle(), &cfg).expect("expected SHORT");
        assert_eq!(v.direction, Direction::Short);
        assert_eq!(v.stop_loss, dec!(104) * dec!(1.005));
        assert_eq!(v.take_profit, dec!(100) - dec!(7));
        assert_eq!(v.rationale.mfi_threshold, dec!(50));
    }

    #[test]
    fn test_short_needs_money_flow_confirmation() {
        let cfg = StrategyConfig::default();
        let b = FeatureBundle {
            mfi: dec!(45),
            ..short_bundle()
        };
        assert_eq!(decide(&b, &cfg), None);
    }

    #[test]
    fn test_long_needs_money_flow_confirmation() {
        let cfg = StrategyConfig::default();
        let b = FeatureBundle {
            mfi: dec!(70),
            ..base_bundle()
        };
        assert_eq!(decide(&b, &cfg), None);
    }

    #[test]
    fn test_oi_guard_also_vetoes_short() {
        let cfg = StrategyConfig::default();
        let b = FeatureBundle {
            oi_change_pct: dec!(1.8),
            ..short_bundle()
        };
        assert_eq!(decide(&b, &cfg), None);
    }

    #[test]
    fn test_volume_shock_vetoes() {
        let cfg = StrategyConfig::default();
        let b = FeatureBundle {
            prev_volume: dec!(2500),
            ..base_bundle()
        };
        assert_eq!(decide(&b, &cfg), None);
    }

    #[test]
    fn test_mixed_trend_filter_is_ineligible() {
        let cfg = StrategyConfig::default();
        let b = FeatureBundle {
            ema_long: dec!(101),
            ema_mid: dec!(96),
            ..base_bundle()
        };
        assert_eq!(eligible_direction(&b), None);
        assert_eq!(decide(&b, &cfg), None);
    }

    #[test]
    fn test_rsi_at_ceiling_is_rejected() {
        let cfg = StrategyConfig::default();
        let b = FeatureBundle {
            rsi: dec!(50),
            ..base_bundle()
        };
        assert_eq!(decide(&b, &cfg), None);
    }

    // -- Properties ---------------------------------------------------------

    fn arb_bundle() -> impl Strategy<Value = FeatureBundle> {
        (
            1u32..100_000u32,
            1u32..100_000u32,
            1u32..100_000u32,
            0u32..10_000u32,
            0u32..10_000u32,
            0u32..10_000u32,
            -500i32..500i32,
            -1_000i32..1_000i32,
        )
            .prop_map(|(price, ema_l, ema_m, rsi, mfi, adx, oi, mac)| FeatureBundle {
                price: Decimal::from(price) / dec!(100),
                ema_long: Decimal::from(ema_l) / dec!(100),
                ema_mid: Decimal::from(ema_m) / dec!(100),
                rsi: Decimal::from(rsi) / dec!(100),
                mfi: Decimal::from(mfi) / dec!(100),
                adx: Decimal::from(adx) / dec!(100),
                oi_change_pct: Decimal::from(oi) / dec!(100),
                macro_change_pct: Decimal::from(mac) / dec!(100),
                ..base_bundle()
            })
    }

    proptest! {
        #[test]
        fn choppy_regime_never_signals(b in arb_bundle()) {
            let cfg = StrategyConfig::default();
            if b.adx < dec!(25) {
                prop_assert!(decide(&b, &cfg).is_none());
            }
        }

        #[test]
        fn verdict_matches_trend_side(b in arb_bundle()) {
            let cfg = StrategyConfig::default();
            if let Some(v) = decide(&b, &cfg) {
                match v.direction {
                    Direction::Long => {
                        prop_assert!(b.price > b.ema_long && b.price > b.ema_mid);
                        prop_assert!(v.take_profit > v.entry_price);
                    }
                    Direction::Short => {
                        prop_assert!(b.price < b.ema_long && b.price < b.ema_mid);
                        prop_assert!(v.take_profit < v.entry_price);
                    }
                }
            }
        }

        #[test]
        fn oi_build_up_never_signals(b in arb_bundle()) {
            let cfg = StrategyConfig::default();
            if b.oi_change_pct > dec!(1.5) {
                prop_assert!(decide(&b, &cfg).is_none());
            }
        }

        #[test]
        fn decision_is_deterministic(b in arb_bundle()) {
            let cfg = StrategyConfig::default();
            prop_assert_eq!(decide(&b, &cfg), decide(&b, &cfg));
        }
    }
}
