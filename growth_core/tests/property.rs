mod common;

use common::*;
use growth_core::{
    DetectorCfg, NormalizerCfg, Objective, Observation, detect_growth_phase, normalize, pearson,
    top_k_average,
};
use proptest::prelude::*;

prop_compose! {
    fn observations()(
        raw in prop::collection::vec((-48.0f64..48.0, 0.0f64..1.5), 0..80)
    ) -> Vec<Observation> {
        raw.into_iter()
            .map(|(h, od)| Observation { timestamp: at_hours(h), optical_density: od })
            .collect()
    }
}

prop_compose! {
    /// Noisy logistic-ish growth curve sampled every few minutes.
    fn growth_curve()(
        k in 0.05f64..1.2,
        od0 in 0.11f64..0.3,
        n in 10usize..120,
        step_min in 2.0f64..20.0,
        noise in prop::collection::vec(-0.03f64..0.03, 120),
    ) -> Vec<Observation> {
        let step_h = step_min / 60.0;
        (0..n)
            .map(|i| {
                let t = i as f64 * step_h;
                let capacity = 1.2;
                let od = capacity / (1.0 + (capacity / od0 - 1.0) * (-k * t).exp());
                Observation {
                    timestamp: at_hours(t),
                    optical_density: (od * (1.0 + noise[i])).max(0.0),
                }
            })
            .collect()
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn normalized_time_starts_at_zero_and_never_decreases(obs in observations()) {
        let cfg = NormalizerCfg { min_points: 1, ..NormalizerCfg::default() };
        if let Ok(s) = normalize(&obs, &cfg) {
            let pts = s.points();
            prop_assert_eq!(pts[0].elapsed_hours, 0.0);
            prop_assert!(pts.windows(2).all(|w| w[0].elapsed_hours <= w[1].elapsed_hours));
            prop_assert!(pts.iter().all(|p| p.optical_density > cfg.noise_floor_od));
        }
    }

    #[test]
    fn fewer_than_min_points_never_yields_a_series(obs in observations()) {
        let cfg = NormalizerCfg::default();
        let valid = obs.iter().filter(|o| o.optical_density > cfg.noise_floor_od).count();
        prop_assert_eq!(normalize(&obs, &cfg).is_ok(), valid >= cfg.min_points);
    }

    #[test]
    fn detected_windows_satisfy_every_filter(obs in growth_curve()) {
        let cfg = DetectorCfg::default();
        let Ok(series) = normalize(&obs, &NormalizerCfg::default()) else {
            return Ok(());
        };
        if let Some(w) = detect_growth_phase(&series, &cfg) {
            prop_assert!(w.avg_od >= cfg.density_band.0 && w.avg_od <= cfg.density_band.1);
            prop_assert!(w.max_od >= w.min_od);
            prop_assert!(w.increase_ratio >= cfg.min_increase_ratio);
            prop_assert!(w.slope > 0.0);
            prop_assert!(w.r_squared > cfg.min_r_squared && w.r_squared <= 1.0 + 1e-12);
            prop_assert!(w.score > 0.0);
            prop_assert!((w.doubling_time - std::f64::consts::LN_2 / w.slope).abs() < 1e-9);
            prop_assert!(w.start_hour >= 0.0 && w.end_hour <= series.span_hours());
        }
    }

    #[test]
    fn pearson_is_bounded(
        pairs in prop::collection::vec((-1e3f64..1e3, -1e3f64..1e3), 0..50)
    ) {
        let (x, y): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let r = pearson(&x, &y);
        prop_assert!((-1.0..=1.0).contains(&r));
        if x.len() < 2 {
            prop_assert_eq!(r, 0.0);
        }
    }

    #[test]
    fn top_k_with_k_at_least_n_is_the_mean(
        rows in prop::collection::vec((1u32..12, 50.0f64..150.0, 1.0f64..4.0, 0.01f64..1.0), 1..20),
        extra in 0usize..5,
    ) {
        let records: Vec<_> = rows
            .iter()
            .enumerate()
            .map(|(i, &(c, v, h, s))| record(&format!("W{i:02}"), params(c, v, h), s))
            .collect();
        let n = records.len() as f64;
        let est = top_k_average(&records, Objective::Slope, records.len() + extra).unwrap();
        let mean_v = rows.iter().map(|r| r.1).sum::<f64>() / n;
        let mean_s = rows.iter().map(|r| r.3).sum::<f64>() / n;
        prop_assert!((est.mix_volume - mean_v).abs() < 1e-9);
        prop_assert!((est.predicted - mean_s).abs() < 1e-9);
        prop_assert_eq!(est.confidence, 1.0);
    }
}
