use approx::abs_diff_eq;
use impulse_denoise::{
    AdaptiveConfig, AdaptiveFilter, AdaptiveStrategy, MedianFilter, MorphOperation,
    MorphologicalFilter, OutlierConfig, OutlierDetector, SavitzkyGolayFilter, SignalProcessor,
};
use proptest::prelude::*;

fn signal() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1000.0f64..1000.0, 0..200)
}

fn odd_window() -> impl Strategy<Value = usize> {
    (0usize..8).prop_map(|k| 2 * k + 1)
}

// =========================================================================
// Length preservation across every filter family
// =========================================================================
proptest! {
    #[test]
    fn test_length_preserved(data in signal(), window in odd_window()) {
        let mut filters: Vec<Box<dyn SignalProcessor>> = vec![
            Box::new(MedianFilter::new(window).unwrap()),
            Box::new(MorphologicalFilter::new(MorphOperation::Closing, window).unwrap()),
            Box::new(OutlierDetector::new(OutlierConfig::new(3.0, window).unwrap()).unwrap()),
            Box::new(AdaptiveFilter::new(AdaptiveConfig::default().with_seed(7)).unwrap()),
            Box::new(
                AdaptiveFilter::new(
                    AdaptiveConfig::default()
                        .with_strategy(AdaptiveStrategy::Rls)
                        .with_seed(7),
                )
                .unwrap(),
            ),
            Box::new(SavitzkyGolayFilter::new(window.max(3), (window / 2).clamp(1, 4)).unwrap()),
        ];
        for filter in filters.iter_mut() {
            prop_assert_eq!(filter.process(&data).len(), data.len());
        }
    }
}

// =========================================================================
// Morphological ordering and idempotence
// =========================================================================
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn test_erosion_below_dilation(data in signal(), window in odd_window()) {
        let filter = MorphologicalFilter::new(MorphOperation::Erosion, window).unwrap();
        let eroded = filter.erode(&data);
        let dilated = filter.dilate(&data);
        for i in 0..data.len() {
            prop_assert!(eroded[i] <= data[i]);
            prop_assert!(data[i] <= dilated[i]);
        }
    }

    #[test]
    fn test_opening_and_closing_idempotent(data in signal(), window in odd_window()) {
        let filter = MorphologicalFilter::new(MorphOperation::Opening, window).unwrap();
        let opened = filter.open(&data);
        prop_assert_eq!(filter.open(&opened), opened);
        let closed = filter.close(&data);
        prop_assert_eq!(filter.close(&closed), closed);
    }
}

// =========================================================================
// Median filter never invents values
// =========================================================================
proptest! {
    #[test]
    fn test_median_within_input_range(data in signal(), window in odd_window()) {
        prop_assume!(!data.is_empty());
        let lo = data.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mut filter = MedianFilter::new(window).unwrap();
        for value in filter.process(&data) {
            prop_assert!(lo <= value && value <= hi);
        }
    }
}

// =========================================================================
// Savitzky-Golay reproduces low-degree polynomials in the interior
// =========================================================================
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_savgol_polynomial_reproduction(
        c0 in -5.0f64..5.0,
        c1 in -2.0f64..2.0,
        c2 in -0.5f64..0.5,
        half in 2usize..6,
        len in 15usize..60,
    ) {
        let window = 2 * half + 1;
        let mut filter = SavitzkyGolayFilter::new(window, 2).unwrap();
        let data: Vec<f64> = (0..len)
            .map(|i| {
                let x = i as f64;
                c0 + c1 * x + c2 * x * x
            })
            .collect();
        let filtered = filter.process(&data);
        for i in half..len.saturating_sub(half) {
            prop_assert!(
                abs_diff_eq!(filtered[i], data[i], epsilon = 1e-6),
                "index {}: {} vs {}", i, filtered[i], data[i]
            );
        }
    }
}
