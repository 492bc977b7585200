//! Example usage of the impulse-denoise crate

use impulse_denoise::{
    correlation, despike, mse, read_signal, snr, write_signal, AdaptiveConfig, AdaptiveFilter,
    AdaptiveStrategy, DetectionMethod, InterpolationMethod, MedianFilter, MorphOperation,
    MorphologicalFilter, OutlierConfig, OutlierDetector, SavitzkyGolayFilter, SignalProcessor,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Impulse Denoise Examples ===\n");

    let clean_signal: Vec<f64> = (0..40)
        .map(|i| {
            let x = i as f64 * 0.05;
            (2.0 * std::f64::consts::PI * x).sin() + 0.5 * (4.0 * std::f64::consts::PI * x).cos()
        })
        .collect();

    // Sparse impulses of random sign and height
    let mut rng = StdRng::seed_from_u64(42);
    let mut noisy_signal = clean_signal.clone();
    for value in noisy_signal.iter_mut() {
        if rng.gen::<f64>() < 0.1 {
            let sign = if rng.gen::<bool>() { 1.0 } else { -1.0 };
            *value += sign * rng.gen_range(2.0..5.0);
        }
    }

    println!("Original noisy signal:");
    print_signal(&noisy_signal);
    println!("SNR before filtering: {:.2} dB", snr(&clean_signal, &noisy_signal));

    // Example 1: convenience despiking
    println!("\n1. Despike (5-point median):");
    let despiked = despike(&noisy_signal);
    print_signal(&despiked);

    // Example 2: each filter family through the common trait
    println!("\n2. Filter bank:");
    let mut filters: Vec<Box<dyn SignalProcessor>> = vec![
        Box::new(MedianFilter::new(5)?),
        Box::new(AdaptiveFilter::new(
            AdaptiveConfig::new(8, 0.01, 0.99)?.with_seed(7),
        )?),
        Box::new(AdaptiveFilter::new(
            AdaptiveConfig::new(8, 0.01, 0.99)?
                .with_strategy(AdaptiveStrategy::Rls)
                .with_seed(7),
        )?),
        Box::new(MorphologicalFilter::new(MorphOperation::Opening, 3)?),
        Box::new(OutlierDetector::new(OutlierConfig::new(3.0, 7)?)?),
        Box::new(OutlierDetector::new(
            OutlierConfig::new(2.5, 7)?
                .with_detection(DetectionMethod::AdaptiveThreshold)
                .with_interpolation(InterpolationMethod::Autoregressive),
        )?),
        Box::new(SavitzkyGolayFilter::new(7, 3)?),
    ];

    for filter in filters.iter_mut() {
        let (filtered, elapsed) = filter.measure(&noisy_signal);
        println!(
            "  {:<40} snr={:7.2} dB  mse={:.4}  corr={:.4}  time={:?}",
            filter.name(),
            snr(&clean_signal, &filtered),
            mse(&clean_signal, &filtered),
            correlation(&clean_signal, &filtered),
            elapsed
        );
    }

    // Example 3: inspecting the outlier mask
    println!("\n3. Flagged samples (MAD, threshold 3.0, window 7):");
    let detector = OutlierDetector::new(OutlierConfig::new(3.0, 7)?)?;
    let flagged: Vec<usize> = detector
        .detect(&noisy_signal)
        .iter()
        .enumerate()
        .filter(|(_, flag)| **flag)
        .map(|(i, _)| i)
        .collect();
    println!("  {:?}", flagged);

    // Example 4: CSV round trip
    println!("\n4. CSV round trip:");
    let path = std::env::temp_dir().join("impulse_denoise_demo.csv");
    write_signal(&path, &despiked)?;
    let restored = read_signal(&path)?;
    println!("  Wrote and read back {} samples from {}", restored.len(), path.display());

    Ok(())
}

fn print_signal(signal: &[f64]) {
    for (i, &value) in signal.iter().enumerate() {
        print!("{:7.3}", value);
        if (i + 1) % 10 == 0 {
            println!();
        }
    }
    if signal.len() % 10 != 0 {
        println!();
    }
}
