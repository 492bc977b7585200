use impulse_denoise::evaluation::{compare, evaluate};
use impulse_denoise::{default_filter_bank, MedianFilter, SavitzkyGolayFilter, Signal};
use rand::prelude::*;
use rand_distr::{Normal, Uniform};
use tracing_subscriber::EnvFilter;

/// Sum of sines plus Gaussian background and sparse uniform impulses.
fn synthetic_pair(
    rng: &mut StdRng,
    len: usize,
    impulse_rate: f64,
) -> Result<(Signal, Signal), rand_distr::NormalError> {
    let background = Normal::new(0.0, 0.05)?;
    let impulses = Uniform::new(-6.0, 6.0);

    let phase = rng.gen_range(0.0..std::f64::consts::PI);
    let clean: Signal = (0..len)
        .map(|i| {
            let x = i as f64 * 0.01 + phase;
            x.sin() + 0.5 * (2.0 * x).cos() + 0.1 * (5.0 * x).sin()
        })
        .collect();

    let noisy = clean
        .iter()
        .map(|&value| {
            let mut sample = value + background.sample(&mut *rng);
            if rng.gen::<f64>() < impulse_rate {
                sample += impulses.sample(&mut *rng);
            }
            sample
        })
        .collect();

    Ok((clean, noisy))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Impulse Denoise Benchmarks ===\n");

    let mut rng = StdRng::seed_from_u64(2024);

    for impulse_rate in [0.01, 0.05, 0.10] {
        let dataset = (0..10)
            .map(|_| synthetic_pair(&mut rng, 2_000, impulse_rate))
            .collect::<Result<Vec<_>, _>>()?;

        println!("Impulse rate {:.0}%:", impulse_rate * 100.0);
        for mut filter in default_filter_bank()? {
            let report = evaluate(filter.as_mut(), &dataset);
            let snr = report.snr_summary();
            let time = report.elapsed_summary();
            println!(
                "  {:<40} snr={:6.2}±{:5.2} dB  corr={:.4}  time={:8.1}±{:6.1} µs  quality={:.2}",
                report.algorithm,
                snr.mean,
                snr.std,
                report.correlation_summary().mean,
                time.mean,
                time.std,
                report.quality_index()
            );
        }
        println!();
    }

    println!("Median vs Savitzky-Golay on 5% impulses:");
    let dataset = (0..10)
        .map(|_| synthetic_pair(&mut rng, 10_000, 0.05))
        .collect::<Result<Vec<_>, _>>()?;
    let mut median = MedianFilter::new(7)?;
    let mut savgol = SavitzkyGolayFilter::new(11, 3)?;
    let comparison = compare(&mut median, &mut savgol, &dataset);

    println!("  SNR difference:         {:+.2} dB", comparison.snr_difference);
    println!("  MSE ratio (SG/median):  {:.2}", comparison.mse_ratio);
    println!("  Correlation difference: {:+.4}", comparison.correlation_difference);
    println!("  Speed ratio (median/SG): {:.2}", comparison.speed_ratio);
    println!("  Quality difference:     {:+.2}", comparison.quality_index_difference);

    Ok(())
}
