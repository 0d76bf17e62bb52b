use clap::Parser;
use tradeguard::models::{Pair, SignalAction, StrategyKind};
use tradeguard::strategy::{preset, SignalGenerator, SignalPolicy};
use tradeguard::Result;

/// Sample the signal generator and compare against each strategy's policy
#[derive(Parser)]
#[command(name = "signal_stats")]
struct Args {
    /// Signals to draw per strategy
    #[arg(short, long, default_value_t = 10_000)]
    samples: usize,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("tradeguard=warn")
        .init();

    let args = Args::parse();
    if args.samples == 0 {
        return Err("--samples must be positive".into());
    }

    println!("\n═══════════════════════════════════════════════════════");
    println!("     SIGNAL POLICY CHECK ({} samples, seed {})", args.samples, args.seed);
    println!("═══════════════════════════════════════════════════════\n");

    println!(
        "{:<20} {:>10} {:>10} {:>12} {:>10}",
        "Strategy", "P(buy)", "Observed", "Confidence", "Mean"
    );
    println!("{}", "─".repeat(66));

    let pair: Pair = "SOL/USDC".parse()?;
    let mut generator = SignalGenerator::seeded(args.seed);

    for kind in StrategyKind::ALL {
        let strategy = preset(kind, pair.clone(), 1.0);
        let policy = SignalPolicy::for_kind(kind);

        let mut buys = 0usize;
        let mut min = u8::MAX;
        let mut max = u8::MIN;
        let mut total = 0u64;

        for _ in 0..args.samples {
            let signal = generator.generate(&strategy);
            if signal.action == SignalAction::Buy {
                buys += 1;
            }
            min = min.min(signal.confidence);
            max = max.max(signal.confidence);
            total += u64::from(signal.confidence);
        }

        println!(
            "{:<20} {:>10.2} {:>10.3} {:>12} {:>10.1}",
            kind.name(),
            policy.buy_probability,
            buys as f64 / args.samples as f64,
            format!("{}-{}", min, max),
            total as f64 / args.samples as f64
        );
    }

    println!();
    Ok(())
}
