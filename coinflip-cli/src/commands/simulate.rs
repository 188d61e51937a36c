use super::{history_table, join_bots, print_outcome, stats_table};
use coinflip_engine::{
    CoinSource, EngineConfig, ManualClock, RandomCoin, Round, RoundEngine, SeededCoin,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

pub async fn simulate(
    config: EngineConfig,
    rounds: usize,
    players: usize,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let clock = Arc::new(ManualClock::default());
    let coin: Arc<dyn CoinSource> = match seed {
        Some(seed) => {
            let coin = SeededCoin::from_u64(seed);
            println!("Seed commitment: {}", coin.commitment());
            Arc::new(coin)
        }
        None => Arc::new(RandomCoin),
    };
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let round_duration = config.round_duration;
    let history_limit = config.history_limit;
    let engine = RoundEngine::builder(config)
        .with_clock(clock.clone())
        .with_coin(coin)
        .build()?;

    for _ in 0..rounds {
        let sequence = engine.round_info().sequence;
        let joined = join_bots(&engine, players, &mut rng).await?;

        clock.advance(round_duration);
        if let Some(outcome) = engine.check_expiry()? {
            println!();
            println!("Round #{} ({} players)", sequence, joined);
            print_outcome(&outcome, None);
        }
    }

    println!();
    println!("Leaderboard");
    println!("{}", stats_table(&engine.leaderboard()));

    let summaries: Vec<_> = engine
        .past_rounds(history_limit)
        .iter()
        .map(Round::summary)
        .collect();
    println!("Recent rounds");
    println!("{}", history_table(&summaries));

    Ok(())
}
