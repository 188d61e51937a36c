use super::{join_bots, print_outcome, stats_table};
use anyhow::bail;
use coinflip_engine::{CoinSide, EngineConfig, PlayerProfile, RoundEvent, RoundOutcome};
use dialoguer::{Input, Select};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::broadcast;
use uuid::Uuid;

pub async fn play(config: EngineConfig, bots: usize) -> anyhow::Result<()> {
    let (engine, scheduler) = coinflip_engine::start_engine(config)?;
    let mut events = engine.subscribe();
    let mut rng = StdRng::from_entropy();

    let address: String = Input::new()
        .with_prompt("Your address")
        .interact_text()?;

    println!("Buy-in is {:.2} per round.", engine.required_payment());

    loop {
        let summary = engine.current_summary();
        println!();
        println!(
            "Round #{} | {}s left | pot {:.2} | heads {} / tails {}",
            summary.sequence,
            engine.time_remaining().as_secs(),
            summary.pot,
            summary.heads_count,
            summary.tails_count
        );

        let options = ["Heads", "Tails", "Quit"];
        let selection = Select::new()
            .with_prompt("Pick a side")
            .items(&options)
            .default(0)
            .interact()?;

        let side = match selection {
            0 => CoinSide::Heads,
            1 => CoinSide::Tails,
            _ => break,
        };

        let reference: String = Input::new()
            .with_prompt("Payment reference (blank to skip)")
            .allow_empty(true)
            .interact_text()?;
        let reference = Some(reference.trim()).filter(|r| !r.is_empty());

        let receipt = match engine
            .join_round(&address, side, PlayerProfile::default(), reference)
            .await
        {
            Ok(receipt) => receipt,
            Err(e) if e.is_rejection() => {
                println!("Could not join: {} ({})", e, e.reason_code());
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let bots_joined = join_bots(&engine, bots, &mut rng).await?;
        println!(
            "Staked {:.2} on {} in round #{} with {} bots. Flip at {}.",
            receipt.amount,
            side,
            summary.sequence,
            bots_joined,
            receipt
                .end_time
                .with_timezone(&chrono::Local)
                .format("%H:%M:%S")
        );

        let outcome = wait_for_outcome(&mut events, receipt.round_id).await?;
        println!();
        print_outcome(&outcome, Some(&address));

        let stats = engine.player_stats(&address);
        println!("{}", stats_table(&[(address.clone(), stats)]));
    }

    scheduler.shutdown().await;
    println!("Thanks for playing!");
    Ok(())
}

async fn wait_for_outcome(
    events: &mut broadcast::Receiver<RoundEvent>,
    round_id: Uuid,
) -> anyhow::Result<RoundOutcome> {
    loop {
        match events.recv().await {
            Ok(RoundEvent::RoundResolved(outcome)) if outcome.round_id == round_id => {
                return Ok(outcome)
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!("Skipped {} round events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => bail!("Round engine stopped"),
        }
    }
}
