//! Streams prices for one instrument, then fetches its recent candles.
//!
//! Run with:
//! ```sh
//! FXCM_ACCESS_TOKEN=... FXCM_INSTRUMENT=EUR/USD \
//!     RUST_LOG=fxcm_session=debug cargo run --example price_stream
//! ```
//!
//! Parameters are read from the environment (or a `.env` file):
//! `FXCM_HOST`, `FXCM_TIMEFRAME`, `FXCM_DATE_FROM`, `FXCM_DATE_TO` and
//! `FXCM_COUNT` are optional.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fxcm_session::prelude::*;
use tracing_subscriber::EnvFilter;

const STREAM_FOR: Duration = Duration::from_secs(20);
const DEFAULT_CANDLES: u32 = 50;

#[tokio::main]
async fn main() -> Result<(), SdkError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let params = RunnerParams::from_env()?;
    let session = Session::builder().config(params.session_config()).build()?;

    session.on_state_change(|change| {
        println!("state: {} -> {}", change.old, change.new);
    });

    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&ticks);
    session.on_price(move |price| {
        counter.fetch_add(1, Ordering::Relaxed);
        println!(
            "{} bid={} ask={} at {}",
            price.symbol, price.bid, price.ask, price.updated
        );
    });

    session.connect().await?;
    println!("connected, session id {}", session.session_id().await);

    if let Some(last) = session.prices().subscribe(&params.instrument).await? {
        println!("last quote: bid={} ask={}", last.bid, last.ask);
    }

    tokio::time::sleep(STREAM_FOR).await;
    println!("{} price updates received", ticks.load(Ordering::Relaxed));
    session.prices().unsubscribe(&params.instrument).await?;

    let offers = session.tables().get_offers().await?;
    match offers.iter().find(|o| o.currency == params.instrument) {
        Some(offer) => {
            let count = params.count.unwrap_or(DEFAULT_CANDLES);
            let candles = session
                .candles()
                .get(
                    offer.offer_id,
                    params.timeframe,
                    count,
                    params.date_from,
                    Some(params.date_to),
                )
                .await?;
            for candle in &candles {
                println!(
                    "{} O={} C={} H={} L={} ticks={}",
                    candle.timestamp,
                    candle.bid_open,
                    candle.bid_close,
                    candle.bid_high,
                    candle.bid_low,
                    candle.tick_qty
                );
            }
        }
        None => println!("no offer found for {}", params.instrument),
    }

    session.close().await;
    Ok(())
}
