//! Opens a market order and waits for the resulting position.
//!
//! Run with:
//! ```sh
//! FXCM_ACCESS_TOKEN=... FXCM_INSTRUMENT=EUR/USD FXCM_LOTS=1 \
//!     RUST_LOG=fxcm_session=debug cargo run --example market_order
//! ```
//!
//! `FXCM_ACCOUNT` picks the account; without it the first account on the
//! session is used. `FXCM_BUY_SELL=S` sells.

use std::time::Duration;

use fxcm_session::prelude::*;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const POSITION_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), SdkError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let params = RunnerParams::from_env()?;
    let session = Session::builder().config(params.session_config()).build()?;
    session.connect().await?;

    let (opened_tx, mut opened_rx) = mpsc::unbounded_channel();
    let positions = session.on_open_position(move |update| {
        if update.action != UpdateAction::Insert {
            return;
        }
        let position = &update.entity;
        println!(
            "Insert trade id: {}; amount: {}; rate: {}",
            position.trade_id, position.amount_k, position.open
        );
        let _ = opened_tx.send(position.trade_id.clone());
    });
    let orders = session.on_order(|update| {
        if matches!(update.action, UpdateAction::Insert | UpdateAction::Delete) {
            println!("{:?} order id: {}", update.action, update.entity.order_id);
        }
    });

    session.tables().subscribe(TradingTable::OpenPosition).await?;
    session.tables().subscribe(TradingTable::Order).await?;

    let accounts = session.tables().get_accounts().await?;
    let Some(account_id) = params.trading_account(&accounts) else {
        session.close().await;
        return Err(SdkError::Config("no trading account available".into()));
    };

    let order_id = session
        .trading()
        .open_trade(&params.market_order(&account_id))
        .await?;
    println!("market order {} sent on account {}", order_id, account_id);

    match tokio::time::timeout(POSITION_TIMEOUT, opened_rx.recv()).await {
        Ok(Some(trade_id)) => println!("position opened: {}", trade_id),
        _ => println!("no position reported within {:?}", POSITION_TIMEOUT),
    }

    session.tables().unsubscribe(TradingTable::OpenPosition).await?;
    session.tables().unsubscribe(TradingTable::Order).await?;
    session.remove_observer(positions);
    session.remove_observer(orders);
    session.close().await;
    Ok(())
}
