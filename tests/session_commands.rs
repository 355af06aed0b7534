//! Command surface: state guard, snapshot reads, candles, trading,
//! and subscription bookkeeping.

mod common;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use common::*;
use fxcm_session::domain::table::Offer;
use fxcm_session::domain::trading::{
    CloseAllForSymbol, DeleteOrder, OpenTrade, TradingCommand,
};
use fxcm_session::error::{HttpError, SdkError};
use fxcm_session::http::Method;
use fxcm_session::network::resource;
use fxcm_session::shared::{SessionState, Timeframe, TradingTable};

#[tokio::test]
async fn test_every_command_is_rejected_while_disconnected() {
    let commands = FakeCommands::new();
    let push = FakePush::with_session_ids(&["s1"]);
    let session = session(&commands, &push);

    let results = vec![
        session.prices().subscribe("EUR/USD").await.map(|_| ()),
        session.prices().unsubscribe("EUR/USD").await,
        session.tables().subscribe(TradingTable::Offer).await,
        session.tables().unsubscribe(TradingTable::Offer).await,
        session.tables().update_subscriptions("EUR/USD", true).await,
        session.tables().get_offers().await.map(|_| ()),
        session.tables().get_accounts().await.map(|_| ()),
        session.instruments().get().await.map(|_| ()),
        session
            .candles()
            .get(1, Timeframe::Minute1, 100, None, None)
            .await
            .map(|_| ()),
        session
            .trading()
            .open_trade(&OpenTrade::new("1", "EUR/USD", true, 1))
            .await
            .map(|_| ()),
        session.trading().delete_order(&DeleteOrder::new("42")).await,
    ];

    for result in results {
        match result {
            Err(SdkError::InvalidSessionState { expected, actual }) => {
                assert_eq!(expected, SessionState::Connected);
                assert_eq!(actual, SessionState::Disconnected);
            }
            other => panic!("expected invalid state, got {other:?}"),
        }
    }
    assert_eq!(commands.count(), 0);
    assert!(session.subscribed_symbols().await.is_empty());
}

#[tokio::test]
async fn test_open_trade_while_disconnected_sends_nothing() {
    let commands = FakeCommands::new();
    let push = FakePush::with_session_ids(&["s1"]);
    let session = session(&commands, &push);

    let err = session
        .trading()
        .open_trade(&OpenTrade::new("1234", "EUR/USD", true, 10))
        .await
        .unwrap_err();
    assert!(err.is_invalid_state());
    assert_eq!(commands.count(), 0);
}

#[tokio::test]
async fn test_get_offers_reads_snapshot() {
    let (session, commands, _) = connected("s1").await;
    commands.respond(
        resource::GET_MODEL,
        json!({
            "response": {"executed": true},
            "offers": [
                {"offerId": 1, "Currency": "EUR/USD", "sell": 1.1, "buy": 1.1002},
                {"offerId": 2, "Currency": "USD/JPY"}
            ]
        }),
    );

    let offers: Vec<Offer> = session.tables().get_offers().await.unwrap();
    let eur = offers.iter().find(|o| o.currency == "EUR/USD").unwrap();
    assert_eq!(eur.offer_id, 1);
    assert!(eur.offer_id_present);
    assert!(!offers[1].sell_present);

    let request = &commands.requests()[0];
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.url, format!("{HOST}{}?models=Offer", resource::GET_MODEL));
    assert!(request.body.is_none());
    assert_eq!(authorization(request), "Bearer s1token");
    assert_eq!(request.header("User-Agent"), Some("request"));
}

#[tokio::test]
async fn test_snapshot_with_missing_key_is_empty() {
    let (session, _, _) = connected("s1").await;
    assert!(session.tables().get_summary().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_candles_without_range() {
    let (session, commands, _) = connected("s1").await;
    let rows: Vec<_> = (0..100)
        .map(|i| json!([1_704_067_200 + i * 60, 1.1, 1.2, 1.3, 1.0, 1.11, 1.21, 1.31, 1.01, 5]))
        .collect();
    commands.respond(
        "/candles/1/m1",
        json!({"response": {"executed": true}, "instrument_id": "1", "period_id": "m1", "candles": rows}),
    );

    let candles = session
        .candles()
        .get(1, Timeframe::Minute1, 100, None, None)
        .await
        .unwrap();
    assert_eq!(candles.len(), 100);
    assert_eq!(
        candles[0].timestamp,
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    );
    assert!(candles.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    assert_eq!(candles[99].tick_qty, 5);

    let request = &commands.requests()[0];
    assert_eq!(request.url, format!("{HOST}/candles/1/m1?num=100"));
}

#[tokio::test]
async fn test_get_candles_with_range_and_bad_count() {
    let (session, commands, _) = connected("s1").await;
    let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();

    session
        .candles()
        .get(7, Timeframe::Hour1, 24, Some(from), Some(to))
        .await
        .unwrap();
    assert_eq!(
        commands.requests()[0].url,
        format!("{HOST}/candles/7/H1?num=24&from=1704067200&to=1704153600")
    );

    let err = session
        .candles()
        .get(7, Timeframe::Hour1, 0, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Validation(_)));
    assert_eq!(commands.count(), 1);
}

#[tokio::test]
async fn test_get_instruments() {
    let (session, commands, _) = connected("s1").await;
    commands.respond(
        resource::GET_INSTRUMENTS,
        json!({
            "response": {"executed": true},
            "data": {"instrument": [{"symbol": "EUR/USD", "visible": true, "order": 1}]}
        }),
    );
    let instruments = session.instruments().get().await.unwrap();
    assert_eq!(instruments[0].symbol, "EUR/USD");
}

#[tokio::test]
async fn test_open_trade_posts_form_and_returns_order_id() {
    let (session, commands, _) = connected("s1").await;
    commands.respond(
        OpenTrade::RESOURCE,
        json!({"response": {"executed": true}, "data": {"type": 0, "orderId": 81712802}}),
    );

    let command = OpenTrade {
        stop: Some(Decimal::new(-30, 0)),
        is_in_pips: Some(true),
        ..OpenTrade::new("1234", "EUR/USD", true, 10)
    };
    let order_id = session.trading().open_trade(&command).await.unwrap();
    assert_eq!(order_id, "81712802");

    let request = &commands.requests()[0];
    assert_eq!(request.method, Method::Post);
    assert_eq!(
        request.body.as_deref(),
        Some("account_id=1234&symbol=EUR%2FUSD&is_buy=true&amount=10&stop=-30&is_in_pips=true")
    );
    assert_eq!(
        request.header("Content-Type"),
        Some("application/x-www-form-urlencoded")
    );
}

#[tokio::test]
async fn test_command_failure_carries_server_message() {
    let (session, commands, _) = connected("s1").await;
    commands.reject_when(OpenTrade::RESOURCE, "symbol", "Insufficient margin");

    let err = session
        .trading()
        .open_trade(&OpenTrade::new("1234", "EUR/USD", true, 10))
        .await
        .unwrap_err();
    match err {
        SdkError::CommandExecution { message } => assert_eq!(message, "Insufficient margin"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_2xx_is_server_error() {
    let (session, commands, _) = connected("s1").await;
    commands.status(DeleteOrder::RESOURCE, 401, "unauthorized");

    let err = session
        .trading()
        .delete_order(&DeleteOrder::new("42"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SdkError::Http(HttpError::ServerError { status: 401, ref body }) if body == "unauthorized"
    ));
}

#[tokio::test]
async fn test_close_all_for_symbol_returns_ids() {
    let (session, commands, _) = connected("s1").await;
    commands.respond(
        CloseAllForSymbol::RESOURCE,
        json!({"response": {"executed": true}, "data": [{"orderId": "1"}, {"orderId": 2}]}),
    );
    let ids = session
        .trading()
        .close_all_for_symbol(&CloseAllForSymbol::new("1234", Some("EUR/USD")))
        .await
        .unwrap();
    assert_eq!(ids, vec!["1".to_string(), "2".to_string()]);
}

#[tokio::test]
async fn test_repeated_subscribe_registers_one_callback() {
    let (session, commands, push) = connected("s1").await;

    session.prices().subscribe("EUR/USD").await.unwrap();
    session.prices().subscribe("EUR/USD").await.unwrap();

    assert_eq!(commands.to_path(resource::SUBSCRIBE).len(), 2);
    assert_eq!(push.on_count("EUR/USD"), 1);
    assert_eq!(session.subscribed_symbols().await, vec!["EUR/USD".to_string()]);

    session.tables().subscribe(TradingTable::Order).await.unwrap();
    session.tables().subscribe(TradingTable::Order).await.unwrap();
    assert_eq!(commands.to_path(resource::TRADING_SUBSCRIBE).len(), 2);
    assert_eq!(push.on_count("Order"), 1);
}

#[tokio::test]
async fn test_subscribe_returns_last_quote() {
    let (session, commands, _) = connected("s1").await;
    commands.respond(
        resource::SUBSCRIBE,
        json!({
            "response": {"executed": true},
            "pairs": [{"Updated": 1_704_067_200_000i64, "Rates": [1.1, 1.2, 1.3, 1.0], "Symbol": "EUR/USD"}]
        }),
    );
    let quote = session.prices().subscribe("EUR/USD").await.unwrap().unwrap();
    assert_eq!((quote.bid, quote.ask), (1.1, 1.2));

    commands.respond(resource::SUBSCRIBE, json!({"response": {"executed": true}}));
    assert!(session.prices().subscribe("GBP/USD").await.unwrap().is_none());
}

#[tokio::test]
async fn test_rejected_table_subscribe_is_not_registered() {
    let (session, commands, push) = connected("s1").await;
    commands.reject_when(resource::TRADING_SUBSCRIBE, "models=Account", "");

    let err = session
        .tables()
        .subscribe(TradingTable::Account)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Command failed: Request failed");
    assert!(!session.is_table_subscribed(TradingTable::Account).await);
    assert_eq!(push.on_count("Account"), 0);
}

#[tokio::test]
async fn test_unsubscribe_releases_topic_even_when_rejected() {
    let (session, commands, push) = connected("s1").await;
    session.prices().subscribe("EUR/USD").await.unwrap();
    commands.reject_when(resource::UNSUBSCRIBE, "pairs", "not subscribed");

    let err = session.prices().unsubscribe("EUR/USD").await.unwrap_err();
    assert!(err.is_command_failure());
    assert!(!session.is_symbol_subscribed("EUR/USD").await);
    assert!(!push.has_handler("EUR/USD"));
}

#[tokio::test]
async fn test_table_unsubscribe_and_visibility() {
    let (session, commands, push) = connected("s1").await;
    session.tables().subscribe(TradingTable::Offer).await.unwrap();
    session.tables().unsubscribe(TradingTable::Offer).await.unwrap();
    assert!(session.subscribed_tables().await.is_empty());
    assert_eq!(push.off_count("Offer"), 1);

    session
        .tables()
        .update_subscriptions("EUR/USD", false)
        .await
        .unwrap();
    let request = commands.to_path(resource::UPDATE_SUBSCRIPTIONS).pop().unwrap();
    assert_eq!(request.body.as_deref(), Some("symbol=EUR%2FUSD&visible=false"));
}
