//! History Dispatch Integration Tests
//!
//! Drives the assembled engine end to end: dispatcher, routing, vendor
//! sessions and HTTP clients against a mock vendor server, and result
//! events on the broadcast hub.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{FixedOffset, NaiveDate, TimeZone};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use tokio::sync::broadcast;
use tokio::time::timeout;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use history_engine::{
    BarData, ContractData, Credentials, DataVendor, Exchange, HistoryConfig, HistoryEngine,
    HistoryError, HistoryEvent, InMemoryContractDirectory, InMemoryGatewayHistory, Interval,
    NoGatewayHistory, SessionError, VendorSettings,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn config(vendor: VendorSettings) -> HistoryConfig {
    HistoryConfig {
        vendor,
        ..HistoryConfig::default()
    }
}

fn jqdata_settings(server: &MockServer, credentials: Option<Credentials>) -> VendorSettings {
    VendorSettings {
        vendor: DataVendor::JqData,
        jqdata_url: server.uri(),
        jqdata_credentials: credentials,
        timeout: Duration::from_secs(5),
        ..VendorSettings::default()
    }
}

fn tushare_settings(server: &MockServer, token: &str) -> VendorSettings {
    VendorSettings {
        vendor: DataVendor::Tushare,
        tushare_url: server.uri(),
        tushare_credentials: Some(Credentials::token(token)),
        timeout: Duration::from_secs(5),
        ..VendorSettings::default()
    }
}

fn directory(contracts: impl IntoIterator<Item = ContractData>) -> Arc<InMemoryContractDirectory> {
    Arc::new(InMemoryContractDirectory::with_contracts(contracts))
}

async fn collect(rx: &mut broadcast::Receiver<HistoryEvent>, count: usize) -> Vec<HistoryEvent> {
    let mut events = Vec::with_capacity(count);
    while events.len() < count {
        let event = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for history event")
            .expect("history channel closed");
        events.push(event);
    }
    events
}

/// Mock server that fails the test if any request reaches it.
async fn silent_vendor() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    server
}

async fn mount_jqdata_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "get_token"})))
        .respond_with(ResponseTemplate::new(200).set_body_string("tok"))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "get_all_securities", "token": "tok"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("code,display_name\n000001.XSHG,上证指数\n"),
        )
        .mount(server)
        .await;
}

// =============================================================================
// Vendor Path
// =============================================================================

#[tokio::test]
async fn jqdata_daily_bars_are_canonical_and_bounded() {
    let server = MockServer::start().await;
    mount_jqdata_login(&server).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "get_price_period",
            "code": "000001.XSHG",
            "unit": "1d",
            "date": "2020-01-02",
            "end_date": "2020-01-04"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "date,open,close,high,low,volume,money\n\
             2020-01-03,3089.02,3083.79,3093.82,3074.52,26155095,2.9e11\n\
             2020-01-02,3066.34,3085.20,3098.10,3066.34,29253018,3.2e11\n\
             2020-01-06,3070.91,3083.41,3107.20,3065.31,31254683,3.3e11\n",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let engine = HistoryEngine::build(
        &config(jqdata_settings(
            &server,
            Some(Credentials::new("13800000000", "secret")),
        )),
        directory([ContractData::new("000001", Exchange::Sse, "CTP", false)]),
        Arc::new(NoGatewayHistory),
    )
    .unwrap();
    let mut rx = engine.events.subscribe();

    let request_id = engine.dispatcher.query_history(
        "000001.SSE",
        Interval::Daily,
        date(2020, 1, 2),
        date(2020, 1, 3),
    );
    let event = collect(&mut rx, 1).await.remove(0);

    assert_eq!(event.request_id, request_id);
    let bars = event.outcome.unwrap();
    assert_eq!(bars.len(), 2);
    assert!(bars.windows(2).all(|pair| pair[0].datetime < pair[1].datetime));
    for bar in &bars {
        assert_eq!(bar.symbol, "000001");
        assert_eq!(bar.exchange, Exchange::Sse);
        assert_eq!(bar.interval, Interval::Daily);
        assert_eq!(bar.open_interest, Decimal::ZERO);
        assert_eq!(bar.source, "JQ");
        assert_eq!(bar.datetime.offset().local_minus_utc(), 8 * 3600);
    }
    assert_eq!(bars[0].datetime.date_naive(), date(2020, 1, 2));
    assert_eq!(bars[0].close, dec!(3085.20));

    engine.dispatcher.shutdown().await;
}

#[tokio::test]
async fn concurrent_queries_share_one_login_and_each_get_an_event() {
    let server = MockServer::start().await;
    mount_jqdata_login(&server).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"method": "get_price_period"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("date,open,close,high,low,volume\n2020-01-02,1,1,1,1,1\n")
                .set_delay(Duration::from_millis(20)),
        )
        .expect(8)
        .mount(&server)
        .await;

    let engine = HistoryEngine::build(
        &config(jqdata_settings(
            &server,
            Some(Credentials::new("13800000000", "secret")),
        )),
        directory([ContractData::new("000001", Exchange::Sse, "CTP", false)]),
        Arc::new(NoGatewayHistory),
    )
    .unwrap();
    let mut rx = engine.events.subscribe();

    let ids: HashSet<_> = (0..8)
        .map(|_| {
            engine.dispatcher.query_history(
                "000001.SSE",
                Interval::Daily,
                date(2020, 1, 2),
                date(2020, 1, 2),
            )
        })
        .collect();
    assert_eq!(ids.len(), 8);

    let events = collect(&mut rx, 8).await;
    let seen: HashSet<_> = events.iter().map(|e| e.request_id.clone()).collect();
    assert_eq!(seen, ids);
    assert!(events.iter().all(HistoryEvent::is_success));

    engine.dispatcher.shutdown().await;
}

#[tokio::test]
async fn missing_credentials_fail_without_contacting_vendor() {
    let server = silent_vendor().await;

    let engine = HistoryEngine::build(
        &config(jqdata_settings(&server, None)),
        directory([ContractData::new("000001", Exchange::Sse, "CTP", false)]),
        Arc::new(NoGatewayHistory),
    )
    .unwrap();
    let mut rx = engine.events.subscribe();

    for _ in 0..2 {
        engine.dispatcher.query_history(
            "000001.SSE",
            Interval::Daily,
            date(2020, 1, 2),
            date(2020, 1, 3),
        );
    }

    for event in collect(&mut rx, 2).await {
        assert_eq!(
            event.error(),
            Some(&HistoryError::Session(SessionError::MissingCredentials {
                vendor: DataVendor::JqData
            }))
        );
        assert_eq!(event.exchange(), Some(Exchange::Sse));
    }

    engine.dispatcher.shutdown().await;
}

#[tokio::test]
async fn tushare_futures_daily_bars_carry_open_interest() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"api_name": "trade_cal", "token": "abc"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": "",
            "data": {"fields": ["cal_date", "is_open"], "items": [["20200702", 1]]}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "api_name": "fut_daily",
            "params": {"ts_code": "RB2010.SHF", "start_date": "20200701", "end_date": "20200703"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": "",
            "data": {
                "fields": ["ts_code", "trade_date", "open", "high", "low", "close", "vol", "oi"],
                "items": [
                    ["RB2010.SHF", "20200702", 3640.0, 3668.0, 3631.0, 3660.0, 1432761.0, 1718543.0],
                    ["RB2010.SHF", "20200701", 3620.0, 3647.0, 3610.0, 3641.0, 1523309.0, 1702211.0]
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let engine = HistoryEngine::build(
        &config(tushare_settings(&server, "abc")),
        directory([ContractData::new("RB2010", Exchange::Shfe, "CTP", false)]),
        Arc::new(NoGatewayHistory),
    )
    .unwrap();
    let mut rx = engine.events.subscribe();

    engine.dispatcher.query_history(
        "RB2010.SHFE",
        Interval::Daily,
        date(2020, 7, 1),
        date(2020, 7, 2),
    );
    let bars = collect(&mut rx, 1).await.remove(0).outcome.unwrap();

    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].datetime.date_naive(), date(2020, 7, 1));
    assert_eq!(bars[0].open_interest, dec!(1702211));
    assert_eq!(bars[1].volume, dec!(1432761));
    assert!(bars.iter().all(|bar| bar.source == "TU"));

    engine.dispatcher.shutdown().await;
}

#[tokio::test]
async fn tushare_rejects_intraday_without_querying_bars() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"api_name": "trade_cal"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": "",
            "data": {"fields": ["cal_date", "is_open"], "items": []}
        })))
        .mount(&server)
        .await;

    let engine = HistoryEngine::build(
        &config(tushare_settings(&server, "abc")),
        directory([ContractData::new("600000", Exchange::Sse, "CTP", false)]),
        Arc::new(NoGatewayHistory),
    )
    .unwrap();
    let mut rx = engine.events.subscribe();

    engine.dispatcher.query_history(
        "600000.SSE",
        Interval::Minute,
        date(2020, 7, 1),
        date(2020, 7, 2),
    );
    let event = collect(&mut rx, 1).await.remove(0);

    assert_eq!(
        event.error(),
        Some(&HistoryError::UnsupportedInterval {
            vendor: DataVendor::Tushare,
            interval: Interval::Minute
        })
    );

    engine.dispatcher.shutdown().await;
}

// =============================================================================
// Gateway Path and Resolution
// =============================================================================

fn gateway_bar(day: u32, close: Decimal) -> BarData {
    let tz = FixedOffset::east_opt(8 * 3600).unwrap();
    BarData {
        symbol: "IF2006".to_string(),
        exchange: Exchange::Cffex,
        interval: Interval::Daily,
        datetime: tz.with_ymd_and_hms(2020, 6, day, 0, 0, 0).unwrap(),
        open: close,
        high: close,
        low: close,
        close,
        volume: dec!(100),
        open_interest: dec!(5000),
        source: "CTP".to_string(),
    }
}

#[tokio::test]
async fn gateway_history_bypasses_vendor() {
    let server = silent_vendor().await;
    let gateway = Arc::new(InMemoryGatewayHistory::new());
    gateway.add_bars(
        "CTP",
        "IF2006.CFFEX",
        vec![
            gateway_bar(3, dec!(4000)),
            gateway_bar(1, dec!(3980)),
            gateway_bar(2, dec!(3990)),
            gateway_bar(2, dec!(3991)),
            gateway_bar(9, dec!(4050)),
        ],
    );

    let engine = HistoryEngine::build(
        &config(jqdata_settings(
            &server,
            Some(Credentials::new("13800000000", "secret")),
        )),
        directory([ContractData::new("IF2006", Exchange::Cffex, "CTP", true)]),
        gateway,
    )
    .unwrap();
    let mut rx = engine.events.subscribe();

    engine.dispatcher.query_history(
        "IF2006.CFFEX",
        Interval::Daily,
        date(2020, 6, 1),
        date(2020, 6, 5),
    );
    let bars = collect(&mut rx, 1).await.remove(0).outcome.unwrap();

    let closes: Vec<_> = bars.iter().map(|bar| bar.close).collect();
    assert_eq!(closes, vec![dec!(3980), dec!(3990), dec!(4000)]);

    engine.dispatcher.shutdown().await;
}

#[tokio::test]
async fn unknown_instrument_is_reported() {
    let server = silent_vendor().await;
    let engine = HistoryEngine::build(
        &config(jqdata_settings(&server, None)),
        directory(Vec::<ContractData>::new()),
        Arc::new(NoGatewayHistory),
    )
    .unwrap();
    let mut rx = engine.events.subscribe();

    let request_id = engine.dispatcher.query_history(
        "999999.SSE",
        Interval::Daily,
        date(2020, 1, 1),
        date(2020, 1, 2),
    );
    let event = collect(&mut rx, 1).await.remove(0);

    assert_eq!(event.request_id, request_id);
    assert_eq!(event.instrument_id, "999999.SSE");
    assert!(event.request.is_none());
    assert_eq!(
        event.error(),
        Some(&HistoryError::UnknownInstrument {
            instrument_id: "999999.SSE".to_string()
        })
    );

    engine.dispatcher.shutdown().await;
}
