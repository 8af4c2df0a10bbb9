#![allow(clippy::unwrap_used)]
// Session serialization and cancellation, exercised through wiremock.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use modemex_api::{Error, Modem, ModemConfig, Registry, TransportConfig};

const ROOT_PAGE: &str = "<script>\nfunction GetRandCnt() { return 'abcd1234'; }\n</script>";
const STAT_PAGE: &str = "var userEthInfos = new Array(LANStats(\"1\",\"1\",\"2\",\"3\",\"4\"));";
const STAT_PATH: &str = "/html/amp/ethinfo/ethinfo.asp";

async fn setup() -> (MockServer, Arc<dyn Modem>) {
    let server = MockServer::start().await;
    let config = ModemConfig {
        base_url: Url::parse(&server.uri()).unwrap(),
        username: "root".into(),
        password: SecretString::from("secret".to_owned()),
        transport: TransportConfig::default(),
    };
    let modem = Registry::global()
        .build("Huawei", "EG8141A5", config)
        .unwrap();
    (server, Arc::from(modem))
}

fn root_page() -> Mock {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ROOT_PAGE))
}

fn login(delay: Duration) -> Mock {
    Mock::given(method("POST")).and(path("/login.cgi")).respond_with(
        ResponseTemplate::new(200)
            .append_header("Set-Cookie", "SID=abc; path=/")
            .set_delay(delay),
    )
}

fn stat_page(delay: Duration) -> Mock {
    Mock::given(method("GET")).and(path(STAT_PATH)).respond_with(
        ResponseTemplate::new(200)
            .set_body_string(STAT_PAGE)
            .set_delay(delay),
    )
}

async fn request_log(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect()
}

// ── Serialization ───────────────────────────────────────────────────

#[tokio::test]
async fn test_concurrent_reads_share_one_login() {
    let (server, modem) = setup().await;

    root_page().mount(&server).await;
    login(Duration::from_millis(200)).mount(&server).await;
    stat_page(Duration::from_millis(100)).mount(&server).await;

    let cancel = CancellationToken::new();
    let (a, b, c) = tokio::join!(
        modem.read_counters(&cancel),
        modem.read_counters(&cancel),
        modem.read_counters(&cancel),
    );
    assert_eq!(a.unwrap().rx_bytes, 4);
    assert_eq!(b.unwrap().rx_bytes, 4);
    assert_eq!(c.unwrap().rx_bytes, 4);

    // Reads queued behind the first one: one login, then the stat pages,
    // never a second login racing the first.
    assert_eq!(
        request_log(&server).await,
        vec![
            "GET /".to_owned(),
            "POST /login.cgi".to_owned(),
            format!("GET {STAT_PATH}"),
            format!("GET {STAT_PATH}"),
            format!("GET {STAT_PATH}"),
        ]
    );
}

#[tokio::test]
async fn test_concurrent_reads_from_tasks_never_overlap() {
    let (server, modem) = setup().await;

    root_page().mount(&server).await;
    login(Duration::from_millis(100)).mount(&server).await;
    stat_page(Duration::from_millis(50)).mount(&server).await;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let modem = Arc::clone(&modem);
            tokio::spawn(async move { modem.read_counters(&CancellationToken::new()).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let log = request_log(&server).await;
    assert_eq!(log.iter().filter(|l| *l == "POST /login.cgi").count(), 1);
    assert_eq!(log.len(), 6);
}

// ── Cancellation ────────────────────────────────────────────────────

#[tokio::test]
async fn test_precancelled_read_sends_nothing() {
    let (server, modem) = setup().await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = modem.read_counters(&cancel).await.unwrap_err();

    assert!(matches!(err.root_cause(), Error::Cancelled));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cancel_during_login_stores_no_session() {
    let (server, modem) = setup().await;

    root_page().mount(&server).await;
    login(Duration::from_secs(5))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    login(Duration::ZERO).mount(&server).await;
    stat_page(Duration::ZERO).mount(&server).await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = modem.read_counters(&cancel).await.unwrap_err();
    assert!(matches!(err.root_cause(), Error::Cancelled));

    // Nothing was stored, so the next read has to log in again.
    modem
        .read_counters(&CancellationToken::new())
        .await
        .unwrap();
    let log = request_log(&server).await;
    assert_eq!(log.iter().filter(|l| *l == "POST /login.cgi").count(), 2);
}

#[tokio::test]
async fn test_cancel_during_stat_fetch_keeps_session() {
    let (server, modem) = setup().await;

    root_page().mount(&server).await;
    login(Duration::ZERO).mount(&server).await;
    stat_page(Duration::ZERO).up_to_n_times(1).mount(&server).await;
    stat_page(Duration::from_secs(5))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    stat_page(Duration::ZERO).mount(&server).await;

    modem
        .read_counters(&CancellationToken::new())
        .await
        .unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });
    let err = modem.read_counters(&cancel).await.unwrap_err();
    assert!(matches!(err.root_cause(), Error::Cancelled));

    modem
        .read_counters(&CancellationToken::new())
        .await
        .unwrap();
    let log = request_log(&server).await;
    assert_eq!(log.iter().filter(|l| *l == "POST /login.cgi").count(), 1);
}
