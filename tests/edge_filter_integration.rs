//! Integration tests for the edge server with a Wiremock origin
//!
//! The API and edge routers share one store, as they do in the binary: a
//! code saved through the API takes effect on the next edge request.

use geoblock::adapters::inbound::{
    api_router, edge_router, ApiState, EdgeState, ACCOUNT_ID_HEADER, FORWARDED_FOR_HEADER,
    SITE_ID_HEADER,
};
use geoblock::adapters::outbound::{DashMapConfigStore, OriginProxy, SiteEnvironment};
use geoblock::domain::ports::ConfigStore;
use geoblock::{blocked_country_integration, GeoMetadata, GeoResolver, SiteScope};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FRENCH_CLIENT: &str = "81.2.69.142";
const GERMAN_CLIENT: &str = "89.160.20.112";

/// Resolves the two test addresses, nothing else
struct StaticGeoResolver;

impl GeoResolver for StaticGeoResolver {
    fn resolve(&self, ip: IpAddr) -> Option<GeoMetadata> {
        match ip.to_string().as_str() {
            FRENCH_CLIENT => Some(GeoMetadata::new("FR", "France")),
            GERMAN_CLIENT => Some(GeoMetadata::new("DE", "Germany")),
            _ => None,
        }
    }
}

struct Harness {
    edge: SocketAddr,
    api: SocketAddr,
    client: reqwest::Client,
}

impl Harness {
    async fn start(origin_uri: &str) -> Self {
        let store: Arc<dyn ConfigStore> = Arc::new(DashMapConfigStore::new());
        let integration = blocked_country_integration();

        let edge_state = EdgeState {
            integration: Arc::new(integration.clone()),
            geo_resolver: Some(Arc::new(StaticGeoResolver)),
            env: Arc::new(SiteEnvironment::new(
                store.clone(),
                SiteScope::new("team-1", "site-1"),
            )),
            origin: OriginProxy::new(origin_uri, Duration::from_secs(5)).unwrap(),
            // Every test connection comes from loopback
            trust_forwarded_for: true,
        };

        let edge_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let edge = edge_listener.local_addr().unwrap();
        let edge_app = edge_router(edge_state);
        tokio::spawn(async move {
            axum::serve(
                edge_listener,
                edge_app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        let api_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let api = api_listener.local_addr().unwrap();
        let api_app = api_router(ApiState::new(integration, store));
        tokio::spawn(async move {
            axum::serve(api_listener, api_app).await.unwrap();
        });

        Self {
            edge,
            api,
            client: reqwest::Client::new(),
        }
    }

    async fn block(&self, code: &str) {
        let resp = self
            .client
            .post(format!("http://{}/api/save-blocked-country-code", self.api))
            .header(SITE_ID_HEADER, "site-1")
            .header(ACCOUNT_ID_HEADER, "team-1")
            .body(format!(r#"{{"BLOCKED_COUNTRY_CODE":"{}"}}"#, code))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    async fn get_from(&self, client_ip: &str, page: &str) -> reqwest::Response {
        self.client
            .get(format!("http://{}{}", self.edge, page))
            .header(FORWARDED_FOR_HEADER, client_ip)
            .send()
            .await
            .unwrap()
    }
}

/// A request from the blocked country never reaches the origin
#[tokio::test]
async fn test_blocked_country_never_reaches_origin() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let harness = Harness::start(&mock_server.uri()).await;
    harness.block("FR").await;

    let resp = harness.get_from(FRENCH_CLIENT, "/").await;

    assert_eq!(resp.status(), 451);
    assert_eq!(resp.headers()["content-type"], "text/html");
    assert_eq!(
        resp.text().await.unwrap(),
        "We're sorry, you can't access our content from France!"
    );
}

/// Other countries get the origin's response untouched
#[tokio::test]
async fn test_other_country_passes_through() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-origin", "mock")
                .set_body_string("product list"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let harness = Harness::start(&mock_server.uri()).await;
    harness.block("FR").await;

    let resp = harness.get_from(GERMAN_CLIENT, "/products").await;

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["x-origin"], "mock");
    assert_eq!(resp.text().await.unwrap(), "product list");
}

/// Nothing saved yet: everybody gets through
#[tokio::test]
async fn test_unconfigured_site_allows_everyone() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("welcome"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let harness = Harness::start(&mock_server.uri()).await;

    let resp = harness.get_from(FRENCH_CLIENT, "/").await;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "welcome");
}

/// Changing the blocked code takes effect on the next request
#[tokio::test]
async fn test_code_change_applies_immediately() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let harness = Harness::start(&mock_server.uri()).await;

    harness.block("FR").await;
    assert_eq!(harness.get_from(FRENCH_CLIENT, "/").await.status(), 451);
    assert_eq!(harness.get_from(GERMAN_CLIENT, "/").await.status(), 200);

    harness.block("DE").await;
    assert_eq!(harness.get_from(FRENCH_CLIENT, "/").await.status(), 200);
    assert_eq!(harness.get_from(GERMAN_CLIENT, "/").await.status(), 451);
}

/// Origin errors are passed through, not rewritten
#[tokio::test]
async fn test_origin_error_status_passes_through() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let harness = Harness::start(&mock_server.uri()).await;
    harness.block("FR").await;

    let resp = harness.get_from(GERMAN_CLIENT, "/").await;
    assert_eq!(resp.status(), 503);
    assert_eq!(resp.text().await.unwrap(), "maintenance");
}

/// An unreachable origin answers 502
#[tokio::test]
async fn test_origin_down_is_bad_gateway() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let harness = Harness::start(&format!("http://{}", addr)).await;

    let resp = harness.get_from(GERMAN_CLIENT, "/").await;
    assert_eq!(resp.status(), 502);
    assert!(resp.text().await.unwrap().starts_with("Bad Gateway:"));
}
