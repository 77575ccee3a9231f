//! Tests for the two orchestrator variants.

use super::*;
use crate::propagation::NoopPropagator;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Mock resolvers
// ============================================================================

struct MockLocalityResolver {
    result: Result<String, ResolveError>,
}

#[async_trait::async_trait]
impl LocalityResolver for MockLocalityResolver {
    async fn resolve(&self, _cx: &Context, _zip_code: &str) -> Result<String, ResolveError> {
        self.result.clone()
    }
}

struct MockTemperatureResolver {
    result: Result<TemperatureReading, ResolveError>,
    calls: AtomicUsize,
}

impl MockTemperatureResolver {
    fn returning(result: Result<TemperatureReading, ResolveError>) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl TemperatureResolver for MockTemperatureResolver {
    async fn resolve(
        &self,
        _cx: &Context,
        locality: &str,
    ) -> Result<TemperatureReading, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map(|reading| reading.finalize(locality))
    }
}

fn sample_reading() -> TemperatureReading {
    TemperatureReading {
        city: String::new(),
        temp_c: 25.0,
        temp_f: 77.0,
        temp_k: 0.0,
    }
}

// ============================================================================
// LookupChain (local two-hop variant)
// ============================================================================

#[tokio::test]
async fn test_chain_sequences_locality_then_temperature() {
    // Arrange
    let locality = Arc::new(MockLocalityResolver {
        result: Ok("São Paulo".to_string()),
    });
    let temperature = MockTemperatureResolver::returning(Ok(sample_reading()));
    let chain = LookupChain::new(locality, temperature.clone());

    // Act
    let reading = chain
        .lookup(&Context::new(), "01001000")
        .await
        .unwrap();

    // Assert
    assert_eq!(reading.city, "São Paulo");
    assert_eq!(reading.temp_k, 298.15);
    assert_eq!(temperature.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_chain_not_found_short_circuits() {
    // Arrange
    let locality = Arc::new(MockLocalityResolver {
        result: Err(ResolveError::NotFound),
    });
    let temperature = MockTemperatureResolver::returning(Ok(sample_reading()));
    let chain = LookupChain::new(locality, temperature.clone());

    // Act
    let result = chain.lookup(&Context::new(), "99999999").await;

    // Assert - error propagates unchanged, second hop never happens
    assert_eq!(result, Err(ResolveError::NotFound));
    assert_eq!(
        temperature.calls.load(Ordering::SeqCst),
        0,
        "temperature resolver must not run for an unresolved postal code"
    );
}

#[tokio::test]
async fn test_chain_propagates_locality_internal_error_unchanged() {
    let locality = Arc::new(MockLocalityResolver {
        result: Err(ResolveError::internal("directory unreachable")),
    });
    let temperature = MockTemperatureResolver::returning(Ok(sample_reading()));
    let chain = LookupChain::new(locality, temperature.clone());

    let result = chain.lookup(&Context::new(), "01001000").await;

    assert_eq!(
        result,
        Err(ResolveError::Internal {
            message: "directory unreachable".to_string()
        })
    );
    assert_eq!(temperature.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_chain_propagates_temperature_error_unchanged() {
    let locality = Arc::new(MockLocalityResolver {
        result: Ok("São Paulo".to_string()),
    });
    let temperature =
        MockTemperatureResolver::returning(Err(ResolveError::internal("weather unreachable")));
    let chain = LookupChain::new(locality, temperature);

    let result = chain.lookup(&Context::new(), "01001000").await;

    assert_eq!(
        result,
        Err(ResolveError::Internal {
            message: "weather unreachable".to_string()
        })
    );
}

// ============================================================================
// PeerLookup (cross-service variant)
// ============================================================================

fn peer_lookup_for(server: &MockServer) -> PeerLookup {
    PeerLookup::new(
        reqwest::Client::new(),
        server.uri(),
        Arc::new(NoopPropagator),
    )
}

#[tokio::test]
async fn test_peer_lookup_decodes_reading() {
    // Arrange
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("zipcode", "01001000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "city": "São Paulo",
            "temp_C": 25.0,
            "temp_F": 77.0,
            "temp_K": 298.15
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Act
    let reading = peer_lookup_for(&mock_server)
        .lookup(&Context::new(), "01001000")
        .await
        .unwrap();

    // Assert
    assert_eq!(reading.city, "São Paulo");
    assert_eq!(reading.temp_k, 298.15);
}

#[tokio::test]
async fn test_peer_404_maps_to_not_found() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("can not find zipcode"))
        .mount(&mock_server)
        .await;

    let result = peer_lookup_for(&mock_server)
        .lookup(&Context::new(), "99999999")
        .await;

    assert_eq!(result, Err(ResolveError::NotFound));
}

#[tokio::test]
async fn test_peer_error_status_maps_to_internal() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal server error"))
        .mount(&mock_server)
        .await;

    let result = peer_lookup_for(&mock_server)
        .lookup(&Context::new(), "01001000")
        .await;

    assert!(matches!(result, Err(ResolveError::Internal { .. })));
}

#[tokio::test]
async fn test_peer_undecodable_body_maps_to_internal() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let result = peer_lookup_for(&mock_server)
        .lookup(&Context::new(), "01001000")
        .await;

    assert!(matches!(result, Err(ResolveError::Internal { .. })));
}

#[tokio::test]
async fn test_peer_transport_failure_maps_to_internal() {
    // A dedicated (unpooled) server is required here: pooled servers from
    // `MockServer::start()` keep listening after drop, so the URI would
    // still answer instead of producing a transport failure.
    let mock_server = MockServer::builder().start().await;
    let uri = mock_server.uri();
    drop(mock_server);

    let lookup = PeerLookup::new(reqwest::Client::new(), uri, Arc::new(NoopPropagator));
    let result = lookup.lookup(&Context::new(), "01001000").await;

    assert!(matches!(result, Err(ResolveError::Internal { .. })));
}
