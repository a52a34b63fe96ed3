//! The scrape endpoint.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/` | Landing page |
//! | GET | `/metrics` | Runs one collection pass, text exposition |

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;

use rdsmon_source::{LogSource, RegionLister};

use crate::exposition::{self, TEXT_FORMAT_CONTENT_TYPE};
use crate::passes::Exporter;

/// Build the exporter's router. Discovery must already have run; every
/// request to `/metrics` triggers a fresh collection pass.
pub fn build_router<R, S>(exporter: Arc<Exporter<R, S>>) -> Router
where
    R: RegionLister + 'static,
    S: LogSource + 'static,
{
    Router::new()
        .route("/", get(index))
        .route("/metrics", get(metrics::<R, S>))
        .with_state(exporter)
}

/// GET /metrics
async fn metrics<R, S>(State(exporter): State<Arc<Exporter<R, S>>>) -> impl IntoResponse
where
    R: RegionLister + 'static,
    S: LogSource + 'static,
{
    let report = exporter.collect().await;
    let body = exposition::render(
        exporter.registry().namespace(),
        &exporter.registry().descriptors(),
        &report,
    );
    ([(header::CONTENT_TYPE, TEXT_FORMAT_CONTENT_TYPE)], body)
}

/// GET /
async fn index() -> Html<&'static str> {
    Html(
        "<html><head><title>rdsmon</title></head>\
         <body><h1>RDS OS Metrics Exporter</h1>\
         <p><a href=\"/metrics\">Metrics</a></p></body></html>",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use rdsmon_core::MetricRegistry;
    use rdsmon_source::{MemorySource, StaticRegions};

    use crate::passes::ScrapeConfig;

    fn test_exporter() -> Arc<Exporter<StaticRegions, MemorySource>> {
        let source = MemorySource::new().with_stream(
            "eu-west-1",
            "db-1",
            r#"{"instanceID":"db-1","freeStorage":42.0}"#,
        );
        Arc::new(Exporter::new(
            StaticRegions::new(vec!["eu-west-1".into()]),
            source,
            Arc::new(MetricRegistry::new("rdsosmetrics", "RDSOSMetrics")),
            ScrapeConfig::new("RDSOSMetrics"),
        ))
    }

    #[tokio::test]
    async fn metrics_endpoint_serves_text_format() {
        let exporter = test_exporter();
        exporter.discover().await;

        let resp = metrics(State(Arc::clone(&exporter))).await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.starts_with("text/plain"));
    }

    #[tokio::test]
    async fn index_serves_landing_page() {
        let resp = index().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.contains("text/html"));
    }
}
