//! CloudWatch Logs implementation of [`LogSource`].
//!
//! One shared base config (credentials, retry, timeouts) is loaded once;
//! per-region clients are derived from it lazily and cached, since every
//! pass fans out over the same region set.

use std::collections::HashMap;
use std::sync::Mutex;

use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_cloudwatchlogs::Client;
use aws_sdk_cloudwatchlogs::config::http::HttpResponse;
use aws_sdk_cloudwatchlogs::config::{Builder as ConfigBuilder, Region};
use aws_sdk_cloudwatchlogs::error::SdkError;
use aws_sdk_cloudwatchlogs::operation::describe_log_streams::DescribeLogStreamsError;
use tracing::debug;

use crate::error::SourceError;
use crate::LogSource;

/// CloudWatch Logs client fan-out across regions.
pub struct CloudWatchLogsSource {
    base: SdkConfig,
    clients: Mutex<HashMap<String, Client>>,
}

impl CloudWatchLogsSource {
    /// Load credentials and shared client config from the environment.
    pub async fn connect() -> Self {
        let base = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::from_config(base)
    }

    /// Build from an already-loaded SDK config.
    pub fn from_config(base: SdkConfig) -> Self {
        Self {
            base,
            clients: Mutex::new(HashMap::new()),
        }
    }

    fn client_for(&self, region: &str) -> Client {
        let mut clients = self
            .clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        clients
            .entry(region.to_string())
            .or_insert_with(|| {
                debug!(%region, "building CloudWatch Logs client");
                let conf = ConfigBuilder::from(&self.base)
                    .region(Region::new(region.to_string()))
                    .build();
                Client::from_conf(conf)
            })
            .clone()
    }
}

impl LogSource for CloudWatchLogsSource {
    async fn list_streams(
        &self,
        region: &str,
        log_group: &str,
    ) -> Result<Vec<String>, SourceError> {
        let client = self.client_for(region);
        let output = client
            .describe_log_streams()
            .log_group_name(log_group)
            .send()
            .await
            .map_err(|err| classify_describe(region, err))?;

        Ok(output
            .log_streams()
            .iter()
            .filter_map(|stream| stream.log_stream_name().map(str::to_string))
            .collect())
    }

    async fn latest_message(
        &self,
        region: &str,
        log_group: &str,
        stream: &str,
    ) -> Result<Option<String>, SourceError> {
        let client = self.client_for(region);
        let output = client
            .get_log_events()
            .log_group_name(log_group)
            .log_stream_name(stream)
            .limit(1)
            .start_from_head(false)
            .send()
            .await
            .map_err(|err| {
                SourceError::transport(region, err.into_service_error().to_string())
            })?;

        Ok(output
            .events()
            .first()
            .and_then(|event| event.message())
            .map(str::to_string))
    }
}

/// Map a `DescribeLogStreams` failure into the source taxonomy.
///
/// A missing log group means the monitored service is not deployed in the
/// region at all; everything else is a transport fault.
fn classify_describe(
    region: &str,
    err: SdkError<DescribeLogStreamsError, HttpResponse>,
) -> SourceError {
    let service_err = err.into_service_error();
    if service_err.is_resource_not_found_exception() {
        SourceError::unsupported(region)
    } else {
        SourceError::transport(region, service_err.to_string())
    }
}
