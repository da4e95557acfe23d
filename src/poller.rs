use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use crate::error::Result;
use crate::jenkins::JenkinsClient;
use crate::metrics::{build_metric_set, MetricSet, Property};
use crate::sink::MetricsSink;

/// Periodically fetches every job from Jenkins and republishes its metric set.
///
/// A failed fetch ends the loop with the error; nothing is retried and nothing from
/// the failing cycle reaches the sink.
pub struct Poller {
    client: JenkinsClient,
    sink: Arc<dyn MetricsSink>,
    properties: Vec<Property>,
    interval: Duration,
}

impl Poller {
    pub fn new(
        client: JenkinsClient,
        sink: Arc<dyn MetricsSink>,
        properties: Vec<Property>,
        interval: Duration,
    ) -> Self {
        Self {
            client,
            sink,
            properties,
            interval,
        }
    }

    /// Fetches and derives the metric set of every job without publishing it.
    pub async fn collect(&self) -> Result<Vec<MetricSet>> {
        let jobs = self.client.fetch_jobs().await?;
        Ok(jobs
            .iter()
            .map(|job| build_metric_set(job, &self.properties))
            .collect())
    }

    /// Runs one fetch/derive/publish cycle and returns the number of jobs published.
    pub async fn poll_once(&self) -> Result<usize> {
        let sets = self.collect().await?;
        for set in &sets {
            self.sink.publish(set);
        }
        Ok(sets.len())
    }

    pub async fn run(&self) -> Result<()> {
        info!(
            "Launching metrics update loop: polling {} every {}s",
            self.client.api_url().origin().ascii_serialization(),
            self.interval.as_secs()
        );

        loop {
            let published = self.poll_once().await?;
            debug!("Updated metrics for {published} jobs");
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use mockito::Matcher;

    use crate::config::JenkinsConfig;
    use crate::error::ExporterError;
    use crate::jenkins::Slot;
    use crate::metrics::MetricKey;

    #[derive(Default)]
    struct RecordingSink {
        samples: Mutex<Vec<(String, String, f64)>>,
    }

    impl MetricsSink for RecordingSink {
        fn set(&self, key: MetricKey, job: &str, value: f64) {
            self.samples
                .lock()
                .unwrap()
                .push((key.to_string(), job.to_string(), value));
        }
    }

    impl RecordingSink {
        fn value(&self, key: &str, job: &str) -> Option<f64> {
            self.samples
                .lock()
                .unwrap()
                .iter()
                .find(|(k, j, _)| k == key && j == job)
                .map(|&(_, _, v)| v)
        }
    }

    fn poller_for(
        server: &mockito::Server,
        sink: Arc<RecordingSink>,
        properties: Vec<Property>,
    ) -> Poller {
        let address = server.socket_address();
        let config = JenkinsConfig {
            host: address.ip().to_string(),
            port: address.port(),
            ..JenkinsConfig::default()
        };
        let client = JenkinsClient::new(&config).unwrap();
        Poller::new(client, sink, properties, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_poll_once_publishes_every_job() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"jobs": [
                    {"name": "app", "fullName": "team/app", "color": "red",
                     "lastBuild": {"number": 9, "timestamp": 1700000000000, "duration": 0, "actions": [
                        {"_class": "hudson.model.CauseAction", "causes": [{"_class": "hudson.model.Cause$UserIdCause"}]}
                     ]}},
                    {"name": "old-style",
                     "lastBuild": {"number": 2, "timestamp": 1600000000000, "duration": 100, "result": "FAILURE", "actions": [
                        {"causes": [{"shortDescription": "Started by timer"}]}
                     ]}}
                ]}"#,
            )
            .create_async()
            .await;

        let sink = Arc::new(RecordingSink::default());
        let poller = poller_for(&server, sink.clone(), Property::CORE.to_vec());

        let published = poller.poll_once().await.unwrap();

        assert_eq!(published, 2);
        assert_eq!(sink.samples.lock().unwrap().len(), 2 * (7 * 7 + 1));
        assert_eq!(sink.value("lastBuildNumber", "team/app"), Some(9.0));
        assert_eq!(sink.value("lastBuildColor", "team/app"), Some(1.0));
        assert_eq!(sink.value("lastBuildResult", "team/app"), Some(4.0));
        assert_eq!(sink.value("lastBuildCause", "team/app"), Some(1.0));
        assert_eq!(sink.value("lastBuildResult", "old-style"), Some(0.0));
        assert_eq!(sink.value("lastBuildCause", "old-style"), Some(0.0));
        assert_eq!(sink.value("lastBuildColor", "old-style"), Some(-1.0));
        assert_eq!(sink.value("lastFailedBuildNumber", "old-style"), Some(0.0));
    }

    #[tokio::test]
    async fn test_failed_fetch_publishes_nothing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"jobs": [{"name": "app"}, {"name": "#)
            .create_async()
            .await;

        let sink = Arc::new(RecordingSink::default());
        let poller = poller_for(&server, sink.clone(), Property::CORE.to_vec());

        let err = poller.poll_once().await.unwrap_err();

        assert!(matches!(err, ExporterError::Json(_)));
        assert!(sink.samples.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_stops_on_first_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/json")
            .match_query(Matcher::Any)
            .with_status(502)
            .create_async()
            .await;

        let sink = Arc::new(RecordingSink::default());
        let poller = poller_for(&server, sink, Property::CORE.to_vec());

        let err = poller.run().await.unwrap_err();
        assert!(matches!(err, ExporterError::Api { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_collect_honours_property_set() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"jobs": [{"name": "app"}]}"#)
            .create_async()
            .await;

        let sink = Arc::new(RecordingSink::default());
        let poller = poller_for(&server, sink, Property::enabled(true));

        let sets = poller.collect().await.unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].get(Slot::LastBuild, Property::SkipCount), Some(-1.0));
    }
}
