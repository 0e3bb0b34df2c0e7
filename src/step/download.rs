// src/step/download.rs

//! Remote file and game jar steps

use std::path::PathBuf;
use tracing::info;
use url::Url;

use super::{RemoteSource, Step, StepContext, output_exists};
use crate::error::Result;
use crate::manifest::Side;

/// Fetch one remote file to a fixed destination
#[derive(Debug, Clone)]
pub struct DownloadFileStep {
    name: String,
    source: RemoteSource,
    output: PathBuf,
}

impl DownloadFileStep {
    pub fn new(name: impl Into<String>, source: RemoteSource, output: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source,
            output: output.into(),
        }
    }

    pub fn output(&self) -> &std::path::Path {
        &self.output
    }
}

impl Step for DownloadFileStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_satisfied(&self) -> bool {
        output_exists(&self.output)
    }

    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<()> {
        let url = self.source.resolve()?;
        info!("Input URL: {}", url);
        info!("Output file: {}", self.output.display());
        ctx.fetcher.fetch(&url, &self.output)?;
        Ok(())
    }
}

/// File name of a game jar
///
/// The suffix is chosen from the path of the source URL: a path mentioning
/// `client` gives the plain `<version>.jar`, anything else the server jar.
/// The host and query are not considered.
pub fn jar_file_name(version: &str, url: &str) -> String {
    let is_client = match Url::parse(url) {
        Ok(parsed) => parsed.path().contains("client"),
        Err(_) => url.contains("client"),
    };
    if is_client {
        format!("{version}.jar")
    } else {
        format!("{version}-server.jar")
    }
}

/// Fetch a game jar into a directory, naming it after the version and side
#[derive(Debug, Clone)]
pub struct DownloadJarStep {
    version: String,
    side: Side,
    source: RemoteSource,
    output_dir: PathBuf,
}

impl DownloadJarStep {
    pub fn new(
        version: impl Into<String>,
        side: Side,
        source: RemoteSource,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            version: version.into(),
            side,
            source,
            output_dir: output_dir.into(),
        }
    }

    /// Where the jar is expected to land for this step's side
    pub fn expected_output(&self) -> PathBuf {
        let name = match self.side {
            Side::Client => format!("{}.jar", self.version),
            Side::Server => format!("{}-server.jar", self.version),
        };
        self.output_dir.join(name)
    }
}

impl Step for DownloadJarStep {
    fn name(&self) -> &str {
        self.side.name()
    }

    fn is_satisfied(&self) -> bool {
        output_exists(&self.expected_output())
    }

    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<()> {
        let url = self.source.resolve()?;
        let jar = self.output_dir.join(jar_file_name(&self.version, &url));
        info!("Input URL: {}", url);
        info!("Output file: {}", jar.display());
        ctx.fetcher.fetch(&url, &jar)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::MemoryFetcher;
    use super::super::{FailurePolicy, Pipeline, StepOutcome};
    use super::*;
    use crate::deps::DependencyRegistry;
    use crate::error::Error;

    #[test]
    fn test_jar_file_name() {
        assert_eq!(
            jar_file_name("a1.2.6", "https://launcher/objects/abc/client.jar"),
            "a1.2.6.jar"
        );
        assert_eq!(
            jar_file_name("a1.2.6", "https://launcher/objects/def/server.jar"),
            "a1.2.6-server.jar"
        );
    }

    #[test]
    fn test_jar_file_name_ignores_host_and_query() {
        assert_eq!(
            jar_file_name("a1.2.6", "https://client-cdn.example.com/v1/objects/abc/server.jar"),
            "a1.2.6-server.jar"
        );
        assert_eq!(
            jar_file_name("a1.2.6", "https://cdn.example.com/server.jar?from=client"),
            "a1.2.6-server.jar"
        );
    }

    #[test]
    fn test_server_jar_from_client_host_keeps_client_jar() {
        let dir = tempfile::tempdir().unwrap();
        let client_url = "https://client-cdn.example.com/objects/abc/client.jar";
        let server_url = "https://client-cdn.example.com/objects/def/server.jar";
        let fetcher = MemoryFetcher::default()
            .with(client_url, "CLIENT")
            .with(server_url, "SERVER");
        let mut registry = DependencyRegistry::new();

        let mut pipeline = Pipeline::new(FailurePolicy::FailFast);
        pipeline
            .push(DownloadJarStep::new(
                "a1.2.6",
                Side::Client,
                RemoteSource::Url(client_url.into()),
                dir.path(),
            ))
            .push(DownloadJarStep::new(
                "a1.2.6",
                Side::Server,
                RemoteSource::Url(server_url.into()),
                dir.path(),
            ));

        pipeline
            .run(&mut StepContext::new(&fetcher, &mut registry))
            .unwrap();
        let second = pipeline
            .run(&mut StepContext::new(&fetcher, &mut registry))
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("a1.2.6.jar")).unwrap(),
            "CLIENT"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a1.2.6-server.jar")).unwrap(),
            "SERVER"
        );
        assert_eq!(second.outcome("server"), Some(&StepOutcome::Skipped));
        assert_eq!(fetcher.call_count(), 2);
    }

    #[test]
    fn test_download_file_skips_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("version_manifest.json");
        let fetcher = MemoryFetcher::default().with("https://meta/manifest.json", "{}");
        let mut registry = DependencyRegistry::new();

        let mut pipeline = Pipeline::new(FailurePolicy::Forgiving);
        pipeline.push(DownloadFileStep::new(
            "manifest",
            RemoteSource::Url("https://meta/manifest.json".into()),
            &output,
        ));

        let first = pipeline
            .run(&mut StepContext::new(&fetcher, &mut registry))
            .unwrap();
        let second = pipeline
            .run(&mut StepContext::new(&fetcher, &mut registry))
            .unwrap();

        assert_eq!(first.outcome("manifest"), Some(&StepOutcome::Completed));
        assert_eq!(second.outcome("manifest"), Some(&StepOutcome::Skipped));
        assert_eq!(fetcher.call_count(), 1);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "{}");
    }

    #[test]
    fn test_download_file_failure_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing.json");
        let fetcher = MemoryFetcher::default();
        let mut registry = DependencyRegistry::new();
        let step = DownloadFileStep::new("missing", RemoteSource::Url("https://x/y".into()), &output);

        let result = step.execute(&mut StepContext::new(&fetcher, &mut registry));

        assert!(matches!(result, Err(Error::DownloadError(_))));
        assert!(!output.exists());
    }

    #[test]
    fn test_download_jar_names_by_url() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = MemoryFetcher::default()
            .with("https://cdn/client.jar", "client")
            .with("https://cdn/server.jar", "server");
        let mut registry = DependencyRegistry::new();
        let mut ctx = StepContext::new(&fetcher, &mut registry);

        let client = DownloadJarStep::new(
            "a1.2.6",
            Side::Client,
            RemoteSource::Url("https://cdn/client.jar".into()),
            dir.path(),
        );
        let server = DownloadJarStep::new(
            "a1.2.6",
            Side::Server,
            RemoteSource::Url("https://cdn/server.jar".into()),
            dir.path(),
        );
        assert!(!client.is_satisfied());

        client.execute(&mut ctx).unwrap();
        server.execute(&mut ctx).unwrap();

        assert!(client.is_satisfied());
        assert!(server.is_satisfied());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a1.2.6-server.jar")).unwrap(),
            "server"
        );
    }
}
