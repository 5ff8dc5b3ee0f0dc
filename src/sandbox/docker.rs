//! Docker-backed execution substrate.
//!
//! Each run provisions a fresh container from the configured executor
//! image, waits for it under the caller's timeout, collects its output,
//! and force-removes it on every exit path so nothing lingers under load.

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, LogOutput, LogsOptions, RemoveContainerOptions,
    StartContainerOptions, WaitContainerOptions,
};
use bollard::errors::Error as DockerError;
use bollard::models::HostConfig;
use bollard::Docker;
use futures_util::stream::StreamExt;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{ExecutionSubstrate, ResourcePolicy, SubstrateError};

/// Production substrate: a single bollard client shared by all in-flight
/// requests. The client multiplexes over one daemon connection and is safe
/// for concurrent use, so no pooling or locking is layered on top.
pub struct DockerSubstrate {
    docker: Docker,
    image: String,
}

impl DockerSubstrate {
    /// Connect to the local Docker daemon and bind this substrate to the
    /// named executor image.
    pub fn connect(image: impl Into<String>) -> Result<Self, SubstrateError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| SubstrateError::Api(e.to_string()))?;
        Ok(Self {
            docker,
            image: image.into(),
        })
    }

    /// Executor image this substrate launches containers from.
    pub fn image(&self) -> &str {
        &self.image
    }

    fn classify(&self, err: DockerError) -> SubstrateError {
        match err {
            DockerError::DockerResponseServerError {
                status_code: 404, ..
            } => SubstrateError::ImageMissing {
                image: self.image.clone(),
            },
            other => SubstrateError::Api(other.to_string()),
        }
    }

    async fn wait_for_exit(&self, id: &str) -> Result<i64, SubstrateError> {
        let options = WaitContainerOptions {
            condition: "not-running",
        };
        let mut stream = self.docker.wait_container(id, Some(options));
        match stream.next().await {
            Some(Ok(response)) => Ok(response.status_code),
            // bollard reports a non-zero exit as a wait error carrying the
            // status code
            Some(Err(DockerError::DockerContainerWaitError { code, .. })) => Ok(code),
            Some(Err(err)) => Err(self.classify(err)),
            None => Err(SubstrateError::Api(
                "container wait stream ended without a status".to_string(),
            )),
        }
    }

    /// Collect the container's output: the combined stream in arrival
    /// order, plus stderr alone for diagnostics.
    async fn collect_logs(&self, id: &str) -> Result<(Vec<u8>, String), SubstrateError> {
        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            ..Default::default()
        };
        let mut combined = Vec::new();
        let mut stderr = String::new();
        let mut stream = self.docker.logs(id, Some(options));
        while let Some(chunk) = stream.next().await {
            match chunk.map_err(|e| self.classify(e))? {
                LogOutput::StdOut { message } => combined.extend_from_slice(&message),
                LogOutput::StdErr { message } => {
                    stderr.push_str(&String::from_utf8_lossy(&message));
                    combined.extend_from_slice(&message);
                }
                _ => {}
            }
        }
        Ok((combined, stderr))
    }

    async fn finish(&self, id: &str, timeout: Duration) -> Result<Vec<u8>, SubstrateError> {
        let status = match tokio::time::timeout(timeout, self.wait_for_exit(id)).await {
            Ok(waited) => waited?,
            Err(_) => {
                return Err(SubstrateError::Timeout {
                    limit_secs: timeout.as_secs(),
                })
            }
        };

        let (combined, stderr) = self.collect_logs(id).await?;
        if status == 0 {
            Ok(combined)
        } else {
            let stderr = if stderr.trim().is_empty() {
                String::from_utf8_lossy(&combined).into_owned()
            } else {
                stderr
            };
            Err(SubstrateError::ProgramFailed {
                exit_code: status,
                stderr,
            })
        }
    }

    /// Force-remove a container. Removal failures are logged, never
    /// propagated; the run's outcome is already decided by this point.
    async fn remove(&self, id: &str) {
        let options = RemoveContainerOptions {
            force: true,
            ..Default::default()
        };
        if let Err(err) = self.docker.remove_container(id, Some(options)).await {
            warn!(container = id, "failed to remove container: {}", err);
        }
    }
}

#[async_trait]
impl ExecutionSubstrate for DockerSubstrate {
    async fn run(
        &self,
        command: Vec<String>,
        policy: &ResourcePolicy,
        timeout: Duration,
    ) -> Result<Vec<u8>, SubstrateError> {
        let name = format!("sandrun-{}", Uuid::new_v4());
        debug!(container = name.as_str(), image = self.image.as_str(), "launching sandbox");

        let config = Config {
            image: Some(self.image.clone()),
            cmd: Some(command),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            network_disabled: Some(policy.network_disabled),
            host_config: Some(HostConfig {
                memory: Some(policy.memory_bytes),
                cpu_period: Some(policy.cpu_period),
                cpu_quota: Some(policy.cpu_quota),
                ..Default::default()
            }),
            ..Default::default()
        };

        let options = CreateContainerOptions {
            name: name.as_str(),
            platform: None,
        };
        let created = self
            .docker
            .create_container(Some(options), config)
            .await
            .map_err(|e| self.classify(e))?;
        let id = created.id;

        if let Err(err) = self
            .docker
            .start_container(&id, None::<StartContainerOptions<String>>)
            .await
        {
            self.remove(&id).await;
            return Err(self.classify(err));
        }

        // Force-removal doubles as the kill switch on the timeout path.
        let result = self.finish(&id, timeout).await;
        self.remove(&id).await;
        result
    }
}
