// ABOUTME: In-memory engine for unit tests.
// ABOUTME: Records every call so tests can assert on what the controller and selector did.

use super::traits::sealed::Sealed;
use super::traits::{
    ContainerError, ContainerInfo, ContainerOps, ImageError, ImageOps, RuntimeInfo,
    RuntimeInfoError,
};
use crate::types::ContainerId;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    /// What `inspect_self` returns; `None` means the container is unknown.
    pub self_info: Option<ContainerInfo>,
    pub local_images: Vec<String>,
    pub ping_fails: bool,
    /// How long `ping` takes before answering.
    pub ping_delay: Option<Duration>,
    pub pull_fails: bool,
    pub run_fails: bool,
    pub inspected: Vec<String>,
    pub pulled: Vec<String>,
    pub launched: Vec<ContainerInfo>,
    pub closed: usize,
}

/// Clones share state, so a test can keep a handle after boxing one.
#[derive(Debug, Clone)]
pub(crate) struct FakeRuntime {
    name: &'static str,
    state: Arc<Mutex<FakeState>>,
}

impl FakeRuntime {
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            state: Arc::default(),
        }
    }

    pub fn failing_ping(self) -> Self {
        self.state().ping_fails = true;
        self
    }

    pub fn stalled_ping(self, delay: Duration) -> Self {
        self.state().ping_delay = Some(delay);
        self
    }

    pub fn with_self(self, info: ContainerInfo) -> Self {
        self.state().self_info = Some(info);
        self
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

impl Sealed for FakeRuntime {}

#[async_trait]
impl RuntimeInfo for FakeRuntime {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn ping(&self) -> Result<(), RuntimeInfoError> {
        let delay = self.state().ping_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.state().ping_fails {
            return Err(RuntimeInfoError::ConnectionFailed("ping refused".to_string()));
        }
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), RuntimeInfoError> {
        self.state().closed += 1;
        Ok(())
    }
}

#[async_trait]
impl ContainerOps for FakeRuntime {
    async fn inspect_self(&self, self_id: &ContainerId) -> Result<ContainerInfo, ContainerError> {
        let mut state = self.state();
        state.inspected.push(self_id.to_string());
        state
            .self_info
            .clone()
            .ok_or_else(|| ContainerError::NotFound(self_id.to_string()))
    }

    async fn run_container(&self, info: &ContainerInfo) -> Result<ContainerId, ContainerError> {
        let mut state = self.state();
        if state.run_fails {
            return Err(ContainerError::Launch {
                image: info.image.clone(),
                reason: "create refused".to_string(),
            });
        }
        state.launched.push(info.clone());
        Ok(ContainerId::new(format!("fake{}", state.launched.len())))
    }
}

#[async_trait]
impl ImageOps for FakeRuntime {
    async fn image_exists(&self, reference: &str) -> bool {
        self.state().local_images.iter().any(|image| image == reference)
    }

    async fn pull_image(&self, reference: &str) -> Result<(), ImageError> {
        let mut state = self.state();
        if state.pull_fails {
            return Err(ImageError::PullFailed {
                image: reference.to_string(),
                reason: "manifest unknown".to_string(),
            });
        }
        state.pulled.push(reference.to_string());
        state.local_images.push(reference.to_string());
        Ok(())
    }
}
