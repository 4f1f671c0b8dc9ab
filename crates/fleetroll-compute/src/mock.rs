//! Scripted in-memory [`ComputeClient`] for tests.
//!
//! Fixtures (images, templates, the group) are set up front; per-operation
//! response queues script failures and state transitions; call counters
//! and recorded mutations let tests assert the exact provider trace.
//! When a queue runs dry the mock falls back to its fixture state, so
//! simple tests only script the interesting calls.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::client::ComputeClient;
use crate::error::{ComputeError, ComputeResult};
use crate::types::{Image, InstanceGroup, InstanceTemplate, ManagedInstance};

/// Per-operation call counts.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Calls {
    pub list_images: usize,
    pub get_template: usize,
    pub list_templates: usize,
    pub insert_template: usize,
    pub set_template: usize,
    pub get_group: usize,
    pub list_instances: usize,
    pub recreate: usize,
    pub resize: usize,
}

#[derive(Default)]
struct Inner {
    images: Vec<Image>,
    templates: Vec<InstanceTemplate>,
    group: Option<InstanceGroup>,

    inserted: Vec<InstanceTemplate>,
    set_template_links: Vec<String>,
    recreated: Vec<Vec<String>>,
    resizes: Vec<u64>,

    insert_results: VecDeque<ComputeResult<()>>,
    set_template_results: VecDeque<ComputeResult<()>>,
    group_results: VecDeque<ComputeResult<InstanceGroup>>,
    instance_lists: VecDeque<ComputeResult<Vec<ManagedInstance>>>,
    last_instances: Vec<ManagedInstance>,
    resize_results: VecDeque<ComputeResult<()>>,

    calls: Calls,
}

/// Scripted compute client.
#[derive(Default)]
pub struct MockCompute {
    inner: Mutex<Inner>,
}

impl MockCompute {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transient provider failure for scripting retry paths.
    pub fn transient(message: &str) -> ComputeError {
        ComputeError::Status {
            status: 503,
            message: message.to_string(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ── Fixtures ──────────────────────────────────────────────────

    /// Append an image; `list_images` returns insertion order.
    pub fn add_image(&self, name: &str) {
        self.lock().images.push(Image::new(name));
    }

    /// Append a pre-existing template, visible to both get and list.
    pub fn add_template(&self, template: InstanceTemplate) {
        self.lock().templates.push(template);
    }

    /// The group returned by `get_instance_group` once its script is dry.
    pub fn set_group(&self, group: InstanceGroup) {
        self.lock().group = Some(group);
    }

    // ── Scripts (consumed front to back) ──────────────────────────

    pub fn script_insert_template(&self, result: ComputeResult<()>) {
        self.lock().insert_results.push_back(result);
    }

    pub fn script_set_template(&self, result: ComputeResult<()>) {
        self.lock().set_template_results.push_back(result);
    }

    pub fn script_get_group(&self, result: ComputeResult<InstanceGroup>) {
        self.lock().group_results.push_back(result);
    }

    /// Queue one `list_managed_instances` response. Once the queue is dry
    /// the last `Ok` list repeats.
    pub fn script_instances(&self, result: ComputeResult<Vec<ManagedInstance>>) {
        self.lock().instance_lists.push_back(result);
    }

    pub fn script_resize(&self, result: ComputeResult<()>) {
        self.lock().resize_results.push_back(result);
    }

    // ── Assertions ────────────────────────────────────────────────

    pub fn calls(&self) -> Calls {
        self.lock().calls.clone()
    }

    /// Templates passed to `insert_instance_template`, in order.
    pub fn inserted_templates(&self) -> Vec<InstanceTemplate> {
        self.lock().inserted.clone()
    }

    /// Template links passed to `set_instance_template`, in order.
    pub fn set_template_links(&self) -> Vec<String> {
        self.lock().set_template_links.clone()
    }

    /// Instance batches passed to `recreate_instances`, in order.
    pub fn recreated(&self) -> Vec<Vec<String>> {
        self.lock().recreated.clone()
    }

    /// Sizes passed to `resize_group`, in order.
    pub fn resizes(&self) -> Vec<u64> {
        self.lock().resizes.clone()
    }
}

#[async_trait]
impl ComputeClient for MockCompute {
    async fn list_images(&self, _project: &str) -> ComputeResult<Vec<Image>> {
        let mut inner = self.lock();
        inner.calls.list_images += 1;
        Ok(inner.images.clone())
    }

    async fn get_instance_template(
        &self,
        _project: &str,
        name: &str,
    ) -> ComputeResult<InstanceTemplate> {
        let mut inner = self.lock();
        inner.calls.get_template += 1;
        inner
            .templates
            .iter()
            .chain(inner.inserted.iter())
            .find(|t| t.name == name)
            .cloned()
            .ok_or_else(|| ComputeError::NotFound(format!("instance template {name:?}")))
    }

    async fn list_instance_templates(
        &self,
        _project: &str,
    ) -> ComputeResult<Vec<InstanceTemplate>> {
        let mut inner = self.lock();
        inner.calls.list_templates += 1;
        Ok(inner.templates.clone())
    }

    async fn insert_instance_template(
        &self,
        _project: &str,
        template: &InstanceTemplate,
    ) -> ComputeResult<()> {
        let mut inner = self.lock();
        inner.calls.insert_template += 1;
        let result = inner.insert_results.pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            inner.inserted.push(template.clone());
        }
        result
    }

    async fn set_instance_template(
        &self,
        _project: &str,
        _zone: &str,
        _group: &str,
        template_link: &str,
    ) -> ComputeResult<()> {
        let mut inner = self.lock();
        inner.calls.set_template += 1;
        let result = inner.set_template_results.pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            inner.set_template_links.push(template_link.to_string());
        }
        result
    }

    async fn get_instance_group(
        &self,
        _project: &str,
        _zone: &str,
        group: &str,
    ) -> ComputeResult<InstanceGroup> {
        let mut inner = self.lock();
        inner.calls.get_group += 1;
        if let Some(result) = inner.group_results.pop_front() {
            return result;
        }
        inner
            .group
            .clone()
            .ok_or_else(|| ComputeError::NotFound(format!("instance group {group:?}")))
    }

    async fn list_managed_instances(
        &self,
        _project: &str,
        _zone: &str,
        _group: &str,
    ) -> ComputeResult<Vec<ManagedInstance>> {
        let mut inner = self.lock();
        inner.calls.list_instances += 1;
        match inner.instance_lists.pop_front() {
            Some(Ok(list)) => {
                inner.last_instances = list.clone();
                Ok(list)
            }
            Some(Err(err)) => Err(err),
            None => Ok(inner.last_instances.clone()),
        }
    }

    async fn recreate_instances(
        &self,
        _project: &str,
        _zone: &str,
        _group: &str,
        instances: &[String],
    ) -> ComputeResult<()> {
        let mut inner = self.lock();
        inner.calls.recreate += 1;
        inner.recreated.push(instances.to_vec());
        Ok(())
    }

    async fn resize_group(
        &self,
        _project: &str,
        _zone: &str,
        _group: &str,
        size: u64,
    ) -> ComputeResult<()> {
        let mut inner = self.lock();
        inner.calls.resize += 1;
        let result = inner.resize_results.pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            inner.resizes.push(size);
        }
        result
    }
}
