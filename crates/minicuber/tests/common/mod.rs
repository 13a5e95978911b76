//! Mock providers shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use cube_common::{
    DataVariable, InterpolationPolicy, ProductCube, ProviderKind, TimeInterval,
    VariableDescriptor, VariableLayout,
};
use minicuber::{
    LoadRequest, Provider, ProviderError, ProviderRegistry, ProviderSpec, Specification,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use test_utils::{daily_timestamps, geographic_axes, utm_axes};

/// A configurable synthetic provider.
///
/// Clones share their call counter, so a registry constructor can hand out
/// fresh instances while the test keeps observing calls.
#[derive(Clone)]
pub struct MockProvider {
    name: String,
    prefix: String,
    kind: ProviderKind,
    bands: Vec<(String, InterpolationPolicy)>,
    value: f32,
    steps_per_chunk: usize,
    projected: bool,
    fail_on: Vec<usize>,
    flat_on: Vec<usize>,
    none_always: bool,
    transient_failures: Arc<AtomicUsize>,
    cancel_on_call: Option<Arc<AtomicBool>>,
    pub calls: Arc<AtomicUsize>,
    pub requests: Arc<std::sync::Mutex<Vec<LoadRequest>>>,
}

impl MockProvider {
    fn new(name: &str, kind: ProviderKind) -> Self {
        Self {
            name: name.to_string(),
            prefix: name.to_string(),
            kind,
            bands: vec![("band".to_string(), InterpolationPolicy::Nearest)],
            value: 1.0,
            steps_per_chunk: 2,
            projected: false,
            fail_on: Vec::new(),
            flat_on: Vec::new(),
            none_always: false,
            transient_failures: Arc::new(AtomicUsize::new(0)),
            cancel_on_call: None,
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    /// Time-varying provider returning `steps_per_chunk` steps, 5 days apart.
    pub fn temporal(name: &str) -> Self {
        Self::new(name, ProviderKind::Temporal)
    }

    pub fn static_layer(name: &str) -> Self {
        Self::new(name, ProviderKind::Static)
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn with_bands(mut self, bands: &[(&str, InterpolationPolicy)]) -> Self {
        self.bands = bands.iter().map(|(n, p)| (n.to_string(), *p)).collect();
        self
    }

    pub fn with_value(mut self, value: f32) -> Self {
        self.value = value;
        self
    }

    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps_per_chunk = steps;
        self
    }

    /// Return output on UTM axes instead of lon/lat.
    pub fn projected(mut self) -> Self {
        self.projected = true;
        self
    }

    /// Fail terminally on the given 1-based call numbers.
    pub fn failing_on(mut self, calls: &[usize]) -> Self {
        self.fail_on = calls.to_vec();
        self
    }

    /// Return bands without a time axis on the given 1-based call numbers.
    pub fn flat_on(mut self, calls: &[usize]) -> Self {
        self.flat_on = calls.to_vec();
        self
    }

    pub fn without_data(mut self) -> Self {
        self.none_always = true;
        self
    }

    /// Fail transiently on the first `n` calls.
    pub fn transient_then_ok(self, n: usize) -> Self {
        self.transient_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Set `flag` whenever this provider is called.
    pub fn cancelling(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_on_call = Some(flag);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn product(&self, request: &LoadRequest, flat: bool) -> ProductCube {
        let axes = if self.projected {
            utm_axes(&request.bbox, 30.0)
        } else {
            geographic_axes(&request.bbox, 24, 24)
        };
        let plane = axes.nx() * axes.ny();

        match (self.kind, request.window) {
            (ProviderKind::Temporal, Some(window)) if !flat => {
                let time: Vec<_> = daily_timestamps(window.start, self.steps_per_chunk, 5)
                    .into_iter()
                    .filter(|t| window.contains(t))
                    .collect();
                let nt = time.len();
                let mut cube = ProductCube::new(axes).with_time(time);
                for (band, policy) in &self.bands {
                    cube.variables.push(DataVariable::new(
                        VariableDescriptor::new(band.clone(), *policy),
                        VariableLayout::TimeGrid,
                        vec![self.value; nt * plane],
                    ));
                }
                cube
            }
            _ => {
                let mut cube = ProductCube::new(axes);
                for (band, policy) in &self.bands {
                    cube.variables.push(DataVariable::new(
                        VariableDescriptor::new(band.clone(), *policy),
                        VariableLayout::Grid,
                        vec![self.value; plane],
                    ));
                }
                cube
            }
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn load_data(
        &self,
        request: &LoadRequest,
    ) -> Result<Option<ProductCube>, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if let Some(flag) = &self.cancel_on_call {
            flag.store(true, Ordering::SeqCst);
        }

        let pending = self.transient_failures.load(Ordering::SeqCst);
        if pending > 0 {
            self.transient_failures.store(pending - 1, Ordering::SeqCst);
            return Err(ProviderError::Transient("429 Too Many Requests".into()));
        }
        if self.fail_on.contains(&call) {
            return Err(ProviderError::Failed(format!("call {} failed", call)));
        }
        if self.none_always {
            return Ok(None);
        }
        Ok(Some(self.product(request, self.flat_on.contains(&call))))
    }
}

/// A registry whose constructors hand out clones of `mocks`.
pub fn registry_with(mocks: &[MockProvider]) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    for mock in mocks {
        let mock = mock.clone();
        registry.register(mock.name.clone(), move |_kwargs| {
            Ok(Box::new(mock.clone()) as Box<dyn Provider>)
        });
    }
    registry
}

/// A 4x4, 100 m specification at the Po valley location.
pub fn spec(interval: &str, providers: &[&str]) -> Specification {
    Specification {
        lon_lat: (10.0, 45.0),
        xy_shape: (4, 4),
        resolution: 100.0,
        time_interval: TimeInterval::parse(interval).unwrap(),
        providers: providers
            .iter()
            .map(|name| ProviderSpec::new(*name))
            .collect(),
    }
}
