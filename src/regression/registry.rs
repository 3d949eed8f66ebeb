//! Descriptor Registry
//!
//! Identity-keyed table of descriptor factories. Loading instantiates every
//! registration; any failure is fatal and no partial descriptor list is returned.

use crate::regression::catalog;
use crate::regression::descriptor::AlgorithmDescriptor;
use crate::regression::error::{DescriptorError, HarnessError};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Zero-argument construction path of a descriptor.
pub type DescriptorFactory = fn() -> Result<AlgorithmDescriptor, DescriptorError>;

#[derive(Debug, Clone)]
pub struct DescriptorRegistration {
    pub identity: String,
    pub factory: DescriptorFactory,
}

#[derive(Debug, Clone, Default)]
pub struct DescriptorRegistry {
    registrations: Vec<DescriptorRegistration>,
}

impl DescriptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in catalog.
    pub fn builtin() -> Self {
        catalog::BUILTIN
            .iter()
            .fold(Self::new(), |registry, (identity, factory)| registry.with(*identity, *factory))
    }

    pub fn register(&mut self, identity: impl Into<String>, factory: DescriptorFactory) {
        self.registrations.push(DescriptorRegistration {
            identity: identity.into(),
            factory,
        });
    }

    pub fn with(mut self, identity: impl Into<String>, factory: DescriptorFactory) -> Self {
        self.register(identity, factory);
        self
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Instantiate every registered descriptor.
    pub fn load(&self) -> Result<Vec<AlgorithmDescriptor>, HarnessError> {
        let mut seen = BTreeSet::new();
        let mut descriptors = Vec::with_capacity(self.registrations.len());

        for registration in &self.registrations {
            if !seen.insert(registration.identity.as_str()) {
                return Err(HarnessError::DuplicateIdentity(registration.identity.clone()));
            }

            let descriptor = (registration.factory)().map_err(|source| {
                HarnessError::DescriptorInstantiation {
                    identity: registration.identity.clone(),
                    source,
                }
            })?;

            if descriptor.identity() != registration.identity {
                return Err(HarnessError::IdentityMismatch {
                    registered: registration.identity.clone(),
                    declared: descriptor.identity().to_string(),
                });
            }
            descriptor.validate()?;
            descriptors.push(descriptor);
        }

        Ok(descriptors)
    }

    /// Instantiate every descriptor and keep those that can run in this environment.
    pub fn load_runnable(&self) -> Result<Vec<AlgorithmDescriptor>, HarnessError> {
        let all = self.load()?;
        let total = all.len();
        let runnable: Vec<AlgorithmDescriptor> = all
            .into_iter()
            .filter(|descriptor| {
                if !descriptor.runs_locally() {
                    debug!(algorithm = %descriptor.identity(), "Excluded: cannot run locally");
                }
                descriptor.runs_locally()
            })
            .collect();

        info!(total, runnable = runnable.len(), "Descriptor registry loaded");
        Ok(runnable)
    }
}
