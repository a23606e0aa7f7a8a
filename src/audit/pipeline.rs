//! Ordered stage pipeline.
//!
//! Each stage receives the shared context mutably and decides whether the
//! driver continues. Stages run strictly in insertion order.

use crate::error::Result;

/// Whether the pipeline proceeds after a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

pub trait Stage<C> {
    fn name(&self) -> &'static str;

    /// Run the stage against the shared context.
    ///
    /// # Errors
    /// An error aborts the pipeline; later stages do not run.
    fn run(&mut self, ctx: &mut C) -> Result<Flow>;
}

pub struct Pipeline<C> {
    stages: Vec<Box<dyn Stage<C>>>,
}

impl<C> Default for Pipeline<C> {
    fn default() -> Self {
        Self { stages: Vec::new() }
    }
}

impl<C> Pipeline<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stage(mut self, stage: impl Stage<C> + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Run stages in order until one stops the pipeline.
    ///
    /// Returns the name of the stopping stage, or `None` if all stages ran.
    ///
    /// # Errors
    /// Returns the first stage error.
    pub fn run(&mut self, ctx: &mut C) -> Result<Option<&'static str>> {
        for stage in &mut self.stages {
            tracing::debug!(stage = stage.name(), "running stage");
            if stage.run(ctx)? == Flow::Stop {
                return Ok(Some(stage.name()));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
