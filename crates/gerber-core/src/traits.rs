//! Core kernel traits.
//!
//! This module defines the traits that kernels implement:
//! - `Kernel`: Base trait exposing metadata and configuration validation
//! - `BatchKernel`: On-demand execution with typed input and output

use crate::error::{GerberError, Result};
use crate::kernel::KernelMetadata;
use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

/// Base trait for all kernels.
pub trait Kernel: Send + Sync + Debug {
    /// Returns the kernel metadata.
    fn metadata(&self) -> &KernelMetadata;

    /// Validate kernel configuration.
    ///
    /// Called before execution to ensure configuration is valid.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Returns the kernel ID.
    fn id(&self) -> &str {
        &self.metadata().id
    }
}

/// Trait for batch kernels.
///
/// Batch kernels are invoked on demand with a fully materialized input and
/// return a fully materialized output; no state survives between calls.
///
/// # Type Parameters
///
/// - `I`: Input type
/// - `O`: Output type
#[async_trait]
pub trait BatchKernel<I, O>: Kernel
where
    I: Send + Sync,
    O: Send + Sync,
{
    /// Execute the kernel with the given input.
    async fn execute(&self, input: I) -> Result<O>;

    /// Validate the input before execution.
    ///
    /// Override to provide custom input validation.
    fn validate_input(&self, _input: &I) -> Result<()> {
        Ok(())
    }

    /// Execute the kernel with a timeout.
    ///
    /// # Returns
    ///
    /// The kernel output or `GerberError::Timeout`.
    async fn execute_with_timeout(&self, input: I, timeout: Duration) -> Result<O>
    where
        I: 'async_trait,
    {
        match tokio::time::timeout(timeout, self.execute(input)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(GerberError::Timeout(timeout)),
        }
    }
}
