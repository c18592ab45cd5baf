// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the burst generator

use scgen_kernel::KernelError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeneratorError {
    /// A parameter or status key was rejected; live state is untouched
    #[error("Invalid parameter '{key}': {reason}")]
    InvalidParameter { key: String, reason: String },

    #[error(transparent)]
    Kernel(#[from] KernelError),
}

impl GeneratorError {
    pub(crate) fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        GeneratorError::InvalidParameter {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Configuration error, whether raised by the generator or its window
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(
            self,
            GeneratorError::InvalidParameter { .. }
                | GeneratorError::Kernel(KernelError::InvalidParameter(_))
        )
    }

    /// Connection refused because of the receptor requested
    pub fn is_unsupported_receptor(&self) -> bool {
        matches!(
            self,
            GeneratorError::Kernel(KernelError::UnsupportedReceptor { .. })
        )
    }
}

pub type Result<T> = core::result::Result<T, GeneratorError>;
