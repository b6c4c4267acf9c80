use crate::TypeKey;
use std::fmt;
use thiserror::Error;

/// Errors that can occur when looking values up in a [`Container`](crate::Container)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContainerError {
    /// Nothing usable is stored under the requested key
    #[error("item not found of type [{key}]: {reason}")]
    NotFound {
        key: TypeKey,
        reason: NotFoundReason,
    },
}

impl ContainerError {
    pub(crate) fn not_found(key: TypeKey, reason: NotFoundReason) -> Self {
        ContainerError::NotFound { key, reason }
    }

    /// The key the failed lookup was made under
    pub fn key(&self) -> TypeKey {
        match self {
            ContainerError::NotFound { key, .. } => *key,
        }
    }

    /// Why the lookup failed
    pub fn reason(&self) -> NotFoundReason {
        match self {
            ContainerError::NotFound { reason, .. } => *reason,
        }
    }
}

/// Distinguishes an empty slot from a slot holding some other type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// No entry exists under the key
    Missing,
    /// An entry exists but was stored as a different type
    TypeMismatch {
        stored: &'static str,
        requested: &'static str,
    },
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NotFoundReason::Missing => write!(f, "no entry registered"),
            NotFoundReason::TypeMismatch { stored, requested } => {
                write!(f, "entry holds {}, requested {}", stored, requested)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_key;
    use pretty_assertions::assert_eq;

    struct Config;

    #[test]
    fn test_error_display() {
        let missing = ContainerError::not_found(type_key::<Config>(), NotFoundReason::Missing);
        assert_eq!(
            missing.to_string(),
            format!(
                "item not found of type [{}]: no entry registered",
                type_key::<Config>()
            )
        );

        let mismatch = ContainerError::not_found(
            type_key::<u8>(),
            NotFoundReason::TypeMismatch {
                stored: "alloc::sync::Arc<u8>",
                requested: "u8",
            },
        );
        assert_eq!(
            mismatch.to_string(),
            "item not found of type [u8]: entry holds alloc::sync::Arc<u8>, requested u8"
        );
        assert_eq!(mismatch.key(), type_key::<u8>());
    }
}
