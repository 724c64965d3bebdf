use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("duplicate module key in registry: {0}")]
    DuplicateModuleKey(String),
    #[error("duplicate feature flag in registry: {0}")]
    DuplicateFeatureFlag(String),
    #[error("empty registry field for module {0}")]
    EmptyDescriptorField(String),
}

pub type AccessResult<T> = Result<T, AccessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_variants() {
        let errors = vec![
            AccessError::UnknownRole("superuser".to_string()),
            AccessError::DuplicateModuleKey("dna_sequencing".to_string()),
            AccessError::DuplicateFeatureFlag("dna_sequencing_module".to_string()),
            AccessError::EmptyDescriptorField("dna_sequencing".to_string()),
        ];

        for error in errors {
            let rendered = error.to_string();
            assert!(!rendered.is_empty());
        }
    }
}
