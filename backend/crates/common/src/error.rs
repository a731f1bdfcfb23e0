use thiserror::Error;

#[derive(Debug, Error)]
pub enum KpiboardError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type KpiboardResult<T> = Result<T, KpiboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_variant() {
        let err = KpiboardError::Validation("duplicate tolerance for metric 3".to_string());
        assert_eq!(
            err.to_string(),
            "validation error: duplicate tolerance for metric 3"
        );
    }

    #[test]
    fn result_alias_propagates() {
        fn inner() -> KpiboardResult<u32> {
            Err(KpiboardError::Dataset("missing file".to_string()))
        }
        fn outer() -> KpiboardResult<u32> {
            let v = inner()?;
            Ok(v + 1)
        }
        assert!(matches!(outer(), Err(KpiboardError::Dataset(_))));
    }
}
