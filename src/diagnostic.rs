use crate::source::SourceSpan;

/// Flattening errors
#[derive(Debug, thiserror::Error)]
pub enum FlattenError {
    #[error("Cannot flatten {kind} node")]
    UnsupportedNode {
        kind: &'static str,
        location: SourceSpan,
    },

    #[error("Malformed node: {message}")]
    MalformedNode {
        message: String,
        location: SourceSpan,
    },
}

impl FlattenError {
    pub fn location(&self) -> SourceSpan {
        match self {
            FlattenError::UnsupportedNode { location, .. } => *location,
            FlattenError::MalformedNode { location, .. } => *location,
        }
    }
}
