use std::fmt::{Debug, Display, Formatter};

/// A unique identifier for a file.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default, serde::Serialize)]
pub struct FileId(pub u32);

impl Display for FileId {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        fmt.write_str("FileId(")?;
        fmt.write_str(self.0.to_string().as_str())?;
        fmt.write_str(")")
    }
}

/// Represents a single compressed source location (file_id + offset).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, serde::Serialize)]
pub struct SourceLocation(u32);

impl SourceLocation {
    const OFFSET_BITS: u32 = 22; // 4 MB max per file
    const OFFSET_MASK: u32 = (1 << Self::OFFSET_BITS) - 1;

    #[inline(always)]
    pub fn new(file_id: FileId, offset: u32) -> Self {
        assert!(
            file_id.0 < (1 << (32 - Self::OFFSET_BITS)),
            "file_id overflow"
        );
        assert!(offset < (1 << Self::OFFSET_BITS), "offset overflow");
        let value = (file_id.0 << Self::OFFSET_BITS) | (offset & Self::OFFSET_MASK);
        Self(value)
    }

    #[inline(always)]
    pub fn file_id(&self) -> FileId {
        FileId(self.0 >> Self::OFFSET_BITS)
    }

    #[inline(always)]
    pub fn offset(&self) -> u32 {
        self.0 & Self::OFFSET_MASK
    }
}

/// Represents a span in a source file.
///
/// The external parser stamps every node it produces with one of these;
/// errors reported against a node reuse the node's span unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        assert_eq!(
            start.file_id(),
            end.file_id(),
            "Span across files not allowed"
        );
        Self { start, end }
    }

    /// A placeholder span for synthetic nodes.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn file_id(&self) -> FileId {
        self.start.file_id()
    }

    pub fn start_offset(&self) -> u32 {
        self.start.offset()
    }

    pub fn end_offset(&self) -> u32 {
        self.end.offset()
    }
}

impl Debug for SourceSpan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SourceSpan(fileid={}, offset={}..{})",
            self.start.file_id().0,
            self.start.offset(),
            self.end.offset()
        )
    }
}
