use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Memory mapping error: {0}")]
    MemoryMappingError(String),
    #[error("Invalid MAT-file header: {0}")]
    InvalidHeader(String),
    #[error("Unsupported MAT-file version: {0:#06x}")]
    UnsupportedVersion(u16),
    #[error("Unsupported data element type: {0}")]
    UnsupportedDataType(u32),
    #[error("Unsupported array class: {0}")]
    UnsupportedClass(u8),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Truncated data: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },
    #[error("Decompression error: {0}")]
    Decompression(String),
}
