use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("invalid layout version {found} (expected 2)")]
    InvalidLayoutVersion { found: u32 },
    #[error("malformed chunk data at ({cx},{cy},{cz}): {reason}")]
    MalformedChunkData {
        cx: i32,
        cy: i32,
        cz: i32,
        reason: String,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
