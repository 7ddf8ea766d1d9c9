use crate::error::Result;

/// Generates opaque, globally unique identifiers.
pub trait IdService: Send + Sync {
    fn new_id(&self) -> Result<String>;
}

/// UUID v4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdService;

impl IdService for UuidIdService {
    fn new_id(&self) -> Result<String> {
        Ok(uuid::Uuid::new_v4().simple().to_string())
    }
}
