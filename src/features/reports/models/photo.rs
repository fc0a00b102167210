use std::borrow::Cow;

use serde::Serialize;
use validator::ValidationError;

/// Largest photo a report may embed, in bytes
pub const MAX_PHOTO_SIZE: usize = 1_000_000;

/// Image embedded in a report row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Photo {
    pub data: Vec<u8>,
    pub content_type: String,
}

impl Photo {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

pub fn validate_photo(photo: &Photo) -> Result<(), ValidationError> {
    if photo.len() > MAX_PHOTO_SIZE {
        let mut err = ValidationError::new("photo_size");
        err.message = Some(Cow::Borrowed("Image should be less than 1mb in size"));
        return Err(err);
    }
    Ok(())
}
