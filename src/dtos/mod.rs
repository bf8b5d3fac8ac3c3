use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;
use crate::models::{NewRecord, Record};

/// Body of `POST /upload`.
#[derive(Debug, Deserialize, Serialize)]
pub struct UploadDto {
    pub image: String,
    pub name: String,
    pub timestamp: String,
}

impl UploadDto {
    /// Decodes the image field. A leading `data:<mime>;base64,` header is
    /// skipped; anything else must be plain base64.
    pub fn into_new_record(self) -> Result<NewRecord, StoreError> {
        let image = STANDARD.decode(strip_data_url(&self.image))?;
        Ok(NewRecord {
            image,
            name: self.name,
            timestamp: self.timestamp,
        })
    }
}

fn strip_data_url(image: &str) -> &str {
    image
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .filter(|(mime, _)| !mime.contains(','))
        .map_or(image, |(_, encoded)| encoded)
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MessageDto {
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorDto {
    pub message: String,
    pub error: String,
}

/// Body of `GET /get_data`: one `[image, name, timestamp]` triple per record.
#[derive(Debug, Deserialize, Serialize)]
pub struct DataDto {
    pub data: Vec<(String, String, String)>,
}

impl From<Vec<Record>> for DataDto {
    fn from(records: Vec<Record>) -> Self {
        DataDto {
            data: records
                .into_iter()
                .map(|r| (STANDARD.encode(&r.image), r.name, r.timestamp))
                .collect(),
        }
    }
}
