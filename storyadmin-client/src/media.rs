use std::path::Path;

use rand::{distributions::Alphanumeric, Rng as _};

use crate::{
    error::ApiError,
    pipeline::Pipeline,
    resource::id_text,
    transport::ApiRequest,
};

/// Entity type the backend files story covers under
pub const STORY_COVER: &str = "stories_cover";

#[derive(Clone, Debug, PartialEq)]
pub struct FilePart {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub async fn read(path: &Path) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| ApiError::Validation(format!("{}: {}", path.display(), err)))?;

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();

        Ok(Self {
            content_type: guess_content_type(&file_name).to_string(),
            file_name,
            bytes,
        })
    }
}

fn guess_content_type(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// A `multipart/form-data` body with a single file field.
#[derive(Clone, Debug, PartialEq)]
pub struct Multipart {
    boundary: String,
    field: String,
    file: FilePart,
}

impl Multipart {
    pub fn new(field: &str, file: FilePart) -> Self {
        let boundary: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(24)
            .map(char::from)
            .collect();

        Self {
            boundary: format!("storyadmin-{}", boundary),
            field: field.to_string(),
            file,
        }
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn file(&self) -> &FilePart {
        &self.file
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let file_name = self.file.file_name.replace('"', "");

        let mut body = Vec::with_capacity(self.file.bytes.len() + 256);
        body.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                self.field, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", self.file.content_type).as_bytes());
        body.extend_from_slice(&self.file.bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", self.boundary).as_bytes());

        body
    }
}

/// A stored file, as returned by the upload endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Media {
    pub file_id: String,
    pub path: String,
}

#[derive(serde::Deserialize)]
struct UploadData {
    file_id: serde_json::Value,
    #[serde(default)]
    path: Option<String>,
}

#[derive(serde::Serialize)]
struct UploadQuery<'q> {
    entity_type: &'q str,
}

#[derive(Clone, Debug)]
pub struct MediaClient {
    pipeline: Pipeline,
}

impl MediaClient {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    #[tracing::instrument(skip(self, file), fields(file = %file.file_name, bytes = file.bytes.len()), err)]
    pub async fn upload(&self, file: FilePart, entity_type: &str) -> Result<Media, ApiError> {
        let query = serde_urlencoded::to_string(UploadQuery { entity_type })
            .map_err(|err| ApiError::Validation(err.to_string()))?;

        let request = ApiRequest::post(format!("/beapi/file_media/upload?{}", query))
            .multipart(Multipart::new("file", file));

        let data: UploadData = self.pipeline.data(request).await?;

        let file_id = id_text(&data.file_id)
            .ok_or_else(|| ApiError::Decode("upload answer carries no file_id".into()))?;

        tracing::info!(file_id = %file_id, "uploaded");

        Ok(Media {
            file_id,
            path: data.path.unwrap_or_default(),
        })
    }
}
