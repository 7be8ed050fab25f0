//! Google Drive API v3 client.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use crate::google::client::api_url;
use crate::google::{ApiError, ByteStream, CommentPage, DriveApi, FileRef, GoogleHttp};

const FILE_FIELDS: &str = "id,name,mimeType,webViewLink";
const COMMENT_FIELDS: &str = "nextPageToken,comments(id,author(displayName,emailAddress),content,\
quotedFileContent(value),resolved,deleted,createdTime,modifiedTime,\
replies(id,author(displayName,emailAddress),content,createdTime,deleted))";

pub struct GoogleDriveClient {
    http: GoogleHttp,
    base_url: String,
    upload_base_url: String,
}

#[derive(Deserialize)]
struct Parents {
    #[serde(default)]
    parents: Vec<String>,
}

impl GoogleDriveClient {
    pub fn new(http: GoogleHttp, base_url: &str, upload_base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            upload_base_url: upload_base_url.to_string(),
        }
    }

    fn file_url(&self, file_id: &str, suffix: &str) -> String {
        api_url(
            &self.base_url,
            &format!("files/{}{}", urlencoding::encode(file_id), suffix),
        )
    }
}

/// Body for a Drive `uploadType=multipart` upload: JSON metadata part
/// followed by the media part.
pub(crate) fn multipart_related(
    boundary: &str,
    metadata: &serde_json::Value,
    mime_type: &str,
    bytes: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 512);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!("--{boundary}\r\nContent-Type: {mime_type}\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[async_trait]
impl DriveApi for GoogleDriveClient {
    async fn upload_file(
        &self,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<FileRef, ApiError> {
        let url = api_url(&self.upload_base_url, "files");
        let boundary = format!("slidesmith_{}", uuid::Uuid::new_v4().simple());
        let metadata = json!({ "name": name, "mimeType": mime_type });
        let body = multipart_related(&boundary, &metadata, mime_type, &bytes);

        tracing::debug!(
            "Google Drive API: POST {} ({} bytes, {})",
            url,
            bytes.len(),
            mime_type
        );
        let request = self
            .http
            .request(Method::POST, &url)
            .query(&[("uploadType", "multipart"), ("fields", FILE_FIELDS)])
            .header(
                "Content-Type",
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body);
        self.http.send_json("Google Drive", request).await
    }

    async fn make_public(&self, file_id: &str) -> Result<(), ApiError> {
        let url = self.file_url(file_id, "/permissions");
        tracing::debug!("Google Drive API: POST {}", url);
        let request = self
            .http
            .request(Method::POST, &url)
            .json(&json!({ "role": "reader", "type": "anyone" }));
        self.http.send_empty("Google Drive", request).await
    }

    async fn copy_file(
        &self,
        source_id: &str,
        name: &str,
        parent_folder_id: Option<&str>,
    ) -> Result<FileRef, ApiError> {
        let url = self.file_url(source_id, "/copy");
        let mut body = json!({ "name": name });
        if let Some(parent) = parent_folder_id {
            body["parents"] = json!([parent]);
        }
        tracing::debug!("Google Drive API: POST {}", url);
        let request = self
            .http
            .request(Method::POST, &url)
            .query(&[("fields", FILE_FIELDS), ("supportsAllDrives", "true")])
            .json(&body);
        self.http.send_json("Google Drive", request).await
    }

    async fn move_file(&self, file_id: &str, folder_id: &str) -> Result<(), ApiError> {
        let url = self.file_url(file_id, "");
        tracing::debug!("Google Drive API: GET {} (parents)", url);
        let current: Parents = self
            .http
            .send_json(
                "Google Drive",
                self.http
                    .request(Method::GET, &url)
                    .query(&[("fields", "parents"), ("supportsAllDrives", "true")]),
            )
            .await?;

        let remove = current.parents.join(",");
        tracing::debug!("Google Drive API: PATCH {} -> {}", url, folder_id);
        let request = self.http.request(Method::PATCH, &url).query(&[
            ("addParents", folder_id),
            ("removeParents", remove.as_str()),
            ("fields", "id,parents"),
            ("supportsAllDrives", "true"),
        ]);
        self.http
            .send_empty("Google Drive", request.json(&json!({})))
            .await
    }

    async fn export_file(&self, file_id: &str, mime_type: &str) -> Result<ByteStream, ApiError> {
        let url = self.file_url(file_id, "/export");
        tracing::debug!("Google Drive API: GET {} as {}", url, mime_type);
        let response = self
            .http
            .send(
                "Google Drive",
                self.http
                    .request(Method::GET, &url)
                    .query(&[("mimeType", mime_type)]),
            )
            .await?;

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| ApiError::transport(format!("export stream: {}", e))));
        Ok(Box::pin(stream))
    }

    async fn list_comments(
        &self,
        file_id: &str,
        include_deleted: bool,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<CommentPage, ApiError> {
        let url = self.file_url(file_id, "/comments");
        tracing::debug!("Google Drive API: GET {}", url);
        let mut query = vec![
            ("includeDeleted", include_deleted.to_string()),
            ("pageSize", page_size.to_string()),
            ("fields", COMMENT_FIELDS.to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }
        self.http
            .send_json(
                "Google Drive",
                self.http.request(Method::GET, &url).query(&query),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipart_body_layout() {
        let body = multipart_related(
            "b0undary",
            &json!({"name": "a.png", "mimeType": "image/png"}),
            "image/png",
            b"\x89PNG",
        );
        let mut expected = Vec::new();
        expected.extend_from_slice(
            b"--b0undary\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n\
{\"mimeType\":\"image/png\",\"name\":\"a.png\"}\r\n\
--b0undary\r\nContent-Type: image/png\r\n\r\n",
        );
        expected.extend_from_slice(b"\x89PNG");
        expected.extend_from_slice(b"\r\n--b0undary--\r\n");
        assert_eq!(body, expected);
    }
}
