//! In-memory collaborators and fixtures for tests.
//!
//! Provides:
//! - [`fixture_presentation`]: a small deck exercising every element kind
//! - [`StubSlides`], [`StubDrive`], [`StubTranslate`]: recording stand-ins
//!   for the Google APIs, each able to fail with a chosen [`ApiError`]
//! - [`stub_services`]: all three wired into a [`GoogleServices`]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::json;

use crate::google::{
    ApiError, BatchReply, ByteStream, CommentPage, DriveApi, FileRef, GoogleServices, SlidesApi,
    TranslateApi,
};
use crate::slides::model::Presentation;
use crate::slides::requests::Request;

/// A valid 1x1 transparent PNG.
pub const PNG_1X1_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// ID of [`fixture_presentation`].
pub const FIXTURE_ID: &str = "pres-1";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn not_found() -> ApiError {
    ApiError::new(Some(404), "Requested entity was not found.").with_reason("notFound")
}

/// Two slides, one master, one layout.
///
/// - `slide-1`: `title-1` (text), `image-1` (scaled 0.5), notes page
///   `notes-1` holding `notes-body-1`
/// - `slide-2`: `video-1`, `group-1` containing `group-inner-shape` and
///   `nested-group` (which holds `deep-shape`), `table-1` (2x2)
/// - `master-1` holding `master-title`; `layout-1` empty
///
/// The word "findme" appears once in the notes, once in `deep-shape`, and
/// once in table cell `[0,1]`.
pub fn fixture_presentation() -> Presentation {
    let emu = |magnitude: f64| json!({"magnitude": magnitude, "unit": "EMU"});
    let text = |content: &str| {
        json!({"textElements": [
            {"endIndex": content.chars().count(), "paragraphMarker": {}},
            {"endIndex": content.chars().count(), "textRun": {"content": content}}
        ]})
    };

    serde_json::from_value(json!({
        "presentationId": FIXTURE_ID,
        "title": "Quarterly Review",
        "revisionId": "rev-1",
        "pageSize": {"width": emu(9_144_000.0), "height": emu(5_143_500.0)},
        "slides": [
            {
                "objectId": "slide-1",
                "pageType": "SLIDE",
                "pageElements": [
                    {
                        "objectId": "title-1",
                        "size": {"width": emu(8_000_000.0), "height": emu(1_000_000.0)},
                        "transform": {"scaleX": 1.0, "scaleY": 1.0, "translateX": 311_700.0,
                                      "translateY": 744_575.0, "unit": "EMU"},
                        "shape": {
                            "shapeType": "TEXT_BOX",
                            "placeholder": {"type": "TITLE"},
                            "text": text("Quarterly Review\n")
                        }
                    },
                    {
                        "objectId": "image-1",
                        "size": {"width": emu(3_000_000.0), "height": emu(2_000_000.0)},
                        "transform": {"scaleX": 0.5, "scaleY": 0.5, "translateX": 1_000_000.0,
                                      "translateY": 500_000.0, "unit": "EMU"},
                        "image": {"contentUrl": "https://lh3.example/image-1",
                                  "imageProperties": {"brightness": 0.1}}
                    }
                ],
                "slideProperties": {
                    "layoutObjectId": "layout-1",
                    "masterObjectId": "master-1",
                    "notesPage": {
                        "objectId": "notes-1",
                        "pageType": "NOTES",
                        "pageElements": [
                            {
                                "objectId": "notes-body-1",
                                "shape": {
                                    "shapeType": "TEXT_BOX",
                                    "placeholder": {"type": "BODY"},
                                    "text": text("Remember to findme the budget\n")
                                }
                            }
                        ]
                    }
                }
            },
            {
                "objectId": "slide-2",
                "pageType": "SLIDE",
                "pageElements": [
                    {
                        "objectId": "video-1",
                        "size": {"width": emu(4_000_000.0), "height": emu(2_250_000.0)},
                        "transform": {"scaleX": 1.0, "scaleY": 1.0, "unit": "EMU"},
                        "video": {"id": "dQw4w9WgXcQ", "source": "YOUTUBE",
                                  "videoProperties": {"autoPlay": false}}
                    },
                    {
                        "objectId": "group-1",
                        "elementGroup": {"children": [
                            {
                                "objectId": "group-inner-shape",
                                "shape": {"shapeType": "RECTANGLE", "text": text("Inner text\n")}
                            },
                            {
                                "objectId": "nested-group",
                                "elementGroup": {"children": [
                                    {
                                        "objectId": "deep-shape",
                                        "shape": {"shapeType": "TEXT_BOX",
                                                  "text": text("Deep findme text\n")}
                                    }
                                ]}
                            }
                        ]}
                    },
                    {
                        "objectId": "table-1",
                        "table": {
                            "rows": 2,
                            "columns": 2,
                            "tableRows": [
                                {"tableCells": [
                                    {"text": text("Name\n")},
                                    {"text": text("findme cell\n")}
                                ]},
                                {"tableCells": [
                                    {"text": text("Alice\n")},
                                    {}
                                ]}
                            ]
                        }
                    }
                ],
                "slideProperties": {"layoutObjectId": "layout-1", "masterObjectId": "master-1"}
            }
        ],
        "masters": [
            {
                "objectId": "master-1",
                "pageType": "MASTER",
                "pageElements": [
                    {"objectId": "master-title", "shape": {"text": text("Master\n")}}
                ]
            }
        ],
        "layouts": [
            {"objectId": "layout-1", "pageType": "LAYOUT", "pageElements": []}
        ]
    }))
    .expect("fixture presentation must deserialize")
}

/// A tiny PDF-like body with one page tree and `pages` page objects.
pub fn fake_pdf(pages: usize) -> Vec<u8> {
    let mut pdf = String::from("%PDF-1.4\n1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    pdf.push_str(&format!("2 0 obj << /Type /Pages /Count {} >> endobj\n", pages));
    for i in 0..pages {
        pdf.push_str(&format!("{} 0 obj << /Type /Page /Parent 2 0 R >> endobj\n", i + 3));
    }
    pdf.push_str("%%EOF\n");
    pdf.into_bytes()
}

/// In-memory Slides API.
#[derive(Default)]
pub struct StubSlides {
    presentation: Mutex<Option<Presentation>>,
    batches: Mutex<Vec<(String, Vec<Request>)>>,
    created_titles: Mutex<Vec<String>>,
    calls: AtomicUsize,
    fail_get: Mutex<Option<ApiError>>,
    fail_batch: Mutex<Option<ApiError>>,
    fail_create: Mutex<Option<ApiError>>,
}

impl StubSlides {
    /// Serve one presentation under its own ID.
    pub fn new(presentation: Presentation) -> Self {
        Self {
            presentation: Mutex::new(Some(presentation)),
            ..Default::default()
        }
    }

    pub fn fail_get_with(&self, err: ApiError) {
        *lock(&self.fail_get) = Some(err);
    }

    pub fn fail_batch_with(&self, err: ApiError) {
        *lock(&self.fail_batch) = Some(err);
    }

    pub fn fail_create_with(&self, err: ApiError) {
        *lock(&self.fail_create) = Some(err);
    }

    /// Every submitted batch, in order.
    pub fn batches(&self) -> Vec<(String, Vec<Request>)> {
        lock(&self.batches).clone()
    }

    /// Requests of the most recent batch.
    pub fn last_batch(&self) -> Option<Vec<Request>> {
        lock(&self.batches).last().map(|(_, requests)| requests.clone())
    }

    pub fn created_titles(&self) -> Vec<String> {
        lock(&self.created_titles).clone()
    }

    /// Number of remote calls of any kind.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SlidesApi for StubSlides {
    async fn get_presentation(&self, presentation_id: &str) -> Result<Presentation, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.fail_get).clone() {
            return Err(err);
        }
        lock(&self.presentation)
            .as_ref()
            .filter(|p| p.presentation_id == presentation_id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn batch_update(
        &self,
        presentation_id: &str,
        requests: Vec<Request>,
    ) -> Result<BatchReply, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.fail_batch).clone() {
            return Err(err);
        }
        let replies = requests
            .iter()
            .map(|request| match request {
                Request::CreateImage(create) => {
                    json!({"createImage": {"objectId": create.object_id}})
                }
                _ => json!({}),
            })
            .collect();
        lock(&self.batches).push((presentation_id.to_string(), requests));
        Ok(BatchReply {
            presentation_id: presentation_id.to_string(),
            replies,
        })
    }

    async fn create_presentation(&self, title: &str) -> Result<Presentation, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.fail_create).clone() {
            return Err(err);
        }
        lock(&self.created_titles).push(title.to_string());
        Ok(serde_json::from_value(json!({
            "presentationId": "new-pres-1",
            "title": title,
            "slides": [{"objectId": "p", "pageType": "SLIDE"}]
        }))
        .expect("created presentation must deserialize"))
    }
}

/// In-memory Drive API.
pub struct StubDrive {
    uploads: Mutex<Vec<(String, String, usize)>>,
    made_public: Mutex<Vec<String>>,
    copies: Mutex<Vec<(String, String, Option<String>)>>,
    moves: Mutex<Vec<(String, String)>>,
    exports: Mutex<Vec<(String, String)>>,
    export_body: Mutex<Vec<u8>>,
    comment_pages: Mutex<Vec<CommentPage>>,
    comment_requests: Mutex<Vec<(bool, Option<String>)>>,
    calls: AtomicUsize,
    fail_upload: Mutex<Option<ApiError>>,
    fail_public: Mutex<Option<ApiError>>,
    fail_copy: Mutex<Option<ApiError>>,
    fail_move: Mutex<Option<ApiError>>,
    fail_export: Mutex<Option<ApiError>>,
    fail_comments: Mutex<Option<ApiError>>,
}

impl Default for StubDrive {
    fn default() -> Self {
        Self {
            uploads: Mutex::default(),
            made_public: Mutex::default(),
            copies: Mutex::default(),
            moves: Mutex::default(),
            exports: Mutex::default(),
            export_body: Mutex::new(fake_pdf(2)),
            comment_pages: Mutex::default(),
            comment_requests: Mutex::default(),
            calls: AtomicUsize::new(0),
            fail_upload: Mutex::default(),
            fail_public: Mutex::default(),
            fail_copy: Mutex::default(),
            fail_move: Mutex::default(),
            fail_export: Mutex::default(),
            fail_comments: Mutex::default(),
        }
    }
}

impl StubDrive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_upload_with(&self, err: ApiError) {
        *lock(&self.fail_upload) = Some(err);
    }

    pub fn fail_public_with(&self, err: ApiError) {
        *lock(&self.fail_public) = Some(err);
    }

    pub fn fail_copy_with(&self, err: ApiError) {
        *lock(&self.fail_copy) = Some(err);
    }

    pub fn fail_move_with(&self, err: ApiError) {
        *lock(&self.fail_move) = Some(err);
    }

    pub fn fail_export_with(&self, err: ApiError) {
        *lock(&self.fail_export) = Some(err);
    }

    pub fn fail_comments_with(&self, err: ApiError) {
        *lock(&self.fail_comments) = Some(err);
    }

    /// Body served by `export_file`.
    pub fn set_export_body(&self, body: Vec<u8>) {
        *lock(&self.export_body) = body;
    }

    /// Pages served by `list_comments`, linked by `page-N` tokens.
    pub fn set_comment_pages(&self, pages: Vec<CommentPage>) {
        *lock(&self.comment_pages) = pages;
    }

    /// `(name, mime_type, byte_len)` per upload.
    pub fn uploads(&self) -> Vec<(String, String, usize)> {
        lock(&self.uploads).clone()
    }

    pub fn made_public(&self) -> Vec<String> {
        lock(&self.made_public).clone()
    }

    /// `(source_id, name, parent)` per copy.
    pub fn copies(&self) -> Vec<(String, String, Option<String>)> {
        lock(&self.copies).clone()
    }

    /// `(file_id, folder_id)` per move.
    pub fn moves(&self) -> Vec<(String, String)> {
        lock(&self.moves).clone()
    }

    pub fn exports(&self) -> Vec<(String, String)> {
        lock(&self.exports).clone()
    }

    /// `(include_deleted, page_token)` per `list_comments` call.
    pub fn comment_requests(&self) -> Vec<(bool, Option<String>)> {
        lock(&self.comment_requests).clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DriveApi for StubDrive {
    async fn upload_file(
        &self,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<FileRef, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.fail_upload).clone() {
            return Err(err);
        }
        let mut uploads = lock(&self.uploads);
        uploads.push((name.to_string(), mime_type.to_string(), bytes.len()));
        Ok(FileRef {
            id: format!("file-{}", uploads.len()),
            name: name.to_string(),
            mime_type: Some(mime_type.to_string()),
            web_view_link: None,
        })
    }

    async fn make_public(&self, file_id: &str) -> Result<(), ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.fail_public).clone() {
            return Err(err);
        }
        lock(&self.made_public).push(file_id.to_string());
        Ok(())
    }

    async fn copy_file(
        &self,
        source_id: &str,
        name: &str,
        parent_folder_id: Option<&str>,
    ) -> Result<FileRef, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.fail_copy).clone() {
            return Err(err);
        }
        lock(&self.copies).push((
            source_id.to_string(),
            name.to_string(),
            parent_folder_id.map(str::to_string),
        ));
        Ok(FileRef {
            id: "copy-1".to_string(),
            name: name.to_string(),
            mime_type: Some("application/vnd.google-apps.presentation".to_string()),
            web_view_link: None,
        })
    }

    async fn move_file(&self, file_id: &str, folder_id: &str) -> Result<(), ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.fail_move).clone() {
            return Err(err);
        }
        lock(&self.moves).push((file_id.to_string(), folder_id.to_string()));
        Ok(())
    }

    async fn export_file(&self, file_id: &str, mime_type: &str) -> Result<ByteStream, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.fail_export).clone() {
            return Err(err);
        }
        lock(&self.exports).push((file_id.to_string(), mime_type.to_string()));
        let body = lock(&self.export_body).clone();
        let middle = body.len() / 2;
        let chunks = vec![
            Ok(Bytes::copy_from_slice(&body[..middle])),
            Ok(Bytes::copy_from_slice(&body[middle..])),
        ];
        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    async fn list_comments(
        &self,
        _file_id: &str,
        include_deleted: bool,
        _page_size: u32,
        page_token: Option<&str>,
    ) -> Result<CommentPage, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.fail_comments).clone() {
            return Err(err);
        }
        lock(&self.comment_requests).push((include_deleted, page_token.map(str::to_string)));

        let pages = lock(&self.comment_pages);
        let index = page_token
            .and_then(|t| t.strip_prefix("page-"))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);
        let mut page = pages.get(index).cloned().unwrap_or_default();
        page.next_page_token = (index + 1 < pages.len()).then(|| format!("page-{}", index + 1));
        Ok(page)
    }
}

/// In-memory Translation API.
///
/// Known strings come from the dictionary; anything else is returned as
/// `[target] text`.
#[derive(Default)]
pub struct StubTranslate {
    dictionary: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<(Vec<String>, String, Option<String>)>>,
    fail: Mutex<Option<ApiError>>,
}

impl StubTranslate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, source: &str, translated: &str) {
        lock(&self.dictionary).insert(source.to_string(), translated.to_string());
    }

    pub fn fail_with(&self, err: ApiError) {
        *lock(&self.fail) = Some(err);
    }

    /// `(texts, target, source)` per batch call.
    pub fn requests(&self) -> Vec<(Vec<String>, String, Option<String>)> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl TranslateApi for StubTranslate {
    async fn translate_batch(
        &self,
        texts: &[String],
        target: &str,
        source: Option<&str>,
    ) -> Result<Vec<String>, ApiError> {
        if let Some(err) = lock(&self.fail).clone() {
            return Err(err);
        }
        lock(&self.requests).push((
            texts.to_vec(),
            target.to_string(),
            source.map(str::to_string),
        ));
        let dictionary = lock(&self.dictionary);
        Ok(texts
            .iter()
            .map(|text| {
                dictionary
                    .get(text)
                    .cloned()
                    .unwrap_or_else(|| format!("[{}] {}", target, text))
            })
            .collect())
    }
}

/// Stubs serving [`fixture_presentation`], plus handles for assertions.
pub fn stub_services() -> (
    GoogleServices,
    Arc<StubSlides>,
    Arc<StubDrive>,
    Arc<StubTranslate>,
) {
    let slides = Arc::new(StubSlides::new(fixture_presentation()));
    let drive = Arc::new(StubDrive::new());
    let translate = Arc::new(StubTranslate::new());
    let services = GoogleServices {
        slides: slides.clone(),
        drive: drive.clone(),
        translate: translate.clone(),
    };
    (services, slides, drive, translate)
}
