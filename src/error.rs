//! Error types for slidesmith.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
}

/// Error returned by every tool.
///
/// Each variant is one stable kind (see [`ToolError::kind`]) carrying a
/// human-readable detail. Upstream failures keep the original service
/// message in the detail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ToolError {
    // Invalid input
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid presentation ID: {0}")]
    InvalidPresentationId(String),

    #[error("Invalid object ID: {0}")]
    InvalidObjectId(String),

    #[error("Invalid slide reference: {0}")]
    InvalidSlideReference(String),

    #[error("Invalid image data: {0}")]
    InvalidImageData(String),

    #[error("Invalid size: {0}")]
    InvalidSize(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Invalid crop: {0}")]
    InvalidCrop(String),

    #[error("Invalid brightness: {0}")]
    InvalidBrightness(String),

    #[error("Invalid contrast: {0}")]
    InvalidContrast(String),

    #[error("Invalid transparency: {0}")]
    InvalidTransparency(String),

    #[error("Invalid recolor: {0}")]
    InvalidRecolor(String),

    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),

    #[error("Invalid transition type: {0}")]
    InvalidTransitionType(String),

    #[error("Invalid transition duration: {0}")]
    InvalidTransitionDuration(String),

    #[error("Invalid title: {0}")]
    InvalidTitle(String),

    #[error("Invalid language: {0}")]
    InvalidLanguage(String),

    #[error("Invalid search options: {0}")]
    InvalidSearchOptions(String),

    #[error("Empty query: {0}")]
    EmptyQuery(String),

    #[error("No properties to modify: {0}")]
    NoPropertiesToModify(String),

    #[error("No objects specified: {0}")]
    NoObjectsSpecified(String),

    #[error("Invalid object type: {0}")]
    InvalidObjectType(String),

    #[error("Invalid object state: {0}")]
    InvalidObjectState(String),

    // Not found
    #[error("Presentation not found: {0}")]
    PresentationNotFound(String),

    #[error("Slide not found: {0}")]
    SlideNotFound(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    // Authorization
    #[error("Access denied: {0}")]
    AccessDenied(String),

    // Remote service
    #[error("Service error: {0}")]
    ServiceError(String),

    // Operation failures
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Create failed: {0}")]
    CreateFailed(String),

    #[error("Copy failed: {0}")]
    CopyFailed(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Replace failed: {0}")]
    ReplaceFailed(String),

    #[error("Modify image failed: {0}")]
    ModifyImageFailed(String),

    #[error("Modify video failed: {0}")]
    ModifyVideoFailed(String),

    #[error("Translate failed: {0}")]
    TranslateFailed(String),

    #[error("No text to translate: {0}")]
    NoTextToTranslate(String),

    #[error("Transition not supported: {0}")]
    TransitionNotSupported(String),
}

impl ToolError {
    /// Stable machine-readable code for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidParameters(_) => "INVALID_PARAMETERS",
            Self::InvalidPresentationId(_) => "INVALID_PRESENTATION_ID",
            Self::InvalidObjectId(_) => "INVALID_OBJECT_ID",
            Self::InvalidSlideReference(_) => "INVALID_SLIDE_REFERENCE",
            Self::InvalidImageData(_) => "INVALID_IMAGE_DATA",
            Self::InvalidSize(_) => "INVALID_SIZE",
            Self::InvalidPosition(_) => "INVALID_POSITION",
            Self::InvalidCrop(_) => "INVALID_CROP",
            Self::InvalidBrightness(_) => "INVALID_BRIGHTNESS",
            Self::InvalidContrast(_) => "INVALID_CONTRAST",
            Self::InvalidTransparency(_) => "INVALID_TRANSPARENCY",
            Self::InvalidRecolor(_) => "INVALID_RECOLOR",
            Self::InvalidTimeRange(_) => "INVALID_TIME_RANGE",
            Self::InvalidTransitionType(_) => "INVALID_TRANSITION_TYPE",
            Self::InvalidTransitionDuration(_) => "INVALID_TRANSITION_DURATION",
            Self::InvalidTitle(_) => "INVALID_TITLE",
            Self::InvalidLanguage(_) => "INVALID_LANGUAGE",
            Self::InvalidSearchOptions(_) => "INVALID_SEARCH_OPTIONS",
            Self::EmptyQuery(_) => "EMPTY_QUERY",
            Self::NoPropertiesToModify(_) => "NO_PROPERTIES_TO_MODIFY",
            Self::NoObjectsSpecified(_) => "NO_OBJECTS_SPECIFIED",
            Self::InvalidObjectType(_) => "INVALID_OBJECT_TYPE",
            Self::InvalidObjectState(_) => "INVALID_OBJECT_STATE",
            Self::PresentationNotFound(_) => "PRESENTATION_NOT_FOUND",
            Self::SlideNotFound(_) => "SLIDE_NOT_FOUND",
            Self::ObjectNotFound(_) => "OBJECT_NOT_FOUND",
            Self::SourceNotFound(_) => "SOURCE_NOT_FOUND",
            Self::FolderNotFound(_) => "FOLDER_NOT_FOUND",
            Self::AccessDenied(_) => "ACCESS_DENIED",
            Self::ServiceError(_) => "SERVICE_ERROR",
            Self::UploadFailed(_) => "UPLOAD_FAILED",
            Self::CreateFailed(_) => "CREATE_FAILED",
            Self::CopyFailed(_) => "COPY_FAILED",
            Self::ExportFailed(_) => "EXPORT_FAILED",
            Self::DeleteFailed(_) => "DELETE_FAILED",
            Self::ReplaceFailed(_) => "REPLACE_FAILED",
            Self::ModifyImageFailed(_) => "MODIFY_IMAGE_FAILED",
            Self::ModifyVideoFailed(_) => "MODIFY_VIDEO_FAILED",
            Self::TranslateFailed(_) => "TRANSLATE_FAILED",
            Self::NoTextToTranslate(_) => "NO_TEXT_TO_TRANSLATE",
            Self::TransitionNotSupported(_) => "TRANSITION_NOT_SUPPORTED",
        }
    }

    /// The human-readable detail without the kind prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::InvalidParameters(d)
            | Self::InvalidPresentationId(d)
            | Self::InvalidObjectId(d)
            | Self::InvalidSlideReference(d)
            | Self::InvalidImageData(d)
            | Self::InvalidSize(d)
            | Self::InvalidPosition(d)
            | Self::InvalidCrop(d)
            | Self::InvalidBrightness(d)
            | Self::InvalidContrast(d)
            | Self::InvalidTransparency(d)
            | Self::InvalidRecolor(d)
            | Self::InvalidTimeRange(d)
            | Self::InvalidTransitionType(d)
            | Self::InvalidTransitionDuration(d)
            | Self::InvalidTitle(d)
            | Self::InvalidLanguage(d)
            | Self::InvalidSearchOptions(d)
            | Self::EmptyQuery(d)
            | Self::NoPropertiesToModify(d)
            | Self::NoObjectsSpecified(d)
            | Self::InvalidObjectType(d)
            | Self::InvalidObjectState(d)
            | Self::PresentationNotFound(d)
            | Self::SlideNotFound(d)
            | Self::ObjectNotFound(d)
            | Self::SourceNotFound(d)
            | Self::FolderNotFound(d)
            | Self::AccessDenied(d)
            | Self::ServiceError(d)
            | Self::UploadFailed(d)
            | Self::CreateFailed(d)
            | Self::CopyFailed(d)
            | Self::ExportFailed(d)
            | Self::DeleteFailed(d)
            | Self::ReplaceFailed(d)
            | Self::ModifyImageFailed(d)
            | Self::ModifyVideoFailed(d)
            | Self::TranslateFailed(d)
            | Self::NoTextToTranslate(d)
            | Self::TransitionNotSupported(d) => d,
        }
    }

    /// Whether this error was raised by input validation.
    pub fn is_invalid_input(&self) -> bool {
        self.kind().starts_with("INVALID_")
            || matches!(
                self,
                Self::EmptyQuery(_) | Self::NoPropertiesToModify(_) | Self::NoObjectsSpecified(_)
            )
    }

    /// Render as the structured value hosts hand back to callers.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "kind": self.kind(),
            "detail": self.detail(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_detail() {
        let err = ToolError::SlideNotFound("slide index 4 out of range (3 slides)".to_string());
        assert_eq!(err.kind(), "SLIDE_NOT_FOUND");
        assert_eq!(err.detail(), "slide index 4 out of range (3 slides)");
        assert_eq!(
            err.to_string(),
            "Slide not found: slide index 4 out of range (3 slides)"
        );
    }

    #[test]
    fn test_invalid_input_classification() {
        assert!(ToolError::InvalidCrop("x".into()).is_invalid_input());
        assert!(ToolError::EmptyQuery("x".into()).is_invalid_input());
        assert!(ToolError::NoObjectsSpecified("x".into()).is_invalid_input());
        assert!(!ToolError::AccessDenied("x".into()).is_invalid_input());
        assert!(!ToolError::TransitionNotSupported("x".into()).is_invalid_input());
    }

    #[test]
    fn test_to_json() {
        let err = ToolError::AccessDenied("The caller does not have permission".to_string());
        assert_eq!(
            err.to_json(),
            serde_json::json!({
                "kind": "ACCESS_DENIED",
                "detail": "The caller does not have permission",
            })
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            key: "HTTP_TIMEOUT_SECS".to_string(),
            message: "invalid digit found in string".to_string(),
        };
        assert!(err.to_string().contains("HTTP_TIMEOUT_SECS"));
    }
}
