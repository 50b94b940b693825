//! Request validation.
//!
//! Per-field rules are declared as constants and applied in a fixed order:
//! presence, type, trim, length bounds. The first failing rule answers with a
//! single 400 message. Uniqueness checks need the store and live in the handlers.

use std::path::Path;

use axum::body::Bytes;
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{error::ApiError, id::ObjectId, repository::Page};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

pub const MIN_IMAGE_BYTES: usize = 1000;
pub const MAX_IMAGE_BYTES: usize = 4000;
pub const IMAGE_MIME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];

/// Inclusive character-count bounds and the message reported when they are violated.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub min: usize,
    pub max: usize,
    pub message: &'static str,
}

/// TextRule
///
/// Declarative constraint for one string field.
#[derive(Debug, Clone, Copy)]
pub struct TextRule {
    pub missing: &'static str,
    pub not_text: &'static str,
    pub trim: bool,
    pub bounds: Option<Bounds>,
}

pub const SIGN_UP_NAME: TextRule = TextRule {
    missing: "Name is required",
    not_text: "Name must be characters",
    trim: true,
    bounds: Some(Bounds { min: 2, max: 60, message: "Name must be within 2-60 characters" }),
};

pub const ACCOUNT_NAME: TextRule = TextRule {
    missing: "Name is required",
    not_text: "Name must be characters",
    trim: true,
    bounds: Some(Bounds { min: 2, max: 40, message: "Name must be within 2-40 characters" }),
};

pub const SIGN_UP_PASSWORD: TextRule = TextRule {
    missing: "Password is required",
    not_text: "Password must be characters",
    trim: false,
    bounds: Some(Bounds { min: 2, max: 60, message: "Password must be within 2-60 characters" }),
};

pub const NEW_PASSWORD: TextRule = TextRule {
    missing: "New password is required",
    not_text: "Invalid new password",
    trim: false,
    bounds: Some(Bounds { min: 8, max: 20, message: "New password must be within 8-20 characters" }),
};

pub const OLD_PASSWORD: TextRule = TextRule {
    missing: "Old password is required",
    not_text: "Invalid old password",
    trim: false,
    bounds: None,
};

pub const PASSWORD: TextRule = TextRule {
    missing: "Password is required",
    not_text: "Invalid password",
    trim: false,
    bounds: None,
};

pub const EMAIL: TextRule = TextRule {
    missing: "Email is required",
    not_text: "Invalid email",
    trim: false,
    bounds: None,
};

pub const CATEGORY_NAME: TextRule = TextRule {
    missing: "Name is required",
    not_text: "Name must be characters",
    trim: true,
    bounds: Some(Bounds { min: 2, max: 20, message: "Name must be within 2-20 characters" }),
};

pub const NEWS_TITLE: TextRule = TextRule {
    missing: "Title is required",
    not_text: "Title must be characters",
    trim: true,
    bounds: Some(Bounds { min: 2, max: 60, message: "Title must be within 2-60 characters" }),
};

pub const NEWS_DESCRIPTION: TextRule = TextRule {
    missing: "Description is required",
    not_text: "Description must be characters",
    trim: true,
    bounds: Some(Bounds { min: 2, max: 60, message: "Description must be within 2-60 characters" }),
};

pub const CATEGORY_ID: TextRule = TextRule {
    missing: "Category id is required",
    not_text: "Category id must be characters",
    trim: false,
    bounds: None,
};

pub const COMMENT: TextRule = TextRule {
    missing: "Comment is required",
    not_text: "Comment must be characters",
    trim: true,
    bounds: Some(Bounds { min: 2, max: 200, message: "Comment must be within 2-200 characters" }),
};

impl TextRule {
    /// Applies the rule and returns the (possibly trimmed) text.
    pub fn check(&self, value: Option<&Value>) -> Result<String, ApiError> {
        let value = match value {
            Some(value) if !is_missing(value) => value,
            _ => return Err(ApiError::validation(self.missing)),
        };

        let Value::String(text) = value else {
            return Err(ApiError::validation(self.not_text));
        };

        let text = if self.trim { text.trim() } else { text.as_str() };

        if let Some(bounds) = self.bounds {
            let len = text.chars().count();
            if len < bounds.min || len > bounds.max {
                return Err(ApiError::validation(bounds.message));
            }
        }

        Ok(text.to_string())
    }
}

/// Loose truthiness: absent-equivalent values a client may send for "nothing".
fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Parses a path or body id, answering with `error` when it is not a valid store id.
pub fn parse_id(raw: &str, error: impl FnOnce() -> ApiError) -> Result<ObjectId, ApiError> {
    ObjectId::parse(raw).ok_or_else(error)
}

/// Validates the `categoryIds` array of the favorite-categories body.
///
/// Existence of every id is checked against the store by the caller.
pub fn check_category_ids(value: Option<&Value>) -> Result<Vec<ObjectId>, ApiError> {
    let value = match value {
        Some(value) if !is_missing(value) => value,
        _ => return Err(ApiError::validation("Category ids required")),
    };

    let Value::Array(items) = value else {
        return Err(ApiError::validation("Category ids must be a array"));
    };

    items
        .iter()
        .map(|item| {
            item.as_str()
                .and_then(ObjectId::parse)
                .ok_or_else(|| ApiError::validation("Invalid category id"))
        })
        .collect()
}

/// ImageUpload
///
/// A file part lifted out of a multipart body.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    /// Random storage name that keeps the original extension, e.g. `<uuid>.png`.
    pub fn stored_name(&self) -> String {
        let extension = Path::new(&self.file_name)
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();
        format!("{}{}", Uuid::new_v4(), extension)
    }
}

/// Checks mime type and size of an uploaded image. A missing image is only an error when `required`.
pub fn check_image(image: Option<&ImageUpload>, required: bool) -> Result<Option<&ImageUpload>, ApiError> {
    let Some(image) = image else {
        return if required {
            Err(ApiError::validation("Image is required"))
        } else {
            Ok(None)
        };
    };

    if !IMAGE_MIME_TYPES.contains(&image.content_type.as_str()) {
        return Err(ApiError::validation("Only jpg, jpeg and png images are allowed"));
    }

    if image.bytes.len() < MIN_IMAGE_BYTES || image.bytes.len() > MAX_IMAGE_BYTES {
        return Err(ApiError::validation("Image must be within 1-4KB"));
    }

    Ok(Some(image))
}

/// Pagination
///
/// `limit`/`skip` query parameters. Values arrive as raw strings so junk falls back
/// to the defaults instead of failing the request. `offset` is accepted for `skip`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Page size, default 10, at most 100.
    pub limit: Option<String>,
    /// Number of items to skip, default 0.
    #[serde(alias = "offset")]
    pub skip: Option<String>,
}

impl Pagination {
    pub fn page(&self) -> Page {
        let limit = self
            .limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|limit| *limit != 0)
            .map(|limit| limit.clamp(1, MAX_LIMIT))
            .unwrap_or(DEFAULT_LIMIT);

        let skip = self
            .skip
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(|skip| skip.max(0))
            .unwrap_or(0);

        Page { limit, skip }
    }
}
