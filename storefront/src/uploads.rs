// storefront/src/uploads.rs

//! Multipart form parsing and image attachment storage.
//!
//! Attachments are buffered in memory, bounded by the configured size cap,
//! and only written to disk after the handler has validated the rest of the form.

use crate::errors::{AppError, Result};
use actix_multipart::Multipart;
use actix_web::mime::{self, Mime};
use futures_util::StreamExt;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, instrument, warn};

/// Cap for a single non-file form field.
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;
/// Public URL prefix the uploads directory is served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
  Products,
  Brands,
  Blogs,
}

impl UploadKind {
  pub fn dir_name(self) -> &'static str {
    match self {
      UploadKind::Products => "products",
      UploadKind::Brands => "brands",
      UploadKind::Blogs => "blogs",
    }
  }
}

/// An image received in a form but not yet stored.
#[derive(Debug)]
pub struct PendingUpload {
  pub original_name: String,
  /// Taken from the part's content type, never from the client's file name.
  pub extension: &'static str,
  pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct MultipartForm {
  fields: HashMap<String, String>,
  pub file: Option<PendingUpload>,
}

impl MultipartForm {
  /// Trimmed value of a text field; empty values count as absent.
  pub fn text(&self, name: &str) -> Option<String> {
    self
      .fields
      .get(name)
      .map(|v| v.trim().to_string())
      .filter(|v| !v.is_empty())
  }

  pub fn required(&self, name: &str) -> Result<String> {
    self
      .text(name)
      .ok_or_else(|| AppError::Validation(format!("{} is required", name)))
  }

  /// Parses a field with `FromStr`, naming the field in the error.
  pub fn parsed<T>(&self, name: &str) -> Result<Option<T>>
  where
    T: std::str::FromStr,
  {
    match self.text(name) {
      None => Ok(None),
      Some(raw) => raw
        .parse::<T>()
        .map(Some)
        .map_err(|_| AppError::Validation(format!("{} is invalid", name))),
    }
  }

  #[cfg(test)]
  pub(crate) fn with_fields(pairs: &[(&str, &str)]) -> Self {
    Self {
      fields: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
      file: None,
    }
  }
}

/// Replaces whitespace runs with `-` and drops anything outside `[A-Za-z0-9-_.]`.
pub fn sanitize_filename(name: &str) -> String {
  let mut out = String::with_capacity(name.len());
  let mut in_space = false;
  for ch in name.chars() {
    if ch.is_whitespace() {
      if !in_space {
        out.push('-');
      }
      in_space = true;
      continue;
    }
    in_space = false;
    if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
      out.push(ch);
    }
  }
  out
}

/// Extension stored for an accepted image type. SVG and unknown subtypes are refused.
pub fn image_extension(content_type: &Mime) -> Option<&'static str> {
  if content_type.type_() != mime::IMAGE {
    return None;
  }
  match content_type.subtype().as_str() {
    "png" => Some("png"),
    "jpeg" | "pjpeg" => Some("jpg"),
    "gif" => Some("gif"),
    "webp" => Some("webp"),
    "avif" => Some("avif"),
    "bmp" => Some("bmp"),
    _ => None,
  }
}

/// `{millis}-{sanitized stem}.{extension}` for an uploaded file name.
pub fn stored_file_name(original_name: &str, extension: &str, now_millis: i64) -> String {
  let stem = Path::new(original_name)
    .file_stem()
    .and_then(|s| s.to_str())
    .map(|s| sanitize_filename(s).replace('.', "-"))
    .filter(|s| !s.is_empty())
    .unwrap_or_else(|| "upload".to_string());
  format!("{}-{}.{}", now_millis, stem, extension)
}

pub fn public_path(kind: UploadKind, file_name: &str) -> String {
  format!("{}/{}/{}", PUBLIC_PREFIX, kind.dir_name(), file_name)
}

/// Maps a public `/uploads/...` path back to a file under `uploads_dir`.
/// Paths that would escape the directory yield `None`.
pub fn disk_path(uploads_dir: &Path, public: &str) -> Option<PathBuf> {
  let relative = Path::new(public.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?);
  if relative.as_os_str().is_empty() || relative.components().any(|c| !matches!(c, Component::Normal(_))) {
    return None;
  }
  Some(uploads_dir.join(relative))
}

/// Reads every part of a multipart body. Only `file_field` may carry a file, and it must be an image.
#[instrument(name = "uploads::read_form", skip(payload), err(Display))]
pub async fn read_form(mut payload: Multipart, file_field: &str, max_file_bytes: usize) -> Result<MultipartForm> {
  let mut form = MultipartForm::default();

  while let Some(item) = payload.next().await {
    let mut field = item.map_err(|e| AppError::Upload(format!("Malformed multipart body: {}", e)))?;
    let (name, file_name) = match field.content_disposition() {
      Some(cd) => (
        cd.get_name().unwrap_or_default().to_string(),
        cd.get_filename().map(str::to_string),
      ),
      None => continue,
    };

    if let Some(original_name) = file_name {
      if name != file_field {
        return Err(AppError::Upload(format!("Unexpected file field '{}'", name)));
      }
      let Some(extension) = field.content_type().and_then(image_extension) else {
        return Err(AppError::Upload("Only image files are allowed".to_string()));
      };
      let bytes = read_capped(&mut field, max_file_bytes, "File too large").await?;
      debug!(field = %name, size = bytes.len(), extension, "Received attachment.");
      form.file = Some(PendingUpload {
        original_name,
        extension,
        bytes,
      });
    } else {
      let bytes = read_capped(&mut field, MAX_TEXT_FIELD_BYTES, "Form field too large").await?;
      let value = String::from_utf8(bytes).map_err(|_| AppError::Upload(format!("Field '{}' is not UTF-8", name)))?;
      form.fields.insert(name, value);
    }
  }
  Ok(form)
}

async fn read_capped(field: &mut actix_multipart::Field, cap: usize, too_large: &str) -> Result<Vec<u8>> {
  let mut buf = Vec::new();
  while let Some(chunk) = field.next().await {
    let chunk = chunk.map_err(|e| AppError::Upload(format!("Malformed multipart body: {}", e)))?;
    if buf.len() + chunk.len() > cap {
      return Err(AppError::Upload(too_large.to_string()));
    }
    buf.extend_from_slice(&chunk);
  }
  Ok(buf)
}

/// Writes a pending upload under `{uploads_dir}/{kind}/` and returns its public path.
#[instrument(name = "uploads::store", skip(uploads_dir, upload), fields(original = %upload.original_name))]
pub async fn store(uploads_dir: &Path, kind: UploadKind, upload: PendingUpload) -> Result<String> {
  let dir = uploads_dir.join(kind.dir_name());
  tokio::fs::create_dir_all(&dir).await?;
  let file_name = stored_file_name(&upload.original_name, upload.extension, chrono::Utc::now().timestamp_millis());
  tokio::fs::write(dir.join(&file_name), &upload.bytes).await?;
  debug!(%file_name, "Stored attachment.");
  Ok(public_path(kind, &file_name))
}

/// Best-effort removal of a previously stored file; failures are logged only.
pub async fn remove(uploads_dir: &Path, public: &str) {
  let Some(path) = disk_path(uploads_dir, public) else {
    warn!(%public, "Refusing to remove file outside the uploads directory.");
    return;
  };
  if let Err(e) = tokio::fs::remove_file(&path).await {
    warn!(error = %e, path = %path.display(), "Failed to remove stored file.");
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sanitizer_collapses_whitespace_and_strips_symbols() {
    assert_eq!(sanitize_filename("my  cool photo!"), "my-cool-photo");
    assert_eq!(sanitize_filename("a_b-c.d"), "a_b-c.d");
    assert_eq!(sanitize_filename("ümlaut/../x"), "mlaut..x");
  }

  #[test]
  fn stored_name_uses_the_given_extension_and_prefixes_timestamp() {
    assert_eq!(stored_file_name("Summer Sale.PNG", "png", 1700), "1700-Summer-Sale.png");
    assert_eq!(stored_file_name("noext", "jpg", 5), "5-noext.jpg");
    assert_eq!(stored_file_name("x.html", "png", 9), "9-x.png");
    assert_eq!(stored_file_name("evil.html.gif", "gif", 3), "3-evil-html.gif");
    assert_eq!(stored_file_name("!!!.png", "png", 1), "1-upload.png");
  }

  #[test]
  fn extension_comes_from_the_image_content_type() {
    let parse = |raw: &str| raw.parse::<Mime>().unwrap();
    assert_eq!(image_extension(&parse("image/png")), Some("png"));
    assert_eq!(image_extension(&parse("image/jpeg")), Some("jpg"));
    assert_eq!(image_extension(&parse("image/svg+xml")), None);
    assert_eq!(image_extension(&parse("text/html")), None);
  }

  #[test]
  fn public_paths_map_back_inside_uploads_dir_only() {
    let root = Path::new("/srv/uploads");
    let public = public_path(UploadKind::Brands, "1-logo.png");
    assert_eq!(public, "/uploads/brands/1-logo.png");
    assert_eq!(disk_path(root, &public), Some(root.join("brands/1-logo.png")));
    assert_eq!(disk_path(root, "/uploads/../etc/passwd"), None);
    assert_eq!(disk_path(root, "/elsewhere/x.png"), None);
    assert_eq!(disk_path(root, "/uploads/"), None);
    assert_eq!(disk_path(root, "/uploadsX/a.png"), None);
  }

  #[test]
  fn form_helpers_trim_and_parse() {
    let form = MultipartForm::with_fields(&[("name", "  Mug "), ("price", "12.50"), ("blank", "  "), ("qty", "x")]);
    assert_eq!(form.text("name").as_deref(), Some("Mug"));
    assert_eq!(form.text("blank"), None);
    assert!(form.required("blank").is_err());
    assert_eq!(form.parsed::<rust_decimal::Decimal>("price").unwrap(), Some(rust_decimal::Decimal::new(1250, 2)));
    assert!(form.parsed::<i32>("qty").is_err());
    assert_eq!(form.parsed::<i32>("missing").unwrap(), None);
  }
}
