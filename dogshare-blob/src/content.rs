use std::path::Path;
use tokio::io::AsyncReadExt;
use uuid::Uuid;

use dogshare_core::{ShareError, ShareResult};

/// How many leading bytes are inspected to detect the content type
pub const SNIFF_LEN: usize = 3072;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const OCTET_STREAM: &str = "application/octet-stream";

/// Content type and storage name chosen for a local file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub content_type: String,
    pub object_name: String,
}

/// Sniff the content type of `path` and give it a fresh, extension-preserving name.
pub async fn classify(path: &Path) -> ShareResult<Classified> {
    let display = path.display().to_string();

    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| ShareError::file_access(&display, e))?;
    if !meta.is_file() {
        return Err(ShareError::classification(&display, "not a regular file"));
    }

    let object_name = object_name_for(path)?;

    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| ShareError::file_access(&display, e))?;
    let mut head = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64)
        .read_to_end(&mut head)
        .await
        .map_err(|e| ShareError::file_access(&display, e))?;

    Ok(Classified {
        content_type: sniff(&head).to_string(),
        object_name,
    })
}

/// A random UUID followed by the original extension (with its dot), so
/// browsers can infer the file kind from the name as well as the content type.
pub fn object_name_for(path: &Path) -> ShareResult<String> {
    let id = Uuid::new_v4();
    match path.extension() {
        None => Ok(id.to_string()),
        Some(ext) => {
            let ext = ext.to_str().ok_or_else(|| {
                ShareError::classification(
                    path.display().to_string(),
                    "extension is not valid UTF-8",
                )
            })?;
            Ok(format!("{id}.{ext}"))
        }
    }
}

/// Detect a MIME type from leading file bytes.
pub fn sniff(head: &[u8]) -> &'static str {
    if let Some(kind) = infer::get(head) {
        return kind.mime_type();
    }
    if looks_like_text(head) {
        TEXT_PLAIN
    } else {
        OCTET_STREAM
    }
}

fn looks_like_text(head: &[u8]) -> bool {
    match std::str::from_utf8(head) {
        Ok(s) => !s.contains('\0'),
        // a multi-byte character cut off at the sniff boundary is still text
        Err(e) => e.error_len().is_none() && !head[..e.valid_up_to()].contains(&0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    #[test]
    fn sniff_uses_signature_not_name() {
        assert_eq!(sniff(PNG_HEADER), "image/png");
        assert_eq!(sniff(b"%PDF-1.7\n"), "application/pdf");
        assert_eq!(sniff(b"plain words"), "text/plain; charset=utf-8");
        assert_eq!(sniff(&[0x00, 0xFF, 0x13, 0x37]), "application/octet-stream");
    }

    #[test]
    fn truncated_utf8_is_still_text() {
        let text = "héllo".as_bytes();
        assert_eq!(sniff(&text[..2]), "text/plain; charset=utf-8");
    }

    #[test]
    fn object_names_keep_extension_and_differ() {
        let a = object_name_for(Path::new("/tmp/report.final.pdf")).unwrap();
        let b = object_name_for(Path::new("/tmp/report.final.pdf")).unwrap();
        assert!(a.ends_with(".pdf"));
        assert_ne!(a, b);
        assert_eq!(a.len(), 36 + ".pdf".len());

        let bare = object_name_for(Path::new("/tmp/Makefile")).unwrap();
        assert_eq!(bare.len(), 36);
        assert!(!bare.contains('.'));
    }

    #[tokio::test]
    async fn classify_reads_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("picture.txt");
        tokio::fs::write(&path, PNG_HEADER).await.unwrap();

        let classified = classify(&path).await.unwrap();
        assert_eq!(classified.content_type, "image/png");
        assert!(classified.object_name.ends_with(".txt"));
    }

    #[tokio::test]
    async fn classify_reports_missing_files_and_directories() {
        let dir = tempfile::tempdir().unwrap();

        let missing = classify(&dir.path().join("nope.bin")).await;
        assert!(matches!(tokio_test::assert_err!(missing), ShareError::FileAccess { .. }));

        let directory = classify(dir.path()).await;
        assert!(matches!(tokio_test::assert_err!(directory), ShareError::Classification { .. }));
    }
}
