//! Scoped staging of uploaded audio buffers.
//!
//! An upload is written to a temporary file before transmission and read
//! back when the request is built. The file is removed when the guard
//! drops, on success and failure paths alike; nothing persists after the
//! round trip.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

pub struct StagedUpload {
    file: NamedTempFile,
    mime_type: &'static str,
}

impl StagedUpload {
    /// Writes `bytes` to a fresh temporary file. The MIME type is derived
    /// from the extension of `file_name` (the upload's original name).
    pub fn stage(file_name: &str, bytes: &[u8]) -> io::Result<Self> {
        let mut file = NamedTempFile::new()?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self {
            file,
            mime_type: mime_for(file_name),
        })
    }

    pub fn mime_type(&self) -> &str {
        self.mime_type
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Reads the staged bytes back for transmission.
    pub fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(self.file.path())
    }
}

fn mime_for(file_name: &str) -> &'static str {
    match Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(ext) if ext.eq_ignore_ascii_case("wav") => "audio/wav",
        Some(ext) if ext.eq_ignore_ascii_case("mp3") => "audio/mpeg",
        Some(ext) if ext.eq_ignore_ascii_case("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_bytes_round_trip_and_file_is_removed_on_drop() {
        let path = {
            let staged = StagedUpload::stage("clip.wav", b"RIFF0000WAVE").unwrap();
            assert!(staged.path().exists());
            assert_eq!(staged.read().unwrap(), b"RIFF0000WAVE");
            staged.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn mime_type_follows_the_file_name_extension() {
        assert_eq!(mime_for("a.wav"), "audio/wav");
        assert_eq!(mime_for("a.MP3"), "audio/mpeg");
        assert_eq!(mime_for("nested/take2.m4a"), "audio/mp4");
        assert_eq!(mime_for("noext"), "application/octet-stream");
        assert_eq!(mime_for("odd.flac"), "application/octet-stream");
    }
}
