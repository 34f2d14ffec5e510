//! Download and cache of the audio tagging model.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

pub const MODEL_URL: &str = "https://github.com/k2-fsa/sherpa-onnx/releases/download/audio-tagging-models/sherpa-onnx-zipformer-audio-tagging-2024-04-09.tar.bz2";
pub const MODEL_NAME: &str = "sherpa-onnx-zipformer-audio-tagging-2024-04-09";
pub const MODEL_FILE: &str = "model.int8.onnx";
pub const LABELS_FILE: &str = "class_labels_indices.csv";

#[derive(Debug, Clone)]
pub struct ModelSource {
    pub url: String,
    /// Top level directory inside the archive
    pub name: String,
    pub sha256: Option<String>,
}

impl Default for ModelSource {
    fn default() -> Self {
        Self {
            url: MODEL_URL.into(),
            name: MODEL_NAME.into(),
            sha256: None,
        }
    }
}

/// Model and label files of an unpacked model directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFiles {
    pub model: PathBuf,
    pub labels: PathBuf,
}

impl ModelFiles {
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(MODEL_FILE),
            labels: dir.join(LABELS_FILE),
        }
    }

    pub fn exist(&self) -> bool {
        self.model.is_file() && self.labels.is_file()
    }
}

pub fn get_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|p| p.join("soundleaf"))
}

/// Returns the files of `source`, downloading them into `cache_dir` when missing.
pub fn ensure_model(source: &ModelSource, cache_dir: &Path) -> Result<ModelFiles> {
    let files = ModelFiles::in_dir(cache_dir.join(&source.name));
    if files.exist() {
        tracing::debug!("using cached model at {}", files.model.display());
        return Ok(files);
    }

    tracing::info!("downloading model from {}", source.url);
    let archive = fetch_file(&source.url)?;
    let digest = sha256(&archive);
    tracing::debug!("model archive sha256 {}", digest);
    if let Some(expected) = &source.sha256 {
        if !expected.eq_ignore_ascii_case(&digest) {
            return Err(Error::ModelLoad(format!(
                "checksum mismatch for {}: expected {expected}, got {digest}",
                source.url
            )));
        }
    }

    std::fs::create_dir_all(cache_dir)
        .map_err(|e| Error::ModelLoad(format!("{}: {e}", cache_dir.display())))?;
    extract_tbz(&archive, cache_dir)?;

    if !files.exist() {
        return Err(Error::ModelLoad(format!(
            "archive did not contain {} and {}",
            files.model.display(),
            files.labels.display()
        )));
    }
    Ok(files)
}

pub fn fetch_file(source_url: &str) -> Result<Vec<u8>> {
    let resp = ureq::AgentBuilder::new()
        .try_proxy_from_env(true)
        .build()
        .get(source_url)
        .timeout(std::time::Duration::from_secs(1800))
        .call()
        .map_err(|e| Error::ModelLoad(format!("failed to GET `{source_url}`: {e}")))?;

    let len = resp
        .header("Content-Length")
        .and_then(|s| s.parse::<usize>().ok());
    let mut buffer = Vec::with_capacity(len.unwrap_or(0));
    resp.into_reader()
        .read_to_end(&mut buffer)
        .map_err(|e| Error::ModelLoad(format!("failed to download from `{source_url}`: {e}")))?;
    if let Some(len) = len {
        if buffer.len() != len {
            return Err(Error::ModelLoad(format!(
                "truncated download from `{source_url}`: {} of {len} bytes",
                buffer.len()
            )));
        }
    }
    Ok(buffer)
}

pub fn sha256(buf: &[u8]) -> String {
    let hash = <sha2::Sha256 as sha2::Digest>::digest(buf);
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn extract_tbz(buf: &[u8], output: &Path) -> Result<()> {
    tracing::debug!("extracting archive to {}", output.display());
    let tar = bzip2::read::BzDecoder::new(buf);
    let mut archive = tar::Archive::new(tar);
    archive
        .unpack(output)
        .map_err(|e| Error::ModelLoad(format!("failed to extract archive: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("soundleaf-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn tbz(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, path, data.as_bytes())
                .unwrap();
        }
        let tar = builder.into_inner().unwrap();
        let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        encoder.write_all(&tar).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_extract_model_archive() {
        let dir = temp_dir("extract");
        let archive = tbz(&[
            ("m/model.int8.onnx", "onnx"),
            ("m/class_labels_indices.csv", "index,mid,display_name\n"),
        ]);
        std::fs::create_dir_all(&dir).unwrap();
        extract_tbz(&archive, &dir).unwrap();
        let files = ModelFiles::in_dir(dir.join("m"));
        assert!(files.exist());
        assert_eq!(std::fs::read(&files.model).unwrap(), b"onnx");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_cached_model_skips_download() {
        let dir = temp_dir("cached");
        let model_dir = dir.join("cached-model");
        std::fs::create_dir_all(&model_dir).unwrap();
        std::fs::write(model_dir.join(MODEL_FILE), b"onnx").unwrap();
        std::fs::write(model_dir.join(LABELS_FILE), b"index,mid,display_name\n").unwrap();

        let source = ModelSource {
            url: "http://127.0.0.1:9/unreachable.tar.bz2".into(),
            name: "cached-model".into(),
            sha256: None,
        };
        let files = ensure_model(&source, &dir).unwrap();
        assert_eq!(files, ModelFiles::in_dir(&model_dir));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_corrupt_archive_fails() {
        let dir = temp_dir("corrupt");
        assert!(matches!(
            extract_tbz(b"definitely not bzip2", &dir),
            Err(Error::ModelLoad(_))
        ));
    }
}
