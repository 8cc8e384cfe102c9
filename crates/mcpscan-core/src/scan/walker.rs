//! Text corpus walker.
//!
//! Enumerates every file under a root, drops files whose guessed MIME type is
//! known to be non-text (source and config extensions are always kept), and
//! decodes the rest (UTF-8, falling back to
//! Latin-1). Unreadable entries are logged and skipped; the walk itself never
//! fails.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::ScanOptions;

/// A decoded file produced by the walker. Consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    /// Guessed MIME type, `None` when the extension gives no hint.
    pub mime_guess: Option<String>,
    pub text: String,
}

/// Lazy, deterministic sequence of candidate files.
///
/// Directory entries are visited depth-first, sorted by file name, without
/// following symlinks.
pub struct TextCorpus {
    entries: walkdir::IntoIter,
    max_file_bytes: Option<u64>,
}

/// Start walking `root`.
pub fn walk(root: &Path, options: &ScanOptions) -> TextCorpus {
    TextCorpus {
        entries: WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter(),
        max_file_bytes: options.max_file_bytes,
    }
}

impl Iterator for TextCorpus {
    type Item = CandidateFile;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(candidate) = self.load(entry.path()) {
                return Some(candidate);
            }
        }
    }
}

impl TextCorpus {
    fn load(&self, path: &Path) -> Option<CandidateFile> {
        let mime_guess = guess_mime(path);
        if let Some(mime) = mime_guess.as_deref() {
            if !is_textual(mime) && !has_text_extension(path) {
                tracing::debug!(path = %path.display(), mime, "Skipping non-text file");
                return None;
            }
        }

        if let Some(limit) = self.max_file_bytes {
            match std::fs::metadata(path) {
                Ok(meta) if meta.len() > limit => {
                    tracing::debug!(
                        path = %path.display(),
                        size = meta.len(),
                        limit,
                        "Skipping file over size limit"
                    );
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Could not stat file");
                    return None;
                }
            }
        }

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Error reading file");
                return None;
            }
        };

        let text = decode(bytes, path);
        Some(CandidateFile {
            path: path.to_path_buf(),
            mime_guess,
            text,
        })
    }
}

/// Extensions read regardless of their MIME guess. `mime_guess` files several
/// of them under `application/*` (or `video/mp2t` for `.ts`).
const TEXT_EXTENSIONS: &[&str] = &[
    "cjs", "conf", "cts", "ini", "java", "js", "json5", "jsonc", "jsx", "kt", "mjs", "mts", "py",
    "rs", "sh", "toml", "ts", "tsx", "yaml", "yml",
];

fn has_text_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            TEXT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

fn guess_mime(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
}

fn is_textual(mime: &str) -> bool {
    mime.starts_with("text/") || mime == "application/json"
}

/// UTF-8 first; Latin-1 maps every byte to U+0000..U+00FF and cannot fail.
fn decode(bytes: Vec<u8>, path: &Path) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path = %path.display(), "UTF-8 decoding failed, falling back to Latin-1");
            e.into_bytes().iter().map(|&b| char::from(b)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn paths(corpus: TextCorpus, root: &Path) -> Vec<String> {
        corpus
            .map(|c| {
                c.path
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_walk_is_sorted_and_depth_first() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("b/inner")).unwrap();
        fs::write(dir.path().join("c.txt"), "c").unwrap();
        fs::write(dir.path().join("a.md"), "a").unwrap();
        fs::write(dir.path().join("b/inner/z.json"), "{}").unwrap();
        fs::write(dir.path().join("b/y.txt"), "y").unwrap();

        let found = paths(walk(dir.path(), &ScanOptions::default()), dir.path());
        assert_eq!(found, vec!["a.md", "b/inner/z.json", "b/y.txt", "c.txt"]);
    }

    #[test]
    fn test_skips_known_binary_types() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("logo.png"), [0x89, b'P', b'N', b'G']).unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        let found = paths(walk(dir.path(), &ScanOptions::default()), dir.path());
        assert_eq!(found, vec!["notes.txt"]);
    }

    #[test]
    fn test_source_and_config_extensions_are_kept() {
        let dir = TempDir::new().unwrap();
        for name in ["client.mjs", "index.ts", "Server.java", "settings.json5", "archive.zip"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }

        let found = paths(walk(dir.path(), &ScanOptions::default()), dir.path());
        assert_eq!(
            found,
            vec!["Server.java", "client.mjs", "index.ts", "settings.json5"]
        );
    }

    #[test]
    fn test_unknown_extension_is_candidate() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("LICENSE"), "MIT").unwrap();

        let files: Vec<_> = walk(dir.path(), &ScanOptions::default()).collect();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].mime_guess, None);
        assert_eq!(files[0].text, "MIT");
    }

    #[test]
    fn test_latin1_fallback() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("legacy.txt"), [b'c', b'a', b'f', 0xE9]).unwrap();

        let files: Vec<_> = walk(dir.path(), &ScanOptions::default()).collect();
        assert_eq!(files[0].text, "caf\u{e9}");
    }

    #[test]
    fn test_size_cap() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("big.txt"), "x".repeat(64)).unwrap();
        fs::write(dir.path().join("small.txt"), "x").unwrap();

        let options = ScanOptions::default().with_max_file_bytes(16);
        let found = paths(walk(dir.path(), &options), dir.path());
        assert_eq!(found, vec!["small.txt"]);
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(walk(&missing, &ScanOptions::default()).count(), 0);
    }
}
