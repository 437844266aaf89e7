//! A JSONL-backed `DocumentSource`: one product record per line,
//! `{"doc_id": "...", "text": "..."}`. Tokenisation is a trivial
//! whitespace split on the lowercased text, matching the tokenisation the
//! query side applies to an incoming search string.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::document::Document;
use crate::error::BuildError;

#[derive(Deserialize)]
struct RawRecord {
    doc_id: String,
    text: String,
}

pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(|w| w.to_lowercase()).collect()
}

/// Discovers every `.jsonl` file under `root` (recursively), sorted by
/// path for deterministic ingestion order.
pub fn collect_input_files(root: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            BuildError::io("collect_input_files", root, std::io::Error::new(std::io::ErrorKind::Other, e))
        })?;
        if entry.file_type().is_file()
            && entry.path().extension().map(|ext| ext == "jsonl").unwrap_or(false)
        {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Streams documents out of a fixed list of JSONL files, one at a time,
/// in the order the files were given. Restartable by constructing a fresh
/// instance over the same file list.
pub struct JsonlDocumentSource {
    files: std::vec::IntoIter<PathBuf>,
    current: Option<Lines<BufReader<File>>>,
    current_path: Option<PathBuf>,
}

impl JsonlDocumentSource {
    pub fn new(files: Vec<PathBuf>) -> Self {
        JsonlDocumentSource { files: files.into_iter(), current: None, current_path: None }
    }

    pub fn from_dir(root: &Path) -> Result<Self, BuildError> {
        Ok(Self::new(collect_input_files(root)?))
    }

    fn advance_file(&mut self) -> bool {
        while let Some(path) = self.files.next() {
            match File::open(&path) {
                Ok(file) => {
                    self.current = Some(BufReader::new(file).lines());
                    self.current_path = Some(path);
                    return true;
                }
                Err(e) => {
                    log::warn!("could not open {:?}: {}", path, e);
                    continue;
                }
            }
        }
        self.current = None;
        self.current_path = None;
        false
    }
}

impl Iterator for JsonlDocumentSource {
    type Item = Document;

    fn next(&mut self) -> Option<Document> {
        loop {
            if self.current.is_none() && !self.advance_file() {
                return None;
            }
            let lines = self.current.as_mut().unwrap();
            match lines.next() {
                Some(Ok(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<RawRecord>(&line) {
                        Ok(rec) => {
                            let tokens = tokenize(&rec.text);
                            return Some(Document::new(rec.doc_id, tokens));
                        }
                        Err(e) => {
                            log::warn!(
                                "skipping malformed JSONL record in {:?}: {}",
                                self.current_path, e
                            );
                            continue;
                        }
                    }
                }
                Some(Err(e)) => {
                    log::warn!("io error reading {:?}: {}", self.current_path, e);
                    self.current = None;
                    continue;
                }
                None => {
                    self.current = None;
                    continue;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_records_across_multiple_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let f1 = dir.path().join("a.jsonl");
        let f2 = dir.path().join("b.jsonl");
        std::fs::write(&f1, "{\"doc_id\":\"d1\",\"text\":\"Apple Banana\"}\n").unwrap();
        let mut f = std::fs::File::create(&f2).unwrap();
        writeln!(f, "{{\"doc_id\":\"d2\",\"text\":\"cherry\"}}").unwrap();

        let mut source = JsonlDocumentSource::new(vec![f1, f2]);
        let d1 = source.next().unwrap();
        assert_eq!(d1.doc_id, "d1");
        assert_eq!(d1.tokens, vec!["apple", "banana"]);
        let d2 = source.next().unwrap();
        assert_eq!(d2.doc_id, "d2");
        assert_eq!(d2.tokens, vec!["cherry"]);
        assert!(source.next().is_none());
    }

    #[test]
    fn skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let f1 = dir.path().join("a.jsonl");
        std::fs::write(&f1, "not json\n{\"doc_id\":\"d1\",\"text\":\"ok\"}\n").unwrap();
        let mut source = JsonlDocumentSource::new(vec![f1]);
        let d = source.next().unwrap();
        assert_eq!(d.doc_id, "d1");
        assert!(source.next().is_none());
    }

    #[test]
    fn collect_input_files_is_sorted_and_filters_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.jsonl"), "").unwrap();
        std::fs::write(dir.path().join("a.jsonl"), "").unwrap();
        std::fs::write(dir.path().join("ignore.txt"), "").unwrap();
        let files = collect_input_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].to_string_lossy().ends_with("a.jsonl"));
        assert!(files[1].to_string_lossy().ends_with("b.jsonl"));
    }
}
