//! Document management for the LSP server
//!
//! Tracks open documents by URI, keeping the newest version of each.

use dashmap::DashMap;
use std::sync::Arc;
use tower_lsp::lsp_types::Url;

use crate::utils::LineIndex;

/// A document being edited
#[derive(Debug)]
pub struct Document {
    pub content: String,
    pub line_index: LineIndex,
    pub version: i32,
}

impl Document {
    pub fn new(content: String, version: i32) -> Self {
        let line_index = LineIndex::new(&content);
        Self {
            content,
            line_index,
            version,
        }
    }
}

/// File name used for a document in diagnostics
pub fn filename(uri: &Url) -> String {
    uri.path_segments()
        .and_then(|mut segments| segments.next_back().map(String::from))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown.mlogx".to_string())
}

/// Store for all open documents
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, Arc<Document>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    /// Insert or replace a document. An older version never replaces a newer one.
    pub fn insert(&self, uri: Url, document: Document) -> Arc<Document> {
        let document = Arc::new(document);
        let mut entry = self.documents.entry(uri).or_insert_with(|| Arc::clone(&document));
        if entry.version <= document.version {
            *entry = Arc::clone(&document);
        }
        Arc::clone(entry.value())
    }

    pub fn get(&self, uri: &Url) -> Option<Arc<Document>> {
        self.documents.get(uri).map(|r| Arc::clone(&*r))
    }

    pub fn close(&self, uri: &Url) {
        self.documents.remove(uri);
    }
}
