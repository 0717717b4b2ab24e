use crate::document::Document;
use dashmap::DashMap;
use url::Url;

/// Text of every open document, keyed by URL.
pub struct DocumentStore {
    documents: DashMap<Url, Document>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, uri: Url, text: String) {
        self.documents.insert(uri, Document::new(text));
    }

    /// Owned copy of a document's text.
    pub fn text(&self, uri: &Url) -> Option<String> {
        self.documents.get(uri).map(|doc| doc.text().to_string())
    }

    /// Replace a document's text, inserting it when unknown.
    pub fn update(&self, uri: Url, text: String) {
        match self.documents.get_mut(&uri) {
            Some(mut doc) => doc.update(text),
            None => {
                self.documents.insert(uri, Document::new(text));
            }
        }
    }

    pub fn remove(&self, uri: &Url) -> Option<Document> {
        self.documents.remove(uri).map(|(_, doc)| doc)
    }
}
