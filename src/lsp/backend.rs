//! LSP Backend implementation for mlogx

use mlogx::Grammar;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::debug;

use crate::analysis;
use crate::document::{filename, Document, DocumentStore};

/// The mlogx language server backend
pub struct MlogxBackend {
    client: Client,
    documents: DocumentStore,
    grammar: Grammar,
}

impl MlogxBackend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            documents: DocumentStore::new(),
            grammar: Grammar::standard(),
        }
    }

    /// Compile a document, store it and publish its diagnostics
    async fn analyze_and_publish(&self, uri: Url, content: String, version: i32) {
        let document = Document::new(content, version);
        let result = analysis::analyze(&self.grammar, &document.content, &filename(&uri));
        let diagnostics = analysis::to_diagnostics(&result, &document.line_index);
        debug!(%uri, version, count = diagnostics.len(), output_len = result.output_len, "analyzed document");

        let stored = self.documents.insert(uri.clone(), document);
        if stored.version == version {
            self.client.publish_diagnostics(uri, diagnostics, Some(version)).await;
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for MlogxBackend {
    async fn initialize(&self, _params: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: "mlogx-lsp".to_string(),
                version: Some(mlogx::VERSION.to_string()),
            }),
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec!["&".to_string()]),
                    ..Default::default()
                }),
                ..Default::default()
            },
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client.log_message(MessageType::INFO, "mlogx LSP initialized").await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        self.analyze_and_publish(document.uri, document.text, document.version).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // Full sync: the only change holds the whole text
        if let Some(change) = params.content_changes.into_iter().next() {
            self.analyze_and_publish(params.text_document.uri, change.text, params.text_document.version)
                .await;
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        if let (Some(text), Some(document)) = (params.text, self.documents.get(&uri)) {
            self.analyze_and_publish(uri, text, document.version).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.close(&uri);
        self.client.publish_diagnostics(uri, vec![], None).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let position = params.text_document_position_params.position;
        let Some(document) = self.documents.get(&params.text_document_position_params.text_document.uri) else {
            return Ok(None);
        };
        Ok(analysis::get_hover(&self.grammar, &document.line_index, position))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let position = params.text_document_position.position;
        let Some(document) = self.documents.get(&params.text_document_position.text_document.uri) else {
            return Ok(None);
        };
        let items = analysis::get_completions(&self.grammar, &document.line_index, position);
        Ok(Some(CompletionResponse::Array(items)))
    }
}
