pub mod advisor;
pub mod browser;
pub mod clipboard;
pub mod dom;
pub mod export;
pub mod extraction;
pub mod formatter;
pub mod inspector;
pub mod security;
pub mod store;
pub mod viewer;

#[cfg(test)]
pub mod testing;

pub use browser::BrowserPool;
pub use clipboard::{ClipboardSink, DisabledClipboard, SystemClipboard};
pub use export::ExportService;
pub use extraction::{ExtractionRequest, ExtractionService};
pub use inspector::{BrowserInspector, PageInspector, StaticInspector};
pub use security::SecurityService;
pub use store::{FileStore, KeyValueStore, MemoryStore, SnapshotRepository};
pub use viewer::ViewerService;
