pub mod collaborators;
pub mod file_service;
pub mod formatter;
pub mod markdown_service;
pub mod search_service;

pub use collaborators::{
    AccessPolicy, LinkAttrs, LinkFormatter, NoTranslation, OpenPolicy, PageModel, Translator,
};
pub use file_service::FileService;
pub use formatter::HtmlFormatter;
pub use markdown_service::MarkdownService;
pub use search_service::SearchService;
