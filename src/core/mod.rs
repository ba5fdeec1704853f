pub mod document;
pub mod migrator;
pub mod page;

pub use crate::domain::model::{
    ExportedFile, Feed, FeedId, Form, FormId, ImportOutcome, PortableDocument,
};
pub use crate::domain::ports::{ConfigProvider, FeedStore, Storage};
pub use crate::utils::error::Result;
