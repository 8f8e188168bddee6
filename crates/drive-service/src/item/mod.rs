//! Item service façade: listing, folder and file lifecycle, search.

pub mod download;
pub mod service;
pub mod upload;

pub use download::DownloadedFile;
pub use service::ItemService;
pub use upload::FileUpload;
