pub mod document;
pub mod responses;
pub mod session;

pub use document::{CoverLetterDetails, DocumentKind, UploadFile, UploadRequest};
pub use responses::{parse_preview_images, AccessToken, LinkedInProfile};
pub use session::{ArtifactRef, ContactInfo, Session, SessionId};
