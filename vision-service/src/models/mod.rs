pub mod description;
pub mod upload;

pub use description::{Description, DescriptionResult, UnwrapFailure, PARSE_FAILURE_MESSAGE};
pub use upload::Upload;
