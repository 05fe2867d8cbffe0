//! Request extractors.

mod paging;
pub use paging::PagingRequest;
