pub mod use_paged_list;
pub mod use_random;

pub use use_paged_list::{use_paged_list, PagedListHandle};
