// Forum platform adapter — read/write client over the forum admin API.
//
// Each submodule handles one area of the API surface: groups, categories,
// topics/posts, and user administration.

pub mod categories;
pub mod client;
pub mod groups;
pub mod topics;
pub mod traits;
pub mod users;
