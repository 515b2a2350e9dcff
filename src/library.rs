//! Track library: the data model handed to the playback engine and the
//! collaborators that produce playlists (directory scan, JSON catalog,
//! album grouping, search).

mod albums;
mod catalog;
mod model;
mod scan;
mod search;

pub use albums::{Album, group_albums};
pub use catalog::load_catalog;
pub use model::{AlbumRef, MediaOrigin, Track};
pub use scan::scan;
pub use search::search;
