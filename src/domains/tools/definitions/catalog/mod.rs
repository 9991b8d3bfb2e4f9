//! Catalog and library tools:
//! - `search`: search the TIDAL track catalog
//! - `favorites`: the user's favorite tracks

pub mod favorites;
pub mod search;

pub use favorites::{GetFavoritesParams, GetFavoritesTool};
pub use search::{SearchTracksParams, SearchTracksTool};
