pub mod artist;
pub mod genres;
pub mod show;
pub mod venue;

pub use artist::Artist;
pub use genres::Genres;
pub use show::{Show, ShowListing};
pub use venue::Venue;

use serde::Serialize;
use std::fmt;

/// The three record kinds stored by the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    Venue,
    Artist,
    Show,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Venue => "Venue",
            EntityKind::Artist => "Artist",
            EntityKind::Show => "Show",
        };
        f.write_str(name)
    }
}
