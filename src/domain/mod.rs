pub mod feed;
pub mod item;

pub use feed::{Feed, FeedType, Image, Person};
pub use item::{Enclosure, Item};
