// Domain models: the screenshot record and the /stats aggregate

mod screenshot;
mod stats;

pub use screenshot::{NewImage, NewScreenshot, Screenshot, StoredImage, image_content_type};
pub use stats::{ComputerCount, GroupCount, LatestEntry, LocationCount, Stats};
