use std::sync::LazyLock;

use chrono_tz::Tz;
use tracing::{debug, info};
use tzf_rs::DefaultFinder;

// Building the finder decodes the embedded boundary data, so do it once.
static FINDER: LazyLock<DefaultFinder> = LazyLock::new(DefaultFinder::new);

/// Load the boundary data up front instead of on the first location message
pub fn warm_up() {
    LazyLock::force(&FINDER);
    info!("Time zone finder ready");
}

/// IANA time zone covering the position, UTC when nothing matches
pub fn timezone_at(latitude: f64, longitude: f64) -> Tz {
    let name = FINDER.get_tz_name(longitude, latitude);
    match name.parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            debug!(
                "No usable time zone for {}, {} (got {:?}), using UTC",
                latitude, longitude, name
            );
            Tz::UTC
        }
    }
}
