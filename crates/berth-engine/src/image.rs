//! Local image cache checks and pull-if-absent.

use berth_common::error::Result;
use berth_common::types::ImageRef;

use crate::cli::EngineCli;

/// Returns whether `image` is already present in the local cache.
///
/// A reference without a tag matches any tag of the same repository
/// (`memcached` matches `memcached:latest`); a tagged reference must
/// match exactly. See [`ImageRef::matches`].
///
/// # Errors
///
/// Returns [`BerthError::ImageListFailed`](berth_common::error::BerthError::ImageListFailed)
/// if the listing command fails.
pub fn have_image(engine: &EngineCli, image: &ImageRef) -> Result<bool> {
    let listed = engine.images()?;
    Ok(listed.iter().any(|entry| image.matches(entry)))
}

/// Ensures `image` is present locally, pulling it only on a cache miss.
///
/// # Errors
///
/// Propagates a listing failure, or
/// [`BerthError::PullFailed`](berth_common::error::BerthError::PullFailed)
/// if the pull itself fails.
pub fn check_image(engine: &EngineCli, image: &ImageRef) -> Result<()> {
    if have_image(engine, image)? {
        tracing::debug!(image = %image, "image already cached");
        return Ok(());
    }
    tracing::info!(image = %image, "pulling image");
    engine.pull(image)
}
