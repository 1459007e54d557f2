use crate::config::Config;
use crate::error::Result;
use crate::recognizer::TouchSurface;
use std::path::Path;
use std::sync::Arc;

/// Trait for touch sources that can run in different modes
#[async_trait::async_trait]
pub trait TouchSourceTrait {
    /// Run the touch source until it is exhausted or fails
    async fn run(self: Box<Self>) -> Result<()>;
}

/// Factory function to create an appropriate touch source based on the dry_run flag
pub fn create_touch_source(
    config: Arc<Config>,
    surface: Arc<TouchSurface>,
    dry_run: bool,
    replay: Option<&Path>,
) -> Result<Box<dyn TouchSourceTrait + Send>> {
    if dry_run || replay.is_some() {
        Ok(Box::new(super::dry_touch_source::DryRunTouchSource::new(
            surface, replay,
        )?))
    } else {
        Ok(Box::new(super::touch_source::RealTouchSource::new(
            config, surface,
        )?))
    }
}
