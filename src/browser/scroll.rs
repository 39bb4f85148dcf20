//! Lazy-load scrolling
//!
//! Charts and embedded widgets on the dashboard only render once they enter
//! the viewport, so the whole document is walked top to bottom before any
//! export.

use super::session::PageSession;
use crate::error::{Error, Result};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Scroll offsets for one pass over a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollPlan {
    height: u32,
    positions: Vec<u32>,
}

impl ScrollPlan {
    /// Offsets `0, step, 2*step, ...` below `height`, then `height` itself.
    ///
    /// The last offset is always the measured height so the bottom of the
    /// page is reached even when `height` is not a multiple of `step`.
    pub fn new(height: u32, step: u32) -> Result<Self> {
        if step == 0 {
            return Err(Error::generic("scroll step must be positive"));
        }

        let mut positions: Vec<u32> = (0..height).step_by(step as usize).collect();
        if positions.last() != Some(&height) {
            positions.push(height);
        }

        Ok(Self { height, positions })
    }

    /// Measured document height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Offsets in visiting order
    pub fn positions(&self) -> &[u32] {
        &self.positions
    }

    /// Final offset visited
    pub fn bottom(&self) -> u32 {
        self.positions.last().copied().unwrap_or(0)
    }
}

/// Walk the document in `step` increments, pausing `delay` after each, then
/// return to the top. Returns the plan that was executed.
#[instrument(skip(session))]
pub async fn scroll_through<S>(session: &S, step: u32, delay: Duration) -> Result<ScrollPlan>
where
    S: PageSession + ?Sized,
{
    let height = session.document_height().await?;
    let plan = ScrollPlan::new(height, step)?;
    info!(
        "Scrolling {}px in {} steps to trigger lazy loading",
        height,
        plan.positions().len()
    );

    for &y in plan.positions() {
        session.scroll_to(y).await?;
        tokio::time::sleep(delay).await;
    }
    debug!("Reached bottom at {}px", plan.bottom());

    session.scroll_to(0).await?;
    Ok(plan)
}
