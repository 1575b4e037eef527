// src/context.rs
use crate::error::{HeaderError, Result};
use crate::types::{Revision, TICKS_PER_SECOND};
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Snapshot of what the last configuration frame told us about a device.
///
/// A context is never mutated. A new configuration produces a new snapshot
/// (see [`FrameContext::update`]) which callers publish through a [`ContextCell`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameContext {
    nominal_frame_rate: u16,
    ticks_per_frame: i64,
    revision: Revision,
    generation: u64,
}

impl FrameContext {
    /// Create the first context for a device.
    ///
    /// # Arguments
    ///
    /// * `nominal_frame_rate` - Frames per second announced by the configuration frame
    /// * `revision` - Protocol revision, which selects the time-tag epoch
    pub fn new(nominal_frame_rate: u16, revision: Revision) -> Result<Self> {
        Self::with_generation(nominal_frame_rate, revision, 0)
    }

    fn with_generation(nominal_frame_rate: u16, revision: Revision, generation: u64) -> Result<Self> {
        if nominal_frame_rate == 0 {
            return Err(HeaderError::InvalidFrameRate(nominal_frame_rate));
        }

        Ok(FrameContext {
            nominal_frame_rate,
            ticks_per_frame: TICKS_PER_SECOND / nominal_frame_rate as i64,
            revision,
            generation,
        })
    }

    /// Derive the snapshot for a newer configuration frame.
    pub fn update(&self, nominal_frame_rate: u16, revision: Revision) -> Result<Self> {
        Self::with_generation(nominal_frame_rate, revision, self.generation + 1)
    }

    pub fn nominal_frame_rate(&self) -> u16 {
        self.nominal_frame_rate
    }

    pub fn ticks_per_frame(&self) -> i64 {
        self.ticks_per_frame
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Number of configuration updates since the first context for this device
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Shared slot that publishes the current [`FrameContext`] of one device.
///
/// Readers take an `Arc` snapshot with [`load`](Self::load) without taking any lock;
/// writers replace the whole snapshot with a single atomic pointer swap. Writers are
/// serialized among themselves so generations stay consecutive.
#[derive(Debug, Default)]
pub struct ContextCell {
    current: ArcSwapOption<FrameContext>,
    writer: Mutex<()>,
}

impl ContextCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(context: FrameContext) -> Self {
        ContextCell {
            current: ArcSwapOption::from_pointee(context),
            writer: Mutex::new(()),
        }
    }

    pub fn load(&self) -> Option<Arc<FrameContext>> {
        self.current.load_full()
    }

    /// Replace the published context, returning the previous snapshot
    pub fn store(&self, context: FrameContext) -> Option<Arc<FrameContext>> {
        let _writer = self.writer.lock();
        self.current.swap(Some(Arc::new(context)))
    }

    /// Publish the context for a newly parsed configuration frame.
    ///
    /// The generation continues from the currently published snapshot, if any.
    pub fn update(&self, nominal_frame_rate: u16, revision: Revision) -> Result<Arc<FrameContext>> {
        let _writer = self.writer.lock();
        let previous = self.current.load_full();
        let next = match previous.as_deref() {
            Some(previous) => previous.update(nominal_frame_rate, revision)?,
            None => FrameContext::new(nominal_frame_rate, revision)?,
        };
        let next = Arc::new(next);
        self.current.store(Some(Arc::clone(&next)));
        debug!(
            generation = next.generation(),
            rate = nominal_frame_rate,
            ?revision,
            "published frame context"
        );
        Ok(next)
    }

    pub fn clear(&self) -> Option<Arc<FrameContext>> {
        let _writer = self.writer.lock();
        self.current.swap(None)
    }

    pub fn is_configured(&self) -> bool {
        self.current.load().is_some()
    }
}
