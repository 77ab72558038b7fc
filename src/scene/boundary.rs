//! Boundary node: per-frame culling and level-of-detail decision for a subtree.
//!
//! Each evaluation refreshes the cached view-space box, runs the locality and
//! frustum cascade, picks a level if a LOD table is configured, and reports
//! state or level changes to listeners. The caller (the traversal driver)
//! acts on the returned [`Visit`].

use log::trace;

use crate::core::types::Result;

use super::classify::{run_cascade, transition, CascadeOutcome, LocalityState};
use super::config::BoundaryConfig;
use super::events::{BoundaryEvent, EventKind, EventNotifier, ListenerId};
use super::lod::{level_index, LodSelector, LodTable};
use super::services::FrameServices;
use super::volume::{Axis, BoundaryVolume, CacheState, Extents};

/// Which children the driver should traverse this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    Skip,
    All,
    /// Only the child at this index. Indices past the end select nothing.
    Only(usize),
}

#[derive(Debug, Default)]
pub struct BoundaryNode {
    volume: BoundaryVolume,
    state: LocalityState,
    lod: LodSelector,
    events: EventNotifier,
}

impl BoundaryNode {
    /// Plain culling node (no LOD table).
    pub fn new(extents: Extents) -> Self {
        Self {
            volume: BoundaryVolume::new(extents),
            ..Default::default()
        }
    }

    /// Build from configuration for a node that has `children` children.
    pub fn from_config(config: &BoundaryConfig, children: usize) -> Result<Self> {
        config.validate(children)?;
        Ok(Self {
            volume: BoundaryVolume::new(config.extents()),
            lod: LodSelector::new(config.levels.clone(), children)?,
            ..Default::default()
        })
    }

    /// Replace extents and levels. Nothing changes if validation fails.
    pub fn reconfigure(&mut self, config: &BoundaryConfig, children: usize) -> Result<()> {
        config.validate(children)?;
        self.lod.set_levels(config.levels.clone(), children)?;
        self.volume.set_boundary(config.extents());
        trace!("boundary reconfigured: {:?}", config);
        Ok(())
    }

    /// Current configuration as it would be written out.
    pub fn config(&self) -> BoundaryConfig {
        let config = BoundaryConfig::default().with_extents(self.volume.boundary());
        match self.lod.table() {
            Some(table) => config.with_levels(table.thresholds().to_vec()),
            None => config,
        }
    }

    pub fn boundary(&self) -> Extents {
        self.volume.boundary()
    }

    pub fn set_boundary(&mut self, extents: Extents) {
        self.volume.set_boundary(extents);
    }

    pub fn set_extent(&mut self, axis: Axis, min: f64, max: f64) {
        self.volume.set_extent(axis, min, max);
    }

    /// Replace the LOD table, validated against the current child count.
    pub fn set_levels(&mut self, levels: Vec<f64>, children: usize) -> Result<()> {
        self.lod.set_levels(Some(levels), children)?;
        self.volume.invalidate();
        Ok(())
    }

    /// Turn this into a plain culling node.
    pub fn clear_levels(&mut self) {
        self.lod.clear();
        self.volume.invalidate();
    }

    /// Drop cached geometry so the next evaluation recomputes it.
    pub fn invalidate(&mut self) {
        self.volume.invalidate();
    }

    pub fn levels(&self) -> Option<&LodTable> {
        self.lod.table()
    }

    pub fn state(&self) -> LocalityState {
        self.state
    }

    pub fn selected_level(&self) -> Option<usize> {
        self.lod.selected()
    }

    pub fn cache_state(&self) -> CacheState {
        self.volume.cache_state()
    }

    pub fn volume(&self) -> &BoundaryVolume {
        &self.volume
    }

    pub fn subscribe_state_changed(
        &mut self,
        listener: impl FnMut(LocalityState, LocalityState) + 'static,
    ) -> ListenerId {
        self.events.subscribe_state_changed(listener)
    }

    pub fn subscribe_lod_selected(
        &mut self,
        listener: impl FnMut(Option<usize>, Option<usize>) + 'static,
    ) -> ListenerId {
        self.events.subscribe_lod_selected(listener)
    }

    pub fn subscribe_all(
        &mut self,
        listener: impl FnMut(BoundaryEvent) + 'static,
    ) -> (ListenerId, ListenerId) {
        self.events.subscribe_all(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Classify this frame and decide which of `children` children to visit.
    pub fn evaluate(&mut self, children: usize, services: &FrameServices<'_>) -> Visit {
        let view_box = *self.volume.refresh(services.transform, services.instancing);
        let outcome = run_cascade(&view_box, services.locality, services.frustum);

        let (state, change) = transition(self.state, outcome);
        self.state = state;
        if let Some(change) = change {
            trace!(
                "boundary state {} -> {}",
                change.previous.as_i32(),
                change.current.as_i32()
            );
            self.events.notify_with(EventKind::StateChanged, || change.into());
        }

        match outcome {
            CascadeOutcome::OutsideOuter | CascadeOutcome::OutsideFrustum => {
                self.update_level(None);
                Visit::Skip
            }
            CascadeOutcome::OutsideInner => {
                self.update_level(None);
                Visit::All
            }
            CascadeOutcome::InsideFrustum => {
                let Some(levels) = self.lod.table().map(LodTable::len) else {
                    self.update_level(None);
                    return Visit::All;
                };
                let size = services.frustum.projected_size(&view_box);
                match self.update_level(Some(size)) {
                    None => Visit::Skip,
                    Some(_) if children <= 1 && children != levels => Visit::All,
                    Some(level) => Visit::Only(level),
                }
            }
        }
    }

    fn update_level(&mut self, size: Option<f64>) -> Option<usize> {
        if let Some(change) = self.lod.update(size) {
            trace!(
                "boundary level {} -> {}",
                level_index(change.previous),
                level_index(change.current)
            );
            self.events.notify_with(EventKind::LodSelected, || change.into());
        }
        self.lod.selected()
    }
}
