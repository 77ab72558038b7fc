//! Change notifications emitted by a boundary node.
//!
//! Listeners are kept in one typed list per event kind, so the per-frame
//! path only builds a payload when someone is subscribed to that kind.

use super::classify::{LocalityState, StateTransition};
use super::lod::{level_index, LevelTransition};

/// A notification delivered to listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryEvent {
    /// `state-changed`
    StateChanged {
        previous: LocalityState,
        current: LocalityState,
    },
    /// `lod-selected`; `None` means no level is selected.
    LodSelected {
        previous: Option<usize>,
        current: Option<usize>,
    },
}

impl BoundaryEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BoundaryEvent::StateChanged { .. } => EventKind::StateChanged,
            BoundaryEvent::LodSelected { .. } => EventKind::LodSelected,
        }
    }

    /// Payload as (old, new) integers: states 0..=4, levels -1..n-1.
    pub fn as_ints(&self) -> (i32, i32) {
        match *self {
            BoundaryEvent::StateChanged { previous, current } => {
                (previous.as_i32(), current.as_i32())
            }
            BoundaryEvent::LodSelected { previous, current } => {
                (level_index(previous), level_index(current))
            }
        }
    }
}

impl From<StateTransition> for BoundaryEvent {
    fn from(t: StateTransition) -> Self {
        BoundaryEvent::StateChanged {
            previous: t.previous,
            current: t.current,
        }
    }
}

impl From<LevelTransition> for BoundaryEvent {
    fn from(t: LevelTransition) -> Self {
        BoundaryEvent::LodSelected {
            previous: t.previous,
            current: t.current,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    StateChanged,
    LodSelected,
}

impl EventKind {
    /// Wire name of the event.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::StateChanged => "state-changed",
            EventKind::LodSelected => "lod-selected",
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type StateListener = Box<dyn FnMut(LocalityState, LocalityState)>;
type LevelListener = Box<dyn FnMut(Option<usize>, Option<usize>)>;

#[derive(Default)]
pub struct EventNotifier {
    state_listeners: Vec<(ListenerId, StateListener)>,
    level_listeners: Vec<(ListenerId, LevelListener)>,
    next_id: u64,
}

impl EventNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn subscribe_state_changed(
        &mut self,
        listener: impl FnMut(LocalityState, LocalityState) + 'static,
    ) -> ListenerId {
        let id = self.alloc_id();
        self.state_listeners.push((id, Box::new(listener)));
        id
    }

    pub fn subscribe_lod_selected(
        &mut self,
        listener: impl FnMut(Option<usize>, Option<usize>) + 'static,
    ) -> ListenerId {
        let id = self.alloc_id();
        self.level_listeners.push((id, Box::new(listener)));
        id
    }

    /// Subscribe one closure to both kinds as tagged events.
    pub fn subscribe_all(
        &mut self,
        listener: impl FnMut(BoundaryEvent) + 'static,
    ) -> (ListenerId, ListenerId) {
        let shared = std::rc::Rc::new(std::cell::RefCell::new(listener));
        let for_levels = shared.clone();
        let state_id = self.subscribe_state_changed(move |previous, current| {
            let mut listener = shared.borrow_mut();
            (*listener)(BoundaryEvent::StateChanged { previous, current })
        });
        let level_id = self.subscribe_lod_selected(move |previous, current| {
            let mut listener = for_levels.borrow_mut();
            (*listener)(BoundaryEvent::LodSelected { previous, current })
        });
        (state_id, level_id)
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.state_listeners.len() + self.level_listeners.len();
        self.state_listeners.retain(|(lid, _)| *lid != id);
        self.level_listeners.retain(|(lid, _)| *lid != id);
        before != self.state_listeners.len() + self.level_listeners.len()
    }

    pub fn has_listeners(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::StateChanged => !self.state_listeners.is_empty(),
            EventKind::LodSelected => !self.level_listeners.is_empty(),
        }
    }

    /// Deliver an event to the listeners of its kind.
    pub fn notify(&mut self, event: BoundaryEvent) {
        match event {
            BoundaryEvent::StateChanged { previous, current } => {
                for (_, listener) in &mut self.state_listeners {
                    listener(previous, current);
                }
            }
            BoundaryEvent::LodSelected { previous, current } => {
                for (_, listener) in &mut self.level_listeners {
                    listener(previous, current);
                }
            }
        }
    }

    /// Deliver an event built on demand; `make` is not called when nobody
    /// listens to `kind`.
    pub fn notify_with(&mut self, kind: EventKind, make: impl FnOnce() -> BoundaryEvent) {
        if self.has_listeners(kind) {
            self.notify(make());
        }
    }
}

impl std::fmt::Debug for EventNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventNotifier")
            .field("state_listeners", &self.state_listeners.len())
            .field("level_listeners", &self.level_listeners.len())
            .finish()
    }
}
