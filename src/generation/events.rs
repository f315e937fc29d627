//! # Generation Events
//!
//! Progress notifications emitted while a level is generated. Callers register
//! observers on the generator; closures work directly as observers.

use crate::{Position, Rect};
use serde::{Deserialize, Serialize};

/// Something that happened during a generation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GenerationEvent {
    /// A room was accepted into a section (section-local bounds)
    RoomAccepted {
        grid_x: u32,
        grid_y: u32,
        room: Rect,
    },
    /// A section finished its local pipeline
    SectionGenerated {
        grid_x: u32,
        grid_y: u32,
        rooms: usize,
        attempts: u32,
    },
    /// Two neighbouring sections were stitched together
    SectionsConnected {
        from: (u32, u32),
        to: (u32, u32),
        welded_to_room: bool,
    },
    /// Connectivity repair finished
    ConnectivityRepaired {
        components_connected: usize,
        cells_carved: usize,
        cells_pruned: usize,
    },
    /// The spawn tile was chosen
    SpawnChosen { position: Position, score: u32 },
    /// The level is complete
    LevelGenerated {
        width: u32,
        height: u32,
        rooms: usize,
        entities: usize,
    },
}

/// Receives [`GenerationEvent`]s.
pub trait GenerationObserver: Send + Sync {
    fn on_event(&self, event: &GenerationEvent);
}

impl<F> GenerationObserver for F
where
    F: Fn(&GenerationEvent) + Send + Sync,
{
    fn on_event(&self, event: &GenerationEvent) {
        self(event)
    }
}

/// Ordered list of registered observers.
#[derive(Default)]
pub struct ObserverList {
    observers: Vec<Box<dyn GenerationObserver>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer. Observers are notified in registration order.
    pub fn register(&mut self, observer: impl GenerationObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Sends an event to every observer.
    pub fn emit(&self, event: GenerationEvent) {
        log::trace!("Generation event: {:?}", event);
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.observers.len())
            .finish()
    }
}
