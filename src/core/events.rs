//! AI event queue
//!
//! Double-buffered queue of things the AI decided during a tick, for
//! animation, audio and UI collaborators that should not be coupled to the
//! guard controllers.
//!
//! # Example
//!
//! ```ignore
//! simulation.tick(dt, &physics, &player);
//!
//! // Events from the previous tick
//! for event in simulation.events().iter() {
//!     if let AiEvent::StateChanged { guard, to: GuardState::Chase, .. } = event {
//!         play_alarm(*guard);
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec2;

use crate::ai::{GuardId, GuardState};
use crate::perception::BodyId;

// ============================================================================
// Event Types
// ============================================================================

/// Something the AI did that other systems may react to
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AiEvent {
    /// A guard committed a state change.
    StateChanged {
        guard: GuardId,
        from: GuardState,
        to: GuardState,
    },

    /// A camera spotted the player and alerted nearby guards.
    CameraAlert {
        /// The camera's body
        camera: BodyId,
        /// Where the player was seen
        position: Vec2,
        /// Guards that were in alert range
        guards_alerted: usize,
    },

    /// A distraction was emitted.
    Distraction {
        position: Vec2,
        priority: u8,
        /// Guards that took it
        accepted: usize,
    },

    /// No path to the target; the guard headed straight for it.
    PathFallback { guard: GuardId, target: Vec2 },

    /// A guard's body is missing from the physics world.
    BodyMissing { guard: GuardId, body: BodyId },
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue.
///
/// Events pushed during tick N are readable during tick N+1.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this tick
    pending: VecDeque<AiEvent>,
    /// Events from the previous tick, ready for processing
    processing: VecDeque<AiEvent>,
}

impl EventQueue {
    const DEFAULT_CAPACITY: usize = 64;

    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
            processing: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
        }
    }

    /// Queue an event for the next tick
    #[inline]
    pub fn push(&mut self, event: AiEvent) {
        self.pending.push_back(event);
    }

    /// Make this tick's events readable and start a fresh pending buffer.
    ///
    /// Called once at the start of every simulation tick.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Events from the previous tick
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &AiEvent> {
        self.processing.iter()
    }

    /// Take the events from the previous tick
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = AiEvent> + '_ {
        self.processing.drain(..)
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
