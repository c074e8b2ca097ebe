// src/queue.rs - Interactive draw-stream queue
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const DRAW_QUEUE_CAPACITY: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawEventKind {
    /// Pen down, then travel.
    Draw,
    /// Pen up, then travel.
    Lift,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawEvent {
    pub kind: DrawEventKind,
    pub x: f64,
    pub y: f64,
}

/// Fixed-capacity ring buffer feeding the cooperative draw tick. Overflow
/// drops the oldest event: live drawing favours the latest input.
pub struct DrawQueue {
    events: VecDeque<DrawEvent>,
}

impl DrawQueue {
    pub fn new() -> Self {
        Self { events: VecDeque::with_capacity(DRAW_QUEUE_CAPACITY) }
    }

    /// Non-blocking producer side.
    pub fn push(&mut self, event: DrawEvent) {
        if self.events.len() == DRAW_QUEUE_CAPACITY {
            self.events.pop_front();
            tracing::trace!("draw queue full, dropping oldest event");
        }
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<DrawEvent> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for DrawQueue {
    fn default() -> Self {
        Self::new()
    }
}
