// Copyright (c) 2024 Mike Tsao

//! Notifications from the editors to whatever draws them. One [EventBus] is
//! created per application session and handed to each editor; cloning it
//! yields another handle to the same bus.

use crate::types::EntityId;
use crossbeam::channel::{Receiver, Sender};
use std::{cell::RefCell, rc::Rc};
use strum_macros::Display;

/// Which editor an [EditorEvent] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[allow(missing_docs)]
pub enum EditorKind {
    Arranger,
    PianoRoll,
}

/// What the editors announce.
#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    /// The set of selected entities changed.
    SelectionChanged {
        #[allow(missing_docs)]
        editor: EditorKind,
        #[allow(missing_docs)]
        selected: Vec<EntityId>,
    },
    /// Geometry or audio state changed; redraw.
    StateChanged(EditorKind),
    /// An entry was added, or the cursor moved.
    HistoryChanged {
        #[allow(missing_docs)]
        editor: EditorKind,
        #[allow(missing_docs)]
        can_undo: bool,
        #[allow(missing_docs)]
        can_redo: bool,
    },
}

/// A broadcast bus: every subscriber gets its own unbounded channel and sees
/// every event published after it subscribed.
#[derive(Debug)]
pub struct EventBus<E: Clone> {
    subscribers: Rc<RefCell<Vec<Sender<E>>>>,
}
impl<E: Clone> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Rc::clone(&self.subscribers),
        }
    }
}
impl<E: Clone> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            subscribers: Default::default(),
        }
    }
}
impl<E: Clone> EventBus<E> {
    #[allow(missing_docs)]
    pub fn subscribe(&self) -> Receiver<E> {
        let (sender, receiver) = crossbeam::channel::unbounded();
        self.subscribers.borrow_mut().push(sender);
        receiver
    }

    /// Sends the event to every live subscriber. Subscribers that have
    /// dropped their receivers are forgotten.
    pub fn publish(&self, event: E) {
        self.subscribers
            .borrow_mut()
            .retain(|s| s.send(event.clone()).is_ok());
    }

    #[allow(missing_docs)]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Ends the session. Receivers drain what's queued and then see the
    /// channel as disconnected.
    pub fn shutdown(&self) {
        self.subscribers.borrow_mut().clear();
    }
}
