use crate::frame::Frame;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// One repaint of the animated layer.
    Repaint,
    /// A reload was dispatched for a new selection.
    ReloadDispatched,
    /// A reload's result was rendered.
    ReloadApplied,
    /// A reload's result resolved after a newer dispatch and was dropped.
    StaleDiscarded,
    /// The dataset could not be loaded.
    LoadFailed,
    /// An autoplay control fired.
    AutoplayTick,
}

/// Event recorded for traceability; `frame_index` is the last host frame seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub frame_index: u64,
    pub kind: EventKind,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, frame_index: u64, kind: EventKind, message: impl Into<String>) {
        self.events.push(Event {
            frame_index,
            kind,
            message: message.into(),
        });
    }

    pub fn emit_in(&mut self, frame: Frame, kind: EventKind, message: impl Into<String>) {
        self.emit(frame.index, kind, message);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
