//! Drag-hover state for the drop target.
//!
//! The state only drives visual feedback (the highlight ring around the frame). It is
//! independent of whether the dropped item is accepted or decodes successfully.
//!
//! ```
//! use sporen_core::drag::{DragEvent, DragHoverState, DragState};
//!
//! let mut drag = DragState::default();
//! assert_eq!(drag.handle(DragEvent::Enter), DragHoverState::Hovering);
//! assert_eq!(drag.handle(DragEvent::Over), DragHoverState::Hovering);
//! assert_eq!(drag.handle(DragEvent::Drop), DragHoverState::Idle);
//! ```

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragHoverState {
    #[default]
    Idle,
    Hovering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    Enter,
    Over,
    Leave,
    Drop,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DragState {
    hover: DragHoverState,
}

impl DragState {
    pub fn handle(&mut self, event: DragEvent) -> DragHoverState {
        self.hover = match event {
            DragEvent::Enter | DragEvent::Over => DragHoverState::Hovering,
            DragEvent::Leave | DragEvent::Drop => DragHoverState::Idle,
        };
        self.hover
    }

    pub fn hover(&self) -> DragHoverState {
        self.hover
    }

    pub fn is_hovering(&self) -> bool {
        self.hover == DragHoverState::Hovering
    }
}
