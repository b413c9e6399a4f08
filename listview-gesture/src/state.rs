/// Progress of a touch gesture, from first contact to the end of the settle animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TouchState {
    #[default]
    Idle,
    /// Touching a scroll edge; no drag sample yet.
    Armed,
    /// Dragging; the indicator is revealed.
    Tracking,
    /// Released past the threshold; the callback is outstanding.
    Triggered,
    /// Animating back to the rest position.
    Settling,
}

/// Which strategy a gesture drives. At most one is active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum GestureKind {
    /// Drag past the trailing edge to request more items.
    Loading,
    /// Pull past the leading edge to refresh.
    Refreshing,
}

impl GestureKind {
    /// Direction of the viewport translation along the main axis.
    pub fn sign(self) -> f32 {
        match self {
            Self::Loading => -1.0,
            Self::Refreshing => 1.0,
        }
    }
}
