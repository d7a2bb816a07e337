use wire::model::VolumeTarget;

/// User intents produced by the front end. The state store validates,
/// optionally mutates local state optimistically, and turns these into
/// wire commands.
#[derive(Debug, Clone)]
pub enum Action {
    SetUsername { name: String },
    /// Result of the external credential gate; a UI affordance only
    Elevate { granted: bool },
    AddSong { url: String },
    RemoveSong { id: u64 },
    /// Begin a drag gesture on a queue row
    GrabRow { id: u64 },
    /// Hover a drop candidate while dragging
    HoverRow { id: u64 },
    /// Commit the drag gesture
    DropRow,
    /// Abandon the drag gesture. Pointer front ends issue this on
    /// drag-leave; the bundled line CLI commits its gestures atomically.
    CancelDrag,
    Skip,
    Stop,
    Pause,
    Resume,
    ToggleLoop,
    ToggleMic,
    /// The user started interacting with a volume control
    GrabVolume { target: VolumeTarget },
    SetVolume { target: VolumeTarget, value: i64 },
    /// The user let go of a volume control
    ReleaseVolume { target: VolumeTarget },
    JoinMeet { link: String },
    LeaveMeet,
    Exit,
}
