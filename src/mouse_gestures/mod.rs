pub mod capture;
pub mod clock;
pub mod constructor;
pub mod db;
pub mod matcher;
pub mod pattern;
pub mod service;
pub mod suppression;

pub use capture::{
    CaptureMachine, CaptureNotification, CaptureState, InputEvent, ModifierKey, Modifiers,
    PointerButton, PointerEvent, PointerSample, Transition,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use constructor::PatternConstructor;
pub use db::{load_gestures, save_gestures, CommandRef, GestureDb, GestureRecord};
pub use matcher::{
    best_match, closest_gesture, rank_candidates, similarity, GestureMatch, MatchKind,
    MatchingAlgorithm,
};
pub use pattern::{direction_difference, Pattern, PatternError, PointSample, Vector2};
pub use service::{
    GestureEvent, GestureEventSink, GestureService, InputBackend, MockInputBackend, MockInputHandle,
};
pub use suppression::{SuppressionGuard, SuppressionMessage, SUPPRESSION_GRACE_MS};
