//! Default-action suppression shared between surfaces (frames, windows).
//!
//! A gesture may start in one surface and end in another, and each surface
//! runs its own event loop. When a gesture goes active every surface is told
//! to suppress the trigger button's default action; when it ends they are
//! told to stop, stamped with the time of the end. Each surface keeps
//! suppressing for [`SUPPRESSION_GRACE_MS`] after that stamp so the late
//! context menu or click that follows a release is swallowed everywhere.
//!
//! This is a timing heuristic, not a lock. A surface whose loop is stalled
//! for longer than the grace window can still see the default action, and
//! messages delivered out of order are applied as they arrive.

use serde::{Deserialize, Serialize};

pub const SUPPRESSION_GRACE_MS: u64 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum SuppressionMessage {
    Prepare,
    #[serde(rename_all = "camelCase")]
    Release { sent_at_ms: u64 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuppressionGuard {
    engaged: bool,
    release_at_ms: Option<u64>,
}

impl SuppressionGuard {
    pub fn receive(&mut self, message: SuppressionMessage) {
        match message {
            SuppressionMessage::Prepare => {
                self.engaged = true;
                self.release_at_ms = None;
            }
            SuppressionMessage::Release { sent_at_ms } => {
                if self.engaged {
                    self.release_at_ms = Some(sent_at_ms.saturating_add(SUPPRESSION_GRACE_MS));
                }
            }
        }
    }

    pub fn is_suppressing(&self, now_ms: u64) -> bool {
        self.engaged && self.release_at_ms.map_or(true, |release_at| now_ms < release_at)
    }
}
