//! Raw change notifications
//!
//! This module defines the loosely-typed events the reconciliation engine
//! consumes, and their translation from `notify` events.

use notify::event::{Event as NotifyEvent, EventKind, ModifyKind};
use std::fmt;
use std::path::PathBuf;

/// Coarse kind of a raw change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawEventKind {
    /// Path was reported created
    Create,
    /// Path was reported removed
    Remove,
    /// Path contents were written
    Write,
    /// Path was one end of a rename; which end is unknown
    Rename,
}

impl RawEventKind {
    /// Map a notify event kind onto a raw kind
    ///
    /// Metadata-only modifications and access events carry no content change
    /// and are dropped.
    pub fn from_notify(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::Create),
            EventKind::Remove(_) => Some(Self::Remove),
            EventKind::Modify(ModifyKind::Name(_)) => Some(Self::Rename),
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Modify(_) => Some(Self::Write),
            EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
        }
    }
}

/// A single raw change notification
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawEvent {
    /// Absolute path the event was reported for
    pub path: PathBuf,
    /// What was reported
    pub kind: RawEventKind,
}

impl RawEvent {
    /// Create a new raw event
    pub fn new(path: impl Into<PathBuf>, kind: RawEventKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self::new(path, RawEventKind::Create)
    }

    pub fn remove(path: impl Into<PathBuf>) -> Self {
        Self::new(path, RawEventKind::Remove)
    }

    pub fn write(path: impl Into<PathBuf>) -> Self {
        Self::new(path, RawEventKind::Write)
    }

    pub fn rename(path: impl Into<PathBuf>) -> Self {
        Self::new(path, RawEventKind::Rename)
    }

    /// Split a notify event into one raw event per path
    ///
    /// Rename events may carry both endpoints; they are reported separately
    /// because pairing is not reliable across platforms.
    pub fn from_notify(event: NotifyEvent) -> Vec<Self> {
        let Some(kind) = RawEventKind::from_notify(&event.kind) else {
            return Vec::new();
        };
        event
            .paths
            .into_iter()
            .map(|path| Self { path, kind })
            .collect()
    }
}

impl fmt::Display for RawEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{
        AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode,
    };

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            RawEventKind::from_notify(&EventKind::Create(CreateKind::File)),
            Some(RawEventKind::Create)
        );
        assert_eq!(
            RawEventKind::from_notify(&EventKind::Remove(RemoveKind::Any)),
            Some(RawEventKind::Remove)
        );
        assert_eq!(
            RawEventKind::from_notify(&EventKind::Modify(ModifyKind::Data(DataChange::Content))),
            Some(RawEventKind::Write)
        );
        assert_eq!(
            RawEventKind::from_notify(&EventKind::Modify(ModifyKind::Any)),
            Some(RawEventKind::Write)
        );
        assert_eq!(
            RawEventKind::from_notify(&EventKind::Modify(ModifyKind::Name(RenameMode::From))),
            Some(RawEventKind::Rename)
        );
    }

    #[test]
    fn test_noise_kinds_dropped() {
        assert_eq!(
            RawEventKind::from_notify(&EventKind::Modify(ModifyKind::Metadata(
                MetadataKind::Permissions
            ))),
            None
        );
        assert_eq!(
            RawEventKind::from_notify(&EventKind::Access(AccessKind::Any)),
            None
        );
        assert_eq!(RawEventKind::from_notify(&EventKind::Any), None);
        assert_eq!(RawEventKind::from_notify(&EventKind::Other), None);
    }

    #[test]
    fn test_rename_both_splits_paths() {
        let event = NotifyEvent::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/repo/old.txt"))
            .add_path(PathBuf::from("/repo/new.txt"));

        let raw = RawEvent::from_notify(event);
        assert_eq!(
            raw,
            vec![
                RawEvent::rename("/repo/old.txt"),
                RawEvent::rename("/repo/new.txt"),
            ]
        );
    }

    #[test]
    fn test_dropped_event_yields_nothing() {
        let event = NotifyEvent::new(EventKind::Access(AccessKind::Any))
            .add_path(PathBuf::from("/repo/a.txt"));
        assert!(RawEvent::from_notify(event).is_empty());
    }
}
