//! Capability interfaces for external collaborators
//!
//! The duplicate-canonicalization core hands images off to two kinds of
//! collaborators it never looks inside: classifiers (which produce the
//! category folders this tool excludes from its walks) and interactive
//! name providers (used by the face-sorting surface). Both are modeled as
//! traits so the core can be composed with real implementations without
//! depending on them.

use crate::core::error::Result;
use crossbeam_channel::Receiver;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// An opaque label-producing function over image bytes.
///
/// Labels come from a closed set owned by the implementation; confidence is
/// in `[0, 1]`. The core never inspects or depends on the internals.
pub trait Classifier {
    fn classify(&self, image_bytes: &[u8]) -> Result<(String, f32)>;
}

/// Provides a human-chosen name for an image, with a bounded wait.
///
/// Implementations that fail to answer within `timeout` must yield a
/// deterministic default name rather than blocking forever.
pub trait NameResolver {
    fn resolve_name(&self, image: &Path, timeout: Duration) -> String;
}

/// Name resolver backed by a channel of replies (e.g. fed by a prompt on
/// another thread). A missing, late, or blank reply falls back to a
/// deterministic counter-based default name.
pub struct ChannelNameResolver {
    replies: Receiver<String>,
    default_prefix: String,
    counter: AtomicUsize,
}

impl ChannelNameResolver {
    pub fn new(replies: Receiver<String>) -> Self {
        Self {
            replies,
            default_prefix: "Face".to_string(),
            counter: AtomicUsize::new(0),
        }
    }

    pub fn with_default_prefix(mut self, prefix: &str) -> Self {
        self.default_prefix = prefix.to_string();
        self
    }

    fn default_name(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", self.default_prefix, n)
    }
}

impl NameResolver for ChannelNameResolver {
    fn resolve_name(&self, _image: &Path, timeout: Duration) -> String {
        match self.replies.recv_timeout(timeout) {
            Ok(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => self.default_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::path::PathBuf;

    #[test]
    fn test_reply_is_used_when_present() {
        let (tx, rx) = unbounded();
        tx.send("  Alice ".to_string()).unwrap();

        let resolver = ChannelNameResolver::new(rx);
        let name = resolver.resolve_name(&PathBuf::from("face.jpg"), Duration::from_millis(50));
        assert_eq!(name, "Alice");
    }

    #[test]
    fn test_timeout_falls_back_to_counter_default() {
        let (_tx, rx) = unbounded::<String>();
        let resolver = ChannelNameResolver::new(rx);

        let first = resolver.resolve_name(&PathBuf::from("a.jpg"), Duration::from_millis(10));
        let second = resolver.resolve_name(&PathBuf::from("b.jpg"), Duration::from_millis(10));
        assert_eq!(first, "Face1");
        assert_eq!(second, "Face2");
    }

    #[test]
    fn test_blank_reply_falls_back() {
        let (tx, rx) = unbounded();
        tx.send("   ".to_string()).unwrap();

        let resolver = ChannelNameResolver::new(rx).with_default_prefix("Person");
        let name = resolver.resolve_name(&PathBuf::from("face.jpg"), Duration::from_millis(50));
        assert_eq!(name, "Person1");
    }
}
