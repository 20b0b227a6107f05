use std::sync::Arc;

use arc_swap::ArcSwap;

/// Stream identifier of the telephony leg.
///
/// Written once by the telephony reader when `start` arrives, read by the AI
/// reader for every outbound audio frame. Empty until then.
#[derive(Debug, Clone)]
pub struct StreamSid(Arc<ArcSwap<String>>);

impl StreamSid {
    pub fn new() -> Self {
        Self(Arc::new(ArcSwap::from_pointee(String::new())))
    }

    pub fn set(&self, sid: impl Into<String>) {
        self.0.store(Arc::new(sid.into()));
    }

    pub fn current(&self) -> Arc<String> {
        self.0.load_full()
    }
}

impl Default for StreamSid {
    fn default() -> Self {
        Self::new()
    }
}
