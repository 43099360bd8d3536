// Manual Debug implementations, kept out of the hot-path modules.

use std::fmt;

use crate::Core::state::RuntimeState;
use crate::Guard::grant::GrantTable;
use crate::MSGQ::Queue::Queue::MsgQueue;

impl fmt::Debug for MsgQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MsgQueue")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("granted", &self.grants.get().is_some())
            .finish()
    }
}

impl fmt::Debug for GrantTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrantTable")
            .field("entries", &self.entries())
            .finish()
    }
}

impl fmt::Debug for RuntimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeState")
            .field("seq", &self.seq())
            .field("period_ms", &self.period_ms())
            .finish()
    }
}
