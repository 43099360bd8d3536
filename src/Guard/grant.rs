//! The access-grant table: which isolated domain may touch which queue.

use std::sync::Arc;

use crate::Guard::domain::DomainId;
use crate::MSGQ::Structs::Queue_Structs::ChannelId;

/// Immutable (domain, channel) access relation.
///
/// Built once by the trusted boot path and sealed before any isolated
/// domain runs; no API adds or revokes entries afterwards. The protection
/// layer consults this table beneath every queue operation. Trusted
/// context (threads in no domain) is not subject to it.
pub struct GrantTable {
    entries: Vec<(DomainId, ChannelId)>,
}

impl GrantTable {
    pub fn builder() -> GrantTableBuilder {
        GrantTableBuilder {
            entries: Vec::new(),
        }
    }

    pub fn allows(&self, domain: DomainId, channel: ChannelId) -> bool {
        self.entries
            .iter()
            .any(|&(d, c)| d == domain && c == channel)
    }

    pub(crate) fn entries(&self) -> &[(DomainId, ChannelId)] {
        &self.entries
    }
}

/// Accumulates grants, then seals them. `seal` consumes the builder, so
/// the relation cannot grow once the table exists.
pub struct GrantTableBuilder {
    entries: Vec<(DomainId, ChannelId)>,
}

impl GrantTableBuilder {
    pub fn allow(mut self, domain: DomainId, channel: ChannelId) -> Self {
        if !self.entries.contains(&(domain, channel)) {
            self.entries.push((domain, channel));
        }
        self
    }

    pub fn seal(self) -> Arc<GrantTable> {
        Arc::new(GrantTable {
            entries: self.entries,
        })
    }
}
