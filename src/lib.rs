//! Privilege-separated producer/consumer pipeline with capability-gated
//! bounded message queues.
//!
//! A trusted periodic producer (timer fire -> deferred work -> non-blocking
//! enqueue) feeds sequence-numbered messages to a consumer running in an
//! isolated domain. A second, deliberately ungranted queue exists so the
//! `attack` command can demonstrate that cross-privilege access terminates
//! the violating domain instead of degrading into an error return.
//!
//! Entry points: [`Pipeline::SystemBuilder`] wires the whole system up;
//! [`Control::CommandRouter`] is the administrative surface.

// Module naming follows project convention (MSGQ = bounded message queue layer)
#[allow(non_snake_case)]
pub mod MSGQ {
    pub mod Queue {
        pub mod Queue;
        pub mod Queue_impl;
        pub use Queue::{MsgQueue, Slot}; // re-export for stable path
    }
    pub mod Structs {
        pub mod Queue_Structs;
        pub use Queue_Structs::{ChannelId, Msg}; // re-export for stable path
    }
}
#[allow(non_snake_case)]
pub mod Core {
    pub mod futex;
    pub mod state;
    pub use state::{uptime_ms, RuntimeState};
}
#[allow(non_snake_case)]
pub mod Guard {
    pub mod domain;
    pub mod grant;
    pub use domain::{
        create_domain, current_domain, enter_domain, spawn_in_domain, DomainFault, DomainId,
    };
    pub use grant::{GrantTable, GrantTableBuilder};
}
#[allow(non_snake_case)]
pub mod Pipeline {
    pub mod builder;
    pub mod consumer;
    pub mod timer;
    pub mod worker;
    pub use builder::{System, SystemBuilder};
    pub use consumer::ConsumerTask;
}
#[allow(non_snake_case)]
pub mod Control {
    pub mod command;
    pub mod router;
    pub use command::ConsoleError;
    pub use router::{CommandHandler, CommandRouter};
}
#[allow(non_snake_case)]
pub mod Debug {
    pub mod StructDebug;
}
