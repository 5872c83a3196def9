//! # flysbe protocol
//!
//! Ordered message sessions built on the flysbe flyweights.
//!
//! An encoder session hands out one stage handle at a time: the fixed
//! block, then the repeating group, then the trailing variable field. Each
//! transition consumes the previous handle, and the session re-checks every
//! ordering rule at run time so a resumed stage cannot break the layout.
//!
//! The decoder mirrors this and skips forward over anything left unread
//! when a later field is requested.

pub mod exec_rpt;

pub use exec_rpt::{
    BlockEncoder, ExecRptDecoder, ExecRptEncoder, LegEntry, LegGroupDecoder, LegGroupEncoder,
    LegIter, RejectTextEncoder,
};
