//! `ExecRpt` execution report.
//!
//! # Wire Format
//! ```text
//! [MessageHeader, 8 bytes, optional]
//! +0:  symbol        char[8], ASCII
//! legs group:        u16 blockLength (24) + u16 numInGroup
//!   +0:  settlDate   char[8], ASCII
//!   +8:  quantity    i64
//!   +16: price       f64
//! rejectText:        u32 length + ASCII bytes
//! ```

pub mod decoder;
pub mod encoder;
pub mod schema;

pub use decoder::{ExecRptDecoder, LegEntry, LegGroupDecoder, LegIter};
pub use encoder::{BlockEncoder, ExecRptEncoder, LegGroupEncoder, RejectTextEncoder};
