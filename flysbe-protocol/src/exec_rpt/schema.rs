//! Schema constants of the `ExecRpt` message.

use flysbe_core::meta::{CharMeta, Presence, VarCharMeta};
use flysbe_core::Charset;

/// Schema ID.
pub const SCHEMA_ID: u16 = 1;
/// Schema version.
pub const SCHEMA_VERSION: u16 = 0;
/// Template ID.
pub const TEMPLATE_ID: u16 = 1;
/// Root block length.
pub const BLOCK_LENGTH: u16 = 8;

/// Instrument symbol, first field of the root block.
pub static SYMBOL: CharMeta = CharMeta::new("symbol", 1, 0, 8, Charset::Ascii)
    .presence(Presence::Required)
    .semantic_type("String");

/// Repeating group ID of the legs.
pub const LEGS_ID: u16 = 2;
/// Block length of one leg entry.
pub const LEG_BLOCK_LENGTH: u16 = 24;

/// Settlement date of a leg.
pub static SETTL_DATE: CharMeta = CharMeta::new("settlDate", 3, 0, 8, Charset::Ascii)
    .semantic_type("LocalMktDate");

/// Field ID of a leg quantity.
pub const QUANTITY_ID: u16 = 4;
/// Offset of a leg quantity (i64).
pub const QUANTITY_OFFSET: usize = 8;

/// Field ID of a leg price.
pub const PRICE_ID: u16 = 6;
/// Offset of a leg price (f64).
pub const PRICE_OFFSET: usize = 16;

/// Trailing free text.
pub static REJECT_TEXT: VarCharMeta =
    VarCharMeta::new("rejectText", 5, Charset::Ascii).description("reason for a rejection");
