//! Shared inputs for the benchmarks.

use flysbe_core::Result;
use flysbe_protocol::ExecRptEncoder;

/// Symbols used to populate fixed-field buffers.
pub const SYMBOLS: [&str; 8] = [
    "AUDUSD", "EURUSD", "GBPUSD", "USDJPY", "USDCHF", "NZDUSD", "USDCAD", "EURGBP",
];

/// Width of the fixed symbol field.
pub const SYMBOL_LENGTH: usize = 8;

/// Packs `count` NUL-padded symbols back to back, cycling through
/// [`SYMBOLS`].
#[must_use]
pub fn symbol_block(count: usize) -> Vec<u8> {
    let mut block = vec![0u8; count * SYMBOL_LENGTH];
    for (slot, symbol) in block
        .chunks_exact_mut(SYMBOL_LENGTH)
        .zip(SYMBOLS.iter().cycle())
    {
        slot[..symbol.len()].copy_from_slice(symbol.as_bytes());
    }
    block
}

/// Encodes an `ExecRpt` with `legs` identical legs and a header through
/// `encoder`, returning the total length written.
///
/// # Errors
/// Returns the encoder's error, typically a buffer that is too short.
pub fn encode_exec_rpt(
    encoder: &mut ExecRptEncoder,
    buffer: &mut [u8],
    legs: u16,
) -> Result<usize> {
    let mut group = encoder
        .wrap_and_apply_header(buffer, 0)?
        .symbol("AUDUSD")?
        .leg_group_start(legs)?;
    for _ in 0..legs {
        group = group
            .next()?
            .settl_date("20191010")?
            .quantity(100_000)?
            .price(1.23)?;
    }
    let payload = group.leg_group_complete()?.put("rejected")?;
    Ok(payload.total_length())
}
