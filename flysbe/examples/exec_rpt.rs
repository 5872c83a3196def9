//! Encodes an execution report, decodes it twice and interns the symbol.
//!
//! Run with: `RUST_LOG=debug cargo run --example exec_rpt`

use flysbe::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumName)]
enum Side {
    Buy,
    Sell,
    #[sbe(name = "SELL_SHORT")]
    SellShort,
}

static SIDE: CharMeta = CharMeta::new("side", 54, 0, 10, Charset::Ascii);

const LEGS: [(&str, i64, f64); 2] = [("20191010", 100_000, 1.23), ("20191020", 120_000, 1.34)];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut buffer = AlignedBuffer::<256>::new();
    let mut encoder = ExecRptEncoder::new();
    let mut group = encoder
        .wrap_and_apply_header(buffer.as_mut_slice(), 0)?
        .symbol("AUDUSD")?
        .leg_group_start(LEGS.len() as u16)?;
    for (settl_date, quantity, price) in LEGS {
        group = group
            .next()?
            .settl_date(settl_date)?
            .quantity(quantity)?
            .price(price)?;
    }
    let payload = group.leg_group_complete()?.put("bla")?;
    tracing::info!(
        header_length = payload.header_length(),
        message_length = payload.message_length(),
        "encoded ExecRpt"
    );

    let mut decoder = ExecRptDecoder::new();
    decoder.wrap_payload(&payload)?;
    println!("{decoder}");

    let mut symbols = StringCache::new(16, 64, Charset::Ascii)?;
    for pass in 0..2 {
        let symbol: Arc<str> = decoder.symbol_decoder()?.get_with(&mut symbols)?;
        let legs: Vec<_> = decoder.legs()?.into_iter().collect();
        let text = decoder.reject_text()?.get()?;
        println!("pass {pass}: {symbol} with {} legs, rejectText={text}", legs.len());
        for leg in legs {
            println!(
                "  settlDate={} quantity={} price={}",
                leg.settl_date()?,
                leg.quantity(),
                leg.price()
            );
        }
        decoder.reset();
    }
    println!("interned symbols: {}", symbols.size());

    let mut codec = EnumNameCodec::<Side>::new();
    let mut side = [0u8; 10];
    FixedStringEncoder::attached(&SIDE, &mut side, 0).put_value(&Side::SellShort, &codec)?;
    let decoded: Option<Side> = FixedStringDecoder::attached(&SIDE, &side, 0).get_with(&mut codec)?;
    println!("side round trip: {decoded:?}");

    Ok(())
}
