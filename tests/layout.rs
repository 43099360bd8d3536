// Layout conformance for the fixed-size message record. The record is the
// wire format between producer and consumer, so size, alignment, and field
// offsets are pinned here; observed values are printed to aid debugging
// when a platform disagrees.

use dmxp_securecounter::MSGQ::Structs::Msg;
use memoffset::offset_of;
use std::mem::{align_of, size_of};

#[test]
fn msg_layout() {
    let size = size_of::<Msg>();
    let align = align_of::<Msg>();
    let off_seq = offset_of!(Msg, seq);
    let off_ts_ms = offset_of!(Msg, ts_ms);

    println!("Msg => size: {size}, align: {align}, offsets: [seq:{off_seq}, ts_ms:{off_ts_ms}]");

    // u32 + 4 bytes padding + i64 under repr(C)
    assert_eq!(size, 16);
    assert_eq!(align, align_of::<i64>());
    assert_eq!(off_seq, 0);
    assert_eq!(off_ts_ms, 8);
}
