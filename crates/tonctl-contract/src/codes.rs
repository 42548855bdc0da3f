//! Embedded contract code cells.
//!
//! These are the deployed programs, fixed at their canonical bytes; the
//! derived address depends on the code hash, so they must never change.

use std::sync::Arc;

use tonctl_cell::{BagOfCells, Cell, CellResult};

const WALLET_CODE: &str = "B5EE9C724101010100530000A2FF0020DD2082014C97BA9730ED44D0D70B1FE0\
                           A4F260810200D71820D70B1FED44D0D31FD3FFD15112BAF2A122F901541044F9\
                           10F2A2F80001D31F3120D74A96D307D402FB00DED1A4C8CB1FCBFFC9ED54D0E2\
                           786F";

const BRIDGE_CODE: &str = "B5EE9C72410108010063000114FF00F4A413F4BCF2C80B01020120020302014\
                           804050244F28308D71820D31FDB3C5243BAF2A104F901541054F910F2A2F800\
                           D31F5BA402DB3C06070004D0300109A1A973B679060014ED44D0D31FD3FFFA0\
                           0D1001802C8CB1FCBFF01FA02C9ED5453758FFE";

const LOTTERY_CODE: &str = "B5EE9C7241010C0100F8000114FF00F4A413F4BCF2C80B0102012002030201\
                            4804050394F220C7009130E08308D71820D31FDB3C51A8BAF2A10AF9015410\
                            B6F910F2A206D30621C0018EA131383881012027D749BAF2A3F80006D21FD3\
                            FF3004A40810375E324144DB3CED54E30E080B090202CE06070105A12D810A\
                            00034308002D5708100C4C8CB0814CA0712CBFF01FA02CB6AC973FB008002C\
                            ED44D0D31FD3FFD31FD31FFA00FA00D21FD3FFF404D1025801C0028F23FA00\
                            302082101DCD6500A0DB3CBCF264F800546990F00304A4081037405613DB3C\
                            ED54925F0AE20A0B0008F8276F10003408C8CB1F17CBFF15CB1F13CB1F01FA\
                            0201FA02CA1FCBFFF400C9FBBDFD1B";

const EXAMPLE_CODE: &str = "B5EE9C72410108010072000114FF00F4A413F4BCF2C80B01020120020302014\
                            80405006EF28308D71820D31FED44D0D31FD3FFD15131BAF2A103F901541042\
                            F910F2A2F8005120D74A96D307D402FB00DED1A4C8CB1FCBFFC9ED540004D03\
                            002014806070017BB39CED44D0D31F31D70BFF80011B8C97ED44D0D70B1F8E9\
                            3924A9";

/// The wallet program.
pub fn wallet_code() -> CellResult<Arc<Cell>> {
    code_from_hex(WALLET_CODE)
}

/// The cross-chain bridge program.
pub fn bridge_code() -> CellResult<Arc<Cell>> {
    code_from_hex(BRIDGE_CODE)
}

/// The lottery program.
pub fn lottery_code() -> CellResult<Arc<Cell>> {
    code_from_hex(LOTTERY_CODE)
}

/// The example program.
pub fn example_code() -> CellResult<Arc<Cell>> {
    code_from_hex(EXAMPLE_CODE)
}

fn code_from_hex(boc: &str) -> CellResult<Arc<Cell>> {
    Ok(BagOfCells::deserialize_from_hex(boc)?.single_root()?.clone())
}
