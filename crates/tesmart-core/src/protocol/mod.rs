//! Protocol module containing the frame layout, firmware dialects, and the codec.

pub mod codec;
pub mod dialect;
pub mod frame;

pub use codec::{
    decode_query_response, encode_query, encode_query_response, encode_select, encode_set_beeper,
    ProtocolError,
};
pub use dialect::Dialect;
pub use frame::{Frame, Opcode, FRAME_LEN};
