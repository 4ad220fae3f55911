//! Wire protocol for Golf Rush.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`PlayerView`],
//!   [`RoomView`], [`RoomSummary`]) travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) turns them into text
//!   frames and back.
//! - **Errors** ([`ProtocolError`]) cover encoding and decoding.
//!
//! The protocol layer knows nothing about sockets or rooms:
//!
//! ```text
//! Transport (frames) → Protocol (events) → Room (state machine)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ClientEvent, PlayerId, PlayerStatus, PlayerView, Position, RoomStatus, RoomSummary,
    RoomView, ServerEvent,
};
