use std::io;
use std::marker::PhantomData;

use asynchronous_codec::{Decoder, Encoder};
pub use asynchronous_codec::{FramedRead, FramedWrite};
use bytes::BytesMut;
use prost::Message;
use unsigned_varint::codec::UviBytes;

/// Length-prefixed protobuf framing.
///
/// Messages are prefixed with their [`unsigned_varint`] encoded length and
/// encoded/decoded with [`prost`]. `In` and `Out` may differ when a stream
/// carries different message types in each direction.
pub struct Codec<In, Out = In> {
    uvi: UviBytes,
    phantom: PhantomData<(In, Out)>,
}

impl<In, Out> Codec<In, Out> {
    /// Create a new codec accepting protobuf messages up to
    /// `max_message_len_bytes` (the varint prefix is not counted against the
    /// limit).
    pub fn new(max_message_len_bytes: usize) -> Self {
        let mut uvi = UviBytes::default();
        uvi.set_max_len(max_message_len_bytes);
        Self {
            uvi,
            phantom: PhantomData,
        }
    }
}

impl<In: Message, Out> Encoder for Codec<In, Out> {
    type Item = In;
    type Error = io::Error;

    fn encode(&mut self, item: Self::Item, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let mut encoded_msg = BytesMut::with_capacity(item.encoded_len());
        item.encode(&mut encoded_msg)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        self.uvi.encode(encoded_msg.freeze(), dst)
    }
}

impl<In, Out: Message + Default> Decoder for Codec<In, Out> {
    type Item = Out;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        Ok(self
            .uvi
            .decode(src)?
            .map(|msg| Message::decode(msg))
            .transpose()?)
    }
}
