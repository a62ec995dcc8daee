use std::io;

use async_trait::async_trait;
use asynchronous_codec::{FramedRead, FramedWrite};
use futures::{AsyncRead, AsyncWrite, SinkExt, StreamExt};
use libp2p::request_response;
use libp2p::StreamProtocol;

use waku_core::common::protobuf_codec;

use crate::rpc::proto::waku::filter::v2beta1::FilterRpc as FilterRpcProto;
use crate::rpc::{FilterAck, FilterRpc};
use crate::MAX_PROTOBUF_SIZE;

/// Codec for the filter protocol. Requests carry either a subscription
/// change or a message push; responses are bare acknowledgements.
#[derive(Clone, Default)]
pub struct WakuFilterCodec;

#[async_trait]
impl request_response::Codec for WakuFilterCodec {
    type Protocol = StreamProtocol;
    type Request = FilterRpc;
    type Response = FilterAck;

    async fn read_request<T>(&mut self, _: &StreamProtocol, io: &mut T) -> io::Result<Self::Request>
    where
        T: AsyncRead + Unpin + Send,
    {
        let rpc: FilterRpcProto = FramedRead::new(
            io,
            protobuf_codec::Codec::<FilterRpcProto>::new(MAX_PROTOBUF_SIZE),
        )
        .next()
        .await
        .ok_or(io::Error::from(io::ErrorKind::UnexpectedEof))??;

        rpc.try_into()
    }

    async fn read_response<T>(
        &mut self,
        _: &StreamProtocol,
        io: &mut T,
    ) -> io::Result<Self::Response>
    where
        T: AsyncRead + Unpin + Send,
    {
        let rpc: FilterRpcProto = FramedRead::new(
            io,
            protobuf_codec::Codec::<FilterRpcProto>::new(MAX_PROTOBUF_SIZE),
        )
        .next()
        .await
        .ok_or(io::Error::from(io::ErrorKind::UnexpectedEof))??;

        Ok(rpc.into())
    }

    async fn write_request<T>(
        &mut self,
        _: &StreamProtocol,
        io: &mut T,
        request: FilterRpc,
    ) -> io::Result<()>
    where
        T: AsyncWrite + Unpin + Send,
    {
        let rpc: FilterRpcProto = request.into();

        let mut framed_io = FramedWrite::new(
            io,
            protobuf_codec::Codec::<FilterRpcProto>::new(MAX_PROTOBUF_SIZE),
        );

        framed_io.send(rpc).await?;
        framed_io.close().await
    }

    async fn write_response<T>(
        &mut self,
        _: &StreamProtocol,
        io: &mut T,
        response: FilterAck,
    ) -> io::Result<()>
    where
        T: AsyncWrite + Unpin + Send,
    {
        let rpc: FilterRpcProto = response.into();

        let mut framed_io = FramedWrite::new(
            io,
            protobuf_codec::Codec::<FilterRpcProto>::new(MAX_PROTOBUF_SIZE),
        );

        framed_io.send(rpc).await?;
        framed_io.close().await
    }
}
