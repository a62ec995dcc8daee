use std::io;

use async_trait::async_trait;
use asynchronous_codec::{FramedRead, FramedWrite};
use futures::{AsyncRead, AsyncWrite, SinkExt, StreamExt};
use libp2p::request_response;
use libp2p::StreamProtocol;

use waku_core::common::protobuf_codec;

use crate::rpc::proto::waku::lightpush::v2beta1::PushRpc as PushRpcProto;
use crate::rpc::{PushRequest, PushResponse};
use crate::MAX_PROTOBUF_SIZE;

/// Codec for the lightpush protocol: a push request one way, a success/
/// reason verdict back.
#[derive(Clone, Default)]
pub struct WakuLightPushCodec;

#[async_trait]
impl request_response::Codec for WakuLightPushCodec {
    type Protocol = StreamProtocol;
    type Request = PushRequest;
    type Response = PushResponse;

    async fn read_request<T>(&mut self, _: &StreamProtocol, io: &mut T) -> io::Result<Self::Request>
    where
        T: AsyncRead + Unpin + Send,
    {
        let rpc: PushRpcProto = FramedRead::new(
            io,
            protobuf_codec::Codec::<PushRpcProto>::new(MAX_PROTOBUF_SIZE),
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
        let rpc: PushRpcProto = FramedRead::new(
            io,
            protobuf_codec::Codec::<PushRpcProto>::new(MAX_PROTOBUF_SIZE),
        )
        .next()
        .await
        .ok_or(io::Error::from(io::ErrorKind::UnexpectedEof))??;

        rpc.try_into()
    }

    async fn write_request<T>(
        &mut self,
        _: &StreamProtocol,
        io: &mut T,
        request: PushRequest,
    ) -> io::Result<()>
    where
        T: AsyncWrite + Unpin + Send,
    {
        let rpc: PushRpcProto = request.into();

        let mut framed_io = FramedWrite::new(
            io,
            protobuf_codec::Codec::<PushRpcProto>::new(MAX_PROTOBUF_SIZE),
        );

        framed_io.send(rpc).await?;
        framed_io.close().await
    }

    async fn write_response<T>(
        &mut self,
        _: &StreamProtocol,
        io: &mut T,
        response: PushResponse,
    ) -> io::Result<()>
    where
        T: AsyncWrite + Unpin + Send,
    {
        let rpc: PushRpcProto = response.into();

        let mut framed_io = FramedWrite::new(
            io,
            protobuf_codec::Codec::<PushRpcProto>::new(MAX_PROTOBUF_SIZE),
        );

        framed_io.send(rpc).await?;
        framed_io.close().await
    }
}
