use std::io;

use async_trait::async_trait;
use asynchronous_codec::{FramedRead, FramedWrite};
use futures::{AsyncRead, AsyncWrite, SinkExt, StreamExt};
use libp2p::request_response;
use libp2p::StreamProtocol;

use waku_core::common::protobuf_codec;

use crate::request::HistoryRequest;
use crate::response::HistoryResponse;
use crate::rpc::HistoryRpc;
use crate::MAX_PROTOBUF_SIZE;

/// Request/response codec for the history query protocol. Both directions
/// carry a varint-framed `HistoryRpc`.
#[derive(Clone, Default)]
pub struct WakuStoreCodec;

#[async_trait]
impl request_response::Codec for WakuStoreCodec {
    type Protocol = StreamProtocol;
    type Request = HistoryRequest;
    type Response = HistoryResponse;

    async fn read_request<T>(&mut self, _: &StreamProtocol, io: &mut T) -> io::Result<Self::Request>
    where
        T: AsyncRead + Unpin + Send,
    {
        let rpc: HistoryRpc = FramedRead::new(
            io,
            protobuf_codec::Codec::<HistoryRpc>::new(MAX_PROTOBUF_SIZE),
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
        let rpc: HistoryRpc = FramedRead::new(
            io,
            protobuf_codec::Codec::<HistoryRpc>::new(MAX_PROTOBUF_SIZE),
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
        request: HistoryRequest,
    ) -> io::Result<()>
    where
        T: AsyncWrite + Unpin + Send,
    {
        let rpc: HistoryRpc = request.into();

        let mut framed_io = FramedWrite::new(
            io,
            protobuf_codec::Codec::<HistoryRpc>::new(MAX_PROTOBUF_SIZE),
        );

        framed_io.send(rpc).await?;
        framed_io.close().await
    }

    async fn write_response<T>(
        &mut self,
        _: &StreamProtocol,
        io: &mut T,
        response: HistoryResponse,
    ) -> io::Result<()>
    where
        T: AsyncWrite + Unpin + Send,
    {
        let rpc: HistoryRpc = response.into();

        let mut framed_io = FramedWrite::new(
            io,
            protobuf_codec::Codec::<HistoryRpc>::new(MAX_PROTOBUF_SIZE),
        );

        framed_io.send(rpc).await?;
        framed_io.close().await
    }
}
