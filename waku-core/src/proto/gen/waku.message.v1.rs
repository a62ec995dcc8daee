// @generated
/// 14/WAKU2-MESSAGE rfc: <https://rfc.vac.dev/spec/14/>
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WakuMessage {
    #[prost(bytes="bytes", tag="1")]
    pub payload: ::prost::bytes::Bytes,
    #[prost(string, tag="2")]
    pub content_topic: ::prost::alloc::string::String,
    #[prost(uint32, tag="3")]
    pub version: u32,
    #[prost(sint64, tag="10")]
    pub timestamp: i64,
    #[prost(bytes="bytes", optional, tag="11")]
    pub meta: ::core::option::Option<::prost::bytes::Bytes>,
    #[prost(bool, optional, tag="31")]
    pub ephemeral: ::core::option::Option<bool>,
}
// @@protoc_insertion_point(module)
