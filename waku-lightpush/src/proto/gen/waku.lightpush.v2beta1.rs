// @generated
/// 19/WAKU2-LIGHTPUSH rfc: <https://rfc.vac.dev/spec/19/>
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PushRequest {
    #[prost(string, tag="1")]
    pub pubsub_topic: ::prost::alloc::string::String,
    #[prost(message, optional, tag="2")]
    pub message: ::core::option::Option<super::super::message::v1::WakuMessage>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PushResponse {
    #[prost(bool, tag="1")]
    pub is_success: bool,
    #[prost(string, tag="2")]
    pub info: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PushRpc {
    #[prost(string, tag="1")]
    pub request_id: ::prost::alloc::string::String,
    #[prost(message, optional, tag="2")]
    pub request: ::core::option::Option<PushRequest>,
    #[prost(message, optional, tag="3")]
    pub response: ::core::option::Option<PushResponse>,
}
// @@protoc_insertion_point(module)
