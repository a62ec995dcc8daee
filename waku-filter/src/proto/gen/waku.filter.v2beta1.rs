// @generated
/// 12/WAKU2-FILTER rfc: <https://rfc.vac.dev/spec/12/>
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FilterRequest {
    #[prost(bool, tag="1")]
    pub subscribe: bool,
    #[prost(string, tag="2")]
    pub topic: ::prost::alloc::string::String,
    #[prost(message, repeated, tag="3")]
    pub content_filters: ::prost::alloc::vec::Vec<filter_request::ContentFilter>,
}
/// Nested message and enum types in `FilterRequest`.
pub mod filter_request {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ContentFilter {
        #[prost(string, tag="1")]
        pub content_topic: ::prost::alloc::string::String,
    }
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MessagePush {
    #[prost(message, repeated, tag="1")]
    pub messages: ::prost::alloc::vec::Vec<super::super::message::v1::WakuMessage>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FilterRpc {
    #[prost(string, tag="1")]
    pub request_id: ::prost::alloc::string::String,
    #[prost(message, optional, tag="2")]
    pub request: ::core::option::Option<FilterRequest>,
    #[prost(message, optional, tag="3")]
    pub push: ::core::option::Option<MessagePush>,
}
// @@protoc_insertion_point(module)
