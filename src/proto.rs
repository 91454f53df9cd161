//! Sparkplug B protobuf wire messages (`org.eclipse.tahu.protobuf`, proto2).
//!
//! Only the scalar subset is modelled. Fields outside it (metadata,
//! properties, DataSet, Template, extensions) are skipped on decode.

/// Top-level Sparkplug B payload.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Payload {
    #[prost(uint64, optional, tag = "1")]
    pub timestamp: ::core::option::Option<u64>,
    #[prost(message, repeated, tag = "2")]
    pub metrics: ::prost::alloc::vec::Vec<payload::Metric>,
    #[prost(uint64, optional, tag = "3")]
    pub seq: ::core::option::Option<u64>,
    #[prost(string, optional, tag = "4")]
    pub uuid: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(bytes = "vec", optional, tag = "5")]
    pub body: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
}

/// Nested message and enum types in `Payload`.
pub mod payload {
    /// A single metric inside a payload.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Metric {
        #[prost(string, optional, tag = "1")]
        pub name: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(uint64, optional, tag = "2")]
        pub alias: ::core::option::Option<u64>,
        #[prost(uint64, optional, tag = "3")]
        pub timestamp: ::core::option::Option<u64>,
        #[prost(uint32, optional, tag = "4")]
        pub datatype: ::core::option::Option<u32>,
        #[prost(bool, optional, tag = "5")]
        pub is_historical: ::core::option::Option<bool>,
        #[prost(bool, optional, tag = "6")]
        pub is_transient: ::core::option::Option<bool>,
        #[prost(bool, optional, tag = "7")]
        pub is_null: ::core::option::Option<bool>,
        #[prost(oneof = "metric::Value", tags = "10, 11, 12, 13, 14, 15")]
        pub value: ::core::option::Option<metric::Value>,
    }

    /// Nested message and enum types in `Metric`.
    pub mod metric {
        /// The scalar value union.
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Value {
            #[prost(uint32, tag = "10")]
            IntValue(u32),
            #[prost(uint64, tag = "11")]
            LongValue(u64),
            #[prost(float, tag = "12")]
            FloatValue(f32),
            #[prost(double, tag = "13")]
            DoubleValue(f64),
            #[prost(bool, tag = "14")]
            BooleanValue(bool),
            #[prost(string, tag = "15")]
            StringValue(::prost::alloc::string::String),
        }
    }
}
