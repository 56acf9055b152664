//! Job description messages
//!
//! Hand-declared `prost` messages describing a training job: its operators,
//! their placement and the declared logical blob descriptors.

use std::collections::BTreeMap;

/// Element type of a logical blob
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum DataType {
    Invalid = 0,
    Char = 1,
    Float = 2,
    Double = 3,
    Int8 = 4,
    Int32 = 5,
    Int64 = 6,
    Uint8 = 7,
    Float16 = 9,
}

/// Repeated string wrapper used as a map value
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListString {
    #[prost(string, repeated, tag = "1")]
    pub s: Vec<String>,
}

/// Declared shape and element type of one logical blob
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlobDescProto {
    #[prost(int64, repeated, tag = "1")]
    pub shape: Vec<i64>,
    #[prost(enumeration = "DataType", tag = "2")]
    pub data_type: i32,
}

/// Placement descriptor: which devices run an operator
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct ParallelConf {
    #[prost(string, tag = "1")]
    pub device_tag: String,
    #[prost(string, repeated, tag = "2")]
    pub device_name: Vec<String>,
}

/// Registry-backed user operator
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserOpConf {
    #[prost(string, tag = "1")]
    pub op_type_name: String,
    /// Input argument name → bound logical blob names
    #[prost(btree_map = "string, message", tag = "2")]
    pub input: BTreeMap<String, ListString>,
    /// Output argument name → produced logical blob names
    #[prost(btree_map = "string, message", tag = "3")]
    pub output: BTreeMap<String, ListString>,
}

/// Job input placeholder
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InputOpConf {
    #[prost(string, tag = "1")]
    pub out: String,
    #[prost(message, optional, tag = "2")]
    pub blob_conf: Option<BlobDescProto>,
}

/// Trainable variable
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VariableOpConf {
    #[prost(string, tag = "1")]
    pub out: String,
    #[prost(int64, repeated, tag = "2")]
    pub shape: Vec<i64>,
    #[prost(enumeration = "DataType", tag = "3")]
    pub data_type: i32,
}

/// One operator of the job
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OperatorConf {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(oneof = "operator_conf::OpType", tags = "2, 3, 4")]
    pub op_type: Option<operator_conf::OpType>,
}

/// Nested types for [`OperatorConf`]
pub mod operator_conf {
    /// Operator kind
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum OpType {
        #[prost(message, tag = "2")]
        UserConf(super::UserOpConf),
        #[prost(message, tag = "3")]
        InputConf(super::InputOpConf),
        #[prost(message, tag = "4")]
        VariableConf(super::VariableOpConf),
    }
}

/// Operators sharing one placement
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PlacementGroup {
    #[prost(string, repeated, tag = "1")]
    pub op_name: Vec<String>,
    #[prost(message, optional, tag = "2")]
    pub parallel_conf: Option<ParallelConf>,
}

/// A complete job
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct JobProto {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(enumeration = "DataType", tag = "2")]
    pub default_data_type: i32,
    #[prost(message, repeated, tag = "3")]
    pub op: Vec<OperatorConf>,
    #[prost(message, repeated, tag = "4")]
    pub placement: Vec<PlacementGroup>,
    /// Logical blob name → declared descriptor
    #[prost(btree_map = "string, message", tag = "5")]
    pub logical_blob_desc: BTreeMap<String, BlobDescProto>,
}
