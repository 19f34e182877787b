//! The subset of TensorFlow's `Event` protobuf needed to read scalars.
//!
//! Field tags follow `tensorflow/core/util/event.proto` and
//! `tensorflow/core/framework/summary.proto`. Fields we never read are left
//! out; prost skips unknown fields when decoding.

/// `DataType` values for the numeric dtypes a scalar tensor may carry.
pub const DT_FLOAT: i32 = 1;
pub const DT_DOUBLE: i32 = 2;
pub const DT_INT32: i32 = 3;
pub const DT_INT64: i32 = 9;

/// Plugin name TensorBoard attaches to tensor-encoded scalars.
pub const SCALARS_PLUGIN: &str = "scalars";

#[derive(Clone, PartialEq, prost::Message)]
pub struct Event {
    #[prost(double, tag = "1")]
    pub wall_time: f64,
    #[prost(int64, tag = "2")]
    pub step: i64,
    #[prost(string, optional, tag = "3")]
    pub file_version: Option<String>,
    #[prost(message, optional, tag = "5")]
    pub summary: Option<Summary>,
    #[prost(message, optional, tag = "7")]
    pub session_log: Option<SessionLog>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Summary {
    #[prost(message, repeated, tag = "1")]
    pub value: Vec<SummaryValue>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SummaryValue {
    #[prost(string, tag = "1")]
    pub tag: String,
    #[prost(float, optional, tag = "2")]
    pub simple_value: Option<f32>,
    #[prost(message, optional, tag = "8")]
    pub tensor: Option<TensorProto>,
    #[prost(message, optional, tag = "9")]
    pub metadata: Option<SummaryMetadata>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SummaryMetadata {
    #[prost(message, optional, tag = "1")]
    pub plugin_data: Option<PluginData>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct PluginData {
    #[prost(string, tag = "1")]
    pub plugin_name: String,
    #[prost(bytes = "vec", tag = "2")]
    pub content: Vec<u8>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TensorProto {
    #[prost(int32, tag = "1")]
    pub dtype: i32,
    #[prost(message, optional, tag = "2")]
    pub tensor_shape: Option<TensorShapeProto>,
    #[prost(bytes = "vec", tag = "4")]
    pub tensor_content: Vec<u8>,
    #[prost(float, repeated, tag = "5")]
    pub float_val: Vec<f32>,
    #[prost(double, repeated, tag = "6")]
    pub double_val: Vec<f64>,
    #[prost(int32, repeated, tag = "7")]
    pub int_val: Vec<i32>,
    #[prost(int64, repeated, tag = "10")]
    pub int64_val: Vec<i64>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TensorShapeProto {
    #[prost(message, repeated, tag = "2")]
    pub dim: Vec<TensorShapeDim>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TensorShapeDim {
    #[prost(int64, tag = "1")]
    pub size: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SessionLog {
    #[prost(enumeration = "SessionStatus", tag = "1")]
    pub status: i32,
    #[prost(string, tag = "2")]
    pub checkpoint_path: String,
    #[prost(string, tag = "3")]
    pub msg: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum SessionStatus {
    StatusUnspecified = 0,
    Start = 1,
    Stop = 2,
    Checkpoint = 3,
}

impl SummaryValue {
    /// The scalar carried by this value, if it is one.
    ///
    /// `simple_value` is what PyTorch's `SummaryWriter.add_scalar` writes.
    /// Newer TensorFlow writers emit a rank-0 tensor tagged with the
    /// `scalars` plugin instead.
    pub fn scalar(&self) -> Option<f64> {
        if let Some(v) = self.simple_value {
            return Some(f64::from(v));
        }

        let tensor = self.tensor.as_ref()?;
        let plugin = self
            .metadata
            .as_ref()
            .and_then(|m| m.plugin_data.as_ref())
            .map(|p| p.plugin_name.as_str());

        if plugin == Some(SCALARS_PLUGIN) || tensor.is_rank_zero() {
            tensor.first_value()
        } else {
            None
        }
    }
}

impl TensorProto {
    fn is_rank_zero(&self) -> bool {
        self.tensor_shape
            .as_ref()
            .map_or(true, |shape| shape.dim.is_empty())
    }

    /// First element as `f64`, read from the typed field or the packed bytes.
    fn first_value(&self) -> Option<f64> {
        let content = self.tensor_content.as_slice();
        match self.dtype {
            DT_FLOAT => self
                .float_val
                .first()
                .map(|&v| f64::from(v))
                .or_else(|| le_bytes::<4>(content).map(|b| f64::from(f32::from_le_bytes(b)))),
            DT_DOUBLE => self
                .double_val
                .first()
                .copied()
                .or_else(|| le_bytes::<8>(content).map(f64::from_le_bytes)),
            DT_INT32 => self
                .int_val
                .first()
                .map(|&v| f64::from(v))
                .or_else(|| le_bytes::<4>(content).map(|b| f64::from(i32::from_le_bytes(b)))),
            DT_INT64 => self
                .int64_val
                .first()
                .map(|&v| v as f64)
                .or_else(|| le_bytes::<8>(content).map(|b| i64::from_le_bytes(b) as f64)),
            _ => None,
        }
    }
}

fn le_bytes<const N: usize>(content: &[u8]) -> Option<[u8; N]> {
    content.get(..N)?.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tensor_value(tensor: TensorProto, plugin: Option<&str>) -> SummaryValue {
        SummaryValue {
            tag: "t".into(),
            simple_value: None,
            tensor: Some(tensor),
            metadata: plugin.map(|name| SummaryMetadata {
                plugin_data: Some(PluginData {
                    plugin_name: name.into(),
                    content: vec![],
                }),
            }),
        }
    }

    #[test]
    fn simple_value_wins() {
        let value = SummaryValue {
            tag: "loss".into(),
            simple_value: Some(0.25),
            tensor: None,
            metadata: None,
        };
        assert_eq!(value.scalar(), Some(0.25));
    }

    #[test]
    fn float_tensor_from_typed_field() {
        let tensor = TensorProto {
            dtype: DT_FLOAT,
            float_val: vec![1.5],
            ..Default::default()
        };
        assert_eq!(tensor_value(tensor, Some(SCALARS_PLUGIN)).scalar(), Some(1.5));
    }

    #[test]
    fn double_tensor_from_packed_content() {
        let tensor = TensorProto {
            dtype: DT_DOUBLE,
            tensor_content: 2.75f64.to_le_bytes().to_vec(),
            ..Default::default()
        };
        assert_eq!(tensor_value(tensor, None).scalar(), Some(2.75));
    }

    #[test]
    fn non_scalar_tensor_without_plugin_is_ignored() {
        let tensor = TensorProto {
            dtype: DT_FLOAT,
            tensor_shape: Some(TensorShapeProto {
                dim: vec![TensorShapeDim { size: 3 }],
            }),
            float_val: vec![1.0, 2.0, 3.0],
            ..Default::default()
        };
        assert_eq!(tensor_value(tensor, Some("histograms")).scalar(), None);
    }

    #[test]
    fn string_tensor_is_ignored() {
        let tensor = TensorProto {
            dtype: 7,
            ..Default::default()
        };
        assert_eq!(tensor_value(tensor, Some(SCALARS_PLUGIN)).scalar(), None);
    }
}
