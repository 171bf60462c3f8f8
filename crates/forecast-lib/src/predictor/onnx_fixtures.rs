//! Tiny ONNX graphs for tests
//!
//! Writes ModelProto bytes directly (protobuf wire format) so the tests own
//! every weight and the expected outputs can be worked out by hand.

use crate::schema::{FEATURE_COUNT, WINDOW_LEN};
use std::path::PathBuf;
use tempfile::TempDir;

const WIRE_VARINT: u64 = 0;
const WIRE_LEN: u64 = 2;

/// `TensorProto.DataType.FLOAT`
const ONNX_FLOAT: i64 = 1;
/// `AttributeProto.AttributeType.INT`
const ATTR_INT: i64 = 2;

#[derive(Default)]
struct Message(Vec<u8>);

impl Message {
    fn varint(&mut self, mut v: u64) {
        loop {
            let byte = (v & 0x7f) as u8;
            v >>= 7;
            if v == 0 {
                self.0.push(byte);
                return;
            }
            self.0.push(byte | 0x80);
        }
    }

    fn key(&mut self, field: u64, wire: u64) {
        self.varint((field << 3) | wire);
    }

    fn int(mut self, field: u64, v: i64) -> Self {
        self.key(field, WIRE_VARINT);
        self.varint(v as u64);
        self
    }

    fn bytes(mut self, field: u64, data: &[u8]) -> Self {
        self.key(field, WIRE_LEN);
        self.varint(data.len() as u64);
        self.0.extend_from_slice(data);
        self
    }

    fn string(self, field: u64, s: &str) -> Self {
        self.bytes(field, s.as_bytes())
    }

    fn message(self, field: u64, m: Message) -> Self {
        self.bytes(field, &m.0)
    }
}

/// `ValueInfoProto` for a float tensor of fixed shape
fn value_info(name: &str, dims: &[i64]) -> Message {
    let shape = dims.iter().fold(Message::default(), |shape, &d| {
        shape.message(1, Message::default().int(1, d))
    });
    let tensor_type = Message::default().int(1, ONNX_FLOAT).message(2, shape);
    Message::default()
        .string(1, name)
        .message(2, Message::default().message(1, tensor_type))
}

/// `TensorProto` initializer with little-endian raw data
fn initializer(name: &str, dims: &[i64], data: &[f32]) -> Message {
    let raw: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
    let tensor = dims
        .iter()
        .fold(Message::default(), |t, &d| t.int(1, d));
    tensor.int(2, ONNX_FLOAT).string(8, name).bytes(9, &raw)
}

fn node(op: &str, inputs: &[&str], output: &str, attributes: Vec<Message>) -> Message {
    let node = inputs
        .iter()
        .fold(Message::default(), |n, input| n.string(1, input))
        .string(2, output)
        .string(3, &format!("{}_0", op.to_ascii_lowercase()))
        .string(4, op);
    attributes
        .into_iter()
        .fold(node, |n, attr| n.message(5, attr))
}

fn int_attribute(name: &str, value: i64) -> Message {
    Message::default()
        .string(1, name)
        .int(3, value)
        .int(20, ATTR_INT)
}

fn model(
    nodes: Vec<Message>,
    initializers: Vec<Message>,
    input: Message,
    output: Message,
) -> Vec<u8> {
    let graph = nodes
        .into_iter()
        .fold(Message::default(), |g, n| g.message(1, n))
        .string(2, "forecast_test");
    let graph = initializers
        .into_iter()
        .fold(graph, |g, t| g.message(5, t))
        .message(11, input)
        .message(12, output);
    Message::default()
        .int(1, 7)
        .message(8, Message::default().int(2, 13))
        .message(7, graph)
        .0
}

/// `y = x @ weights + bias` with `x: [1, 6]`, `weights: [6, targets]`
pub(crate) fn linear_point_model(weights: &[[f32; FEATURE_COUNT]], bias: &[f32]) -> Vec<u8> {
    let targets = bias.len();
    // Stored row-major as [features][targets]
    let w: Vec<f32> = (0..FEATURE_COUNT)
        .flat_map(|f| weights.iter().map(move |row| row[f]))
        .collect();
    model(
        vec![node("Gemm", &["x", "w", "b"], "y", vec![])],
        vec![
            initializer("w", &[FEATURE_COUNT as i64, targets as i64], &w),
            initializer("b", &[targets as i64], bias),
        ],
        value_info("x", &[1, FEATURE_COUNT as i64]),
        value_info("y", &[1, targets as i64]),
    )
}

/// Flatten `[1, 7, 6]` day-major to `[1, 42]`, then a single linear output
pub(crate) fn flatten_sequence_model(
    weights: &[[f32; FEATURE_COUNT]; WINDOW_LEN],
    bias: f32,
) -> Vec<u8> {
    let w: Vec<f32> = weights.iter().flatten().copied().collect();
    let width = (WINDOW_LEN * FEATURE_COUNT) as i64;
    model(
        vec![
            node("Flatten", &["x"], "flat", vec![int_attribute("axis", 1)]),
            node("Gemm", &["flat", "w", "b"], "y", vec![]),
        ],
        vec![
            initializer("w", &[width, 1], &w),
            initializer("b", &[1], &[bias]),
        ],
        value_info("x", &[1, WINDOW_LEN as i64, FEATURE_COUNT as i64]),
        value_info("y", &[1, 1]),
    )
}

/// One output per timestep, `[1, 7, 1]`, as a sequence-returning export gives
pub(crate) fn per_step_sequence_model(weights: &[f32; FEATURE_COUNT]) -> Vec<u8> {
    model(
        vec![node("MatMul", &["x", "w"], "y", vec![])],
        vec![initializer("w", &[FEATURE_COUNT as i64, 1], weights)],
        value_info("x", &[1, WINDOW_LEN as i64, FEATURE_COUNT as i64]),
        value_info("y", &[1, WINDOW_LEN as i64, 1]),
    )
}

pub(crate) fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
