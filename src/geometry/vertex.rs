//! Vertex stream layout descriptors.

use serde::{Deserialize, Serialize};

/// Scalar type of one element in a vertex stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataType {
    /// 32-bit float.
    #[default]
    Float,
    /// Signed 8-bit integer.
    Byte,
    /// Unsigned 8-bit integer.
    UnsignedByte,
    /// Signed 16-bit integer.
    Short,
    /// Unsigned 16-bit integer.
    UnsignedShort,
}

impl DataType {
    /// Size of one scalar in bytes.
    pub const fn byte_size(self) -> u32 {
        match self {
            DataType::Float => 4,
            DataType::Byte | DataType::UnsignedByte => 1,
            DataType::Short | DataType::UnsignedShort => 2,
        }
    }
}

/// How a flat array of scalars is split into per-vertex attributes.
///
/// `stride` and `offset` are in bytes; a stride of zero means tightly packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BufferSpecification {
    /// Number of scalars per vertex.
    pub size: u32,
    /// Scalar type.
    pub data_type: DataType,
    /// Map integer data into 0..1 (or -1..1) when read by the shader.
    pub normalize: bool,
    /// Distance between consecutive vertices in bytes.
    pub stride: u32,
    /// Byte offset of the first vertex.
    pub offset: u32,
}

impl Default for BufferSpecification {
    fn default() -> Self {
        Self::positions()
    }
}

impl BufferSpecification {
    /// Three floats per vertex, tightly packed.
    pub const fn positions() -> Self {
        Self {
            size: 3,
            data_type: DataType::Float,
            normalize: false,
            stride: 0,
            offset: 0,
        }
    }

    /// RGB color stream, floats in 0..1.
    pub const fn colors() -> Self {
        Self::positions()
    }

    /// Two floats per vertex.
    pub const fn texture_coordinates() -> Self {
        Self {
            size: 2,
            data_type: DataType::Float,
            normalize: false,
            stride: 0,
            offset: 0,
        }
    }

    /// Byte distance between vertices, resolving a zero stride.
    pub fn byte_stride(&self) -> u32 {
        if self.stride == 0 {
            self.size * self.data_type.byte_size()
        } else {
            self.stride
        }
    }

    /// GPU vertex format for this stream, if the combination is expressible.
    pub fn vertex_format(&self) -> Option<wgpu::VertexFormat> {
        use wgpu::VertexFormat as F;

        let format = match (self.data_type, self.size, self.normalize) {
            (DataType::Float, 1, _) => F::Float32,
            (DataType::Float, 2, _) => F::Float32x2,
            (DataType::Float, 3, _) => F::Float32x3,
            (DataType::Float, 4, _) => F::Float32x4,
            (DataType::UnsignedByte, 2, true) => F::Unorm8x2,
            (DataType::UnsignedByte, 4, true) => F::Unorm8x4,
            (DataType::UnsignedByte, 2, false) => F::Uint8x2,
            (DataType::UnsignedByte, 4, false) => F::Uint8x4,
            (DataType::Byte, 2, true) => F::Snorm8x2,
            (DataType::Byte, 4, true) => F::Snorm8x4,
            (DataType::Byte, 2, false) => F::Sint8x2,
            (DataType::Byte, 4, false) => F::Sint8x4,
            (DataType::UnsignedShort, 2, true) => F::Unorm16x2,
            (DataType::UnsignedShort, 4, true) => F::Unorm16x4,
            (DataType::UnsignedShort, 2, false) => F::Uint16x2,
            (DataType::UnsignedShort, 4, false) => F::Uint16x4,
            (DataType::Short, 2, true) => F::Snorm16x2,
            (DataType::Short, 4, true) => F::Snorm16x4,
            (DataType::Short, 2, false) => F::Sint16x2,
            (DataType::Short, 4, false) => F::Sint16x4,
            _ => return None,
        };
        Some(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_stride() {
        assert_eq!(BufferSpecification::positions().byte_stride(), 12);
        assert_eq!(BufferSpecification::texture_coordinates().byte_stride(), 8);
        let padded = BufferSpecification { stride: 32, ..BufferSpecification::positions() };
        assert_eq!(padded.byte_stride(), 32);
    }

    #[test]
    fn test_vertex_format() {
        assert_eq!(
            BufferSpecification::positions().vertex_format(),
            Some(wgpu::VertexFormat::Float32x3)
        );
        let rgb_bytes = BufferSpecification {
            size: 3,
            data_type: DataType::UnsignedByte,
            normalize: true,
            stride: 0,
            offset: 0,
        };
        assert_eq!(rgb_bytes.vertex_format(), None);
        let rgba_bytes = BufferSpecification { size: 4, ..rgb_bytes };
        assert_eq!(rgba_bytes.vertex_format(), Some(wgpu::VertexFormat::Unorm8x4));
    }
}
