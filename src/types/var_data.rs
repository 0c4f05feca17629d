//! Decoding channel values out of a sample record

use super::{BitField, VarDescriptor, Value, VariableType};
use crate::{ParseError, Result};

/// Decode one channel from a raw sample record.
///
/// Scalars become scalar values; `count > 1` becomes [`Value::Array`], except char arrays which
/// become [`Value::Text`].
pub fn decode_value(record: &[u8], descriptor: &VarDescriptor) -> Result<Value> {
    let bytes = record.get(descriptor.offset..descriptor.end()).ok_or_else(|| {
        ParseError::out_of_range(descriptor.offset as u64, descriptor.byte_len(), record.len() as u64)
    })?;

    if descriptor.var_type == VariableType::Char {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        return Ok(Value::Text(String::from_utf8_lossy(&bytes[..end]).into_owned()));
    }

    let size = descriptor.var_type.size();
    if descriptor.count == 1 {
        return Ok(decode_element(bytes, descriptor.var_type));
    }
    Ok(Value::Array(
        bytes.chunks_exact(size).map(|element| decode_element(element, descriptor.var_type)).collect(),
    ))
}

/// `element` is exactly `var_type.size()` bytes.
fn decode_element(element: &[u8], var_type: VariableType) -> Value {
    let word = |b: &[u8]| [b[0], b[1], b[2], b[3]];
    match var_type {
        VariableType::Char => Value::Text(char::from(element[0]).to_string()),
        VariableType::Bool => Value::Bool(element[0] != 0),
        VariableType::Int32 => Value::Int(i32::from_le_bytes(word(element))),
        VariableType::BitField => Value::BitField(BitField(u32::from_le_bytes(word(element)))),
        VariableType::Float32 => Value::Float(f32::from_le_bytes(word(element)) as f64),
        VariableType::Float64 => Value::Float(f64::from_le_bytes([
            element[0], element[1], element[2], element[3], element[4], element[5], element[6],
            element[7],
        ])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn descriptor(var_type: VariableType, offset: usize, count: usize) -> VarDescriptor {
        VarDescriptor {
            name: "Test".to_string(),
            var_type,
            offset,
            count,
            count_as_time: false,
            unit: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn decodes_scalars_by_tag() -> anyhow::Result<()> {
        let mut record = vec![0u8; 32];
        record[0..4].copy_from_slice(&(-7i32).to_le_bytes());
        record[4..8].copy_from_slice(&12.5f32.to_le_bytes());
        record[8..16].copy_from_slice(&1234.5678f64.to_le_bytes());
        record[16] = 1;
        record[20..24].copy_from_slice(&0x8000_0001u32.to_le_bytes());

        assert_eq!(decode_value(&record, &descriptor(VariableType::Int32, 0, 1))?, Value::Int(-7));
        assert_eq!(
            decode_value(&record, &descriptor(VariableType::Float32, 4, 1))?,
            Value::Float(12.5)
        );
        assert_eq!(
            decode_value(&record, &descriptor(VariableType::Float64, 8, 1))?,
            Value::Float(1234.5678)
        );
        assert_eq!(decode_value(&record, &descriptor(VariableType::Bool, 16, 1))?, Value::Bool(true));
        assert_eq!(
            decode_value(&record, &descriptor(VariableType::BitField, 20, 1))?,
            Value::BitField(BitField(0x8000_0001))
        );
        Ok(())
    }

    #[test]
    fn decodes_arrays_and_text() -> anyhow::Result<()> {
        let mut record = vec![0u8; 24];
        for (i, lap) in [3i32, 4, 5].iter().enumerate() {
            record[i * 4..i * 4 + 4].copy_from_slice(&lap.to_le_bytes());
        }
        record[12..16].copy_from_slice(b"abc\0");

        assert_eq!(
            decode_value(&record, &descriptor(VariableType::Int32, 0, 3))?,
            Value::Array(vec![Value::Int(3), Value::Int(4), Value::Int(5)])
        );
        assert_eq!(
            decode_value(&record, &descriptor(VariableType::Char, 12, 8))?,
            Value::Text("abc".to_string())
        );
        Ok(())
    }

    #[test]
    fn short_record_is_out_of_range() {
        let record = vec![0u8; 6];
        let err = decode_value(&record, &descriptor(VariableType::Float64, 0, 1)).unwrap_err();
        assert!(matches!(err, ParseError::OutOfRange { .. }));
    }

    proptest! {
        #[test]
        fn float32_is_promoted_exactly(value in any::<f32>().prop_filter("finite", |v| v.is_finite())) {
            let record = value.to_le_bytes().to_vec();
            let decoded = decode_value(&record, &descriptor(VariableType::Float32, 0, 1)).unwrap();
            prop_assert_eq!(decoded, Value::Float(value as f64));
        }
    }
}
