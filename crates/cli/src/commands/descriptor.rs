//! Node group scaling tag helpers

use anyhow::{Context, Result};
use scheduler_lib::{decode, encode, EncodedDescriptor, ScalingDescriptor, SCALING_TAG_KEY};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_json, print_table, OutputFormat};

/// Row for a decoded or encoded scaling tag
#[derive(Debug, Tabled, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct DescriptorRow {
    #[tabled(rename = "Min")]
    min_size: u32,
    #[tabled(rename = "Max")]
    max_size: u32,
    #[tabled(rename = "Desired")]
    desired_size: u32,
    #[tabled(rename = "Tag value")]
    tag_value: String,
}

impl DescriptorRow {
    fn new(descriptor: &ScalingDescriptor, encoded: &EncodedDescriptor) -> Self {
        Self {
            min_size: descriptor.min_size(),
            max_size: descriptor.max_size(),
            desired_size: descriptor.desired_size(),
            tag_value: encoded.as_str().to_string(),
        }
    }
}

fn print_row(row: DescriptorRow, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&row),
        OutputFormat::Table => {
            println!("{}", SCALING_TAG_KEY);
            print_table(vec![row]);
            Ok(())
        }
    }
}

fn encode_row(min: u32, max: u32, desired: u32) -> Result<DescriptorRow> {
    let descriptor = ScalingDescriptor::new(min, max, desired)?;
    Ok(DescriptorRow::new(&descriptor, &encode(&descriptor)))
}

fn decode_row(token: &str) -> Result<DescriptorRow> {
    let encoded = EncodedDescriptor::from_tag(token.trim());
    let descriptor = decode(&encoded).context("Not a valid scaling tag value")?;
    Ok(DescriptorRow::new(&descriptor, &encoded))
}

/// Produce the tag value a stop would record for this capacity
pub fn encode_descriptor(min: u32, max: u32, desired: u32, format: OutputFormat) -> Result<()> {
    print_row(encode_row(min, max, desired)?, format)
}

/// Show the capacity a start would restore from this tag value
pub fn decode_descriptor(token: &str, format: OutputFormat) -> Result<()> {
    print_row(decode_row(token)?, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_row() {
        let row = encode_row(1, 5, 2).unwrap();
        assert_eq!(
            row.tag_value,
            "eyJtaW5TaXplIjoxLCJtYXhTaXplIjo1LCJkZXNpcmVkU2l6ZSI6Mn0="
        );
    }

    #[test]
    fn test_encode_rejects_inconsistent_capacity() {
        assert!(encode_row(3, 2, 2).is_err());
        assert!(encode_row(1, 5, 9).is_err());
    }

    #[test]
    fn test_decode_row_accepts_surrounding_whitespace() {
        let row = decode_row(" eyJtaW5TaXplIjoxLCJtYXhTaXplIjo1LCJkZXNpcmVkU2l6ZSI6Mn0=\n").unwrap();
        assert_eq!((row.min_size, row.max_size, row.desired_size), (1, 5, 2));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_row("not-a-token").is_err());
    }
}
