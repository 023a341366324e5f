//! dBase III attribute table (`.dbf`) headers.
//!
//! Only the header and field descriptors are decoded; attribute values are
//! carried through as raw bytes.

use crate::ShapefileError;

const DESCRIPTOR_LEN: usize = 32;
const TERMINATOR: u8 = 0x0D;
const END_OF_FILE: u8 = 0x1A;

/// A field descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbfField {
    pub name: String,
    /// dBase type code: `C` character, `N` numeric, `F` float, `L` logical, `D` date.
    pub kind: char,
    pub length: u8,
    pub decimals: u8,
}

impl DbfField {
    pub fn character(name: &str, length: u8) -> Self {
        Self {
            name: name.to_string(),
            kind: 'C',
            length,
            decimals: 0,
        }
    }

    pub fn numeric(name: &str, length: u8, decimals: u8) -> Self {
        Self {
            name: name.to_string(),
            kind: 'N',
            length,
            decimals,
        }
    }
}

/// Decoded table header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbfHeader {
    pub record_count: usize,
    pub header_len: usize,
    pub record_len: usize,
    pub fields: Vec<DbfField>,
}

impl DbfHeader {
    pub fn parse(data: &[u8]) -> Result<Self, ShapefileError> {
        if data.len() < DESCRIPTOR_LEN + 1 {
            return Err(ShapefileError::Truncated(
                "attribute table header".to_string(),
            ));
        }

        let record_count = u32::from_le_bytes([data[4], data[5], data[6], data[7]]) as usize;
        let header_len = u16::from_le_bytes([data[8], data[9]]) as usize;
        let record_len = u16::from_le_bytes([data[10], data[11]]) as usize;

        if header_len < DESCRIPTOR_LEN + 1 || header_len > data.len() {
            return Err(ShapefileError::InvalidFormat(format!(
                "attribute table header length {}",
                header_len
            )));
        }

        let mut fields = Vec::new();
        let mut at = DESCRIPTOR_LEN;
        while at + DESCRIPTOR_LEN <= header_len && data[at] != TERMINATOR {
            let raw = &data[at..at + DESCRIPTOR_LEN];
            let name_end = raw[..11].iter().position(|&b| b == 0).unwrap_or(11);
            fields.push(DbfField {
                name: String::from_utf8_lossy(&raw[..name_end]).into_owned(),
                kind: raw[11] as char,
                length: raw[16],
                decimals: raw[17],
            });
            at += DESCRIPTOR_LEN;
        }

        let declared: usize = 1 + fields.iter().map(|f| f.length as usize).sum::<usize>();
        if declared != record_len {
            return Err(ShapefileError::InvalidFormat(format!(
                "attribute record length {} does not match fields ({})",
                record_len, declared
            )));
        }

        let needed = header_len + record_count * record_len;
        if data.len() < needed {
            return Err(ShapefileError::Truncated(format!(
                "attribute table needs {} bytes, has {}",
                needed,
                data.len()
            )));
        }

        Ok(Self {
            record_count,
            header_len,
            record_len,
            fields,
        })
    }
}

/// Encode a table with the given fields and string-valued records.
///
/// Values are padded or truncated to the field width; numeric fields are
/// right-aligned as dBase expects.
pub fn write_dbf(fields: &[DbfField], records: &[Vec<String>]) -> Vec<u8> {
    let header_len = DESCRIPTOR_LEN + fields.len() * DESCRIPTOR_LEN + 1;
    let record_len = 1 + fields.iter().map(|f| f.length as usize).sum::<usize>();

    let mut out = Vec::with_capacity(header_len + records.len() * record_len + 1);
    out.push(0x03);
    out.extend_from_slice(&[124, 1, 1]); // last update, YY-1900 MM DD
    out.extend_from_slice(&(records.len() as u32).to_le_bytes());
    out.extend_from_slice(&(header_len as u16).to_le_bytes());
    out.extend_from_slice(&(record_len as u16).to_le_bytes());
    out.extend_from_slice(&[0u8; 20]);

    for field in fields {
        let mut descriptor = [0u8; DESCRIPTOR_LEN];
        let name = field.name.as_bytes();
        let n = name.len().min(10);
        descriptor[..n].copy_from_slice(&name[..n]);
        descriptor[11] = field.kind as u8;
        descriptor[16] = field.length;
        descriptor[17] = field.decimals;
        out.extend_from_slice(&descriptor);
    }
    out.push(TERMINATOR);

    for record in records {
        out.push(b' ');
        for (i, field) in fields.iter().enumerate() {
            let value = record.get(i).map(String::as_str).unwrap_or("");
            let width = field.length as usize;
            let value: String = value.chars().take(width).collect();
            let padded = if field.kind == 'N' || field.kind == 'F' {
                format!("{:>width$}", value, width = width)
            } else {
                format!("{:<width$}", value, width = width)
            };
            out.extend_from_slice(&padded.as_bytes()[..width]);
        }
    }
    out.push(END_OF_FILE);
    out
}
