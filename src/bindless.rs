//! Bindless geometry and instance table records
//!
//! In bindless rendering the shader receives an instance id, a geometry id,
//! and a primitive id. Geometry information is resolved as:
//!
//! ```text
//! geometry_table[base_instance_table[instance_id].geometry_entry_offset + geometry_id]
//! ```
//!
//! `base_instance_table[0] == 0` always holds, which lets a shader skip one
//! dependent fetch for the first instance.
//!
//! These records are a shared contract with shader code: field order and
//! widths are fixed and must not change.

use bytemuck::{Pod, Zeroable};

/// One geometry's offsets into the bindless vertex/index/material arrays
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct GeometryTableEntry {
    /// First vertex of this geometry in the shared vertex array
    pub vertex_base_idx: u32,
    /// First index of this geometry in the shared index array
    pub index_base_idx: u32,
    /// Material assigned to this geometry
    pub material_idx: u32,
    /// Explicit padding to a 16-byte stride
    pub padding: u32,
}

impl GeometryTableEntry {
    /// Create an entry; padding is always zero
    pub fn new(vertex_base_idx: u32, index_base_idx: u32, material_idx: u32) -> Self {
        Self {
            vertex_base_idx,
            index_base_idx,
            material_idx,
            padding: 0,
        }
    }
}

/// Per-instance offset into the geometry table
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct BaseInstanceTableEntry {
    /// Offset added to a per-draw geometry id to locate the geometry entry
    pub geometry_entry_offset: u16,
}

/// Resolve the flattened geometry-table index for an (instance, geometry) key
pub fn geometry_entry_index(entry: BaseInstanceTableEntry, geometry_id: u32) -> u32 {
    u32::from(entry.geometry_entry_offset) + geometry_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn geometry_entry_is_16_bytes_in_declared_order() {
        assert_eq!(size_of::<GeometryTableEntry>(), 16);

        let entry = GeometryTableEntry::new(0x1111_1111, 0x2222_2222, 0x3333_3333);
        let bytes: &[u8] = bytemuck::bytes_of(&entry);
        assert_eq!(&bytes[0..4], &0x1111_1111u32.to_ne_bytes());
        assert_eq!(&bytes[4..8], &0x2222_2222u32.to_ne_bytes());
        assert_eq!(&bytes[8..12], &0x3333_3333u32.to_ne_bytes());
        assert_eq!(&bytes[12..16], &[0, 0, 0, 0]);
    }

    #[test]
    fn base_instance_entry_is_2_bytes() {
        assert_eq!(size_of::<BaseInstanceTableEntry>(), 2);

        let entry = BaseInstanceTableEntry {
            geometry_entry_offset: 0xABCD,
        };
        let bytes: &[u8] = bytemuck::bytes_of(&entry);
        assert_eq!(bytes, &0xABCDu16.to_ne_bytes());
    }

    #[test]
    fn indexing_adds_offset_to_geometry_id() {
        let entry = BaseInstanceTableEntry {
            geometry_entry_offset: 100,
        };
        assert_eq!(geometry_entry_index(entry, 0), 100);
        assert_eq!(geometry_entry_index(entry, 7), 107);

        // first instance always has offset zero
        let first = BaseInstanceTableEntry::zeroed();
        assert_eq!(geometry_entry_index(first, 7), 7);
    }

    #[test]
    fn tables_upload_as_raw_bytes() {
        let table = [
            GeometryTableEntry::new(0, 0, 0),
            GeometryTableEntry::new(300, 900, 2),
        ];
        let bytes: &[u8] = bytemuck::cast_slice(&table);
        assert_eq!(bytes.len(), 32);
    }
}
