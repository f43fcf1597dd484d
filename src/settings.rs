//! Engine capacity constants
//!
//! Compile-time upper bounds on the bindless table and geometry pool sizes.
//! The renderer sizes its bindless descriptor arrays and shared
//! vertex/index buffers from these; shaders declare matching array bounds.

/// Fixed capacity limits for bindless resource allocation
pub struct EngineSettings;

impl EngineSettings {
    /// Maximum number of bindless textures
    pub const MAX_BINDLESS_TEXTURES: u32 = 100;
    /// Maximum number of standard materials
    pub const MAX_STANDARD_MATERIALS: u32 = 1000;
    /// Maximum number of vertices in the shared vertex buffer
    pub const MAX_VERTICES: u32 = 9_000_000;
    /// Maximum number of indices in the shared index buffer
    pub const MAX_INDICES: u32 = 27_000_000;
    /// Maximum number of base-instance table entries
    pub const MAX_BASE_INSTANCE_TABLE_ENTRIES: u32 = 14_000;
    /// Maximum number of geometry table entries
    pub const MAX_GEOMETRY_TABLE_ENTRIES: u32 = 32_000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_offsets_fit_the_u16_table_field() {
        // BaseInstanceTableEntry stores the offset as u16
        assert!(EngineSettings::MAX_GEOMETRY_TABLE_ENTRIES <= u32::from(u16::MAX));
    }

    #[test]
    fn index_capacity_covers_full_triangle_lists() {
        assert_eq!(
            EngineSettings::MAX_INDICES,
            EngineSettings::MAX_VERTICES * 3
        );
    }
}
