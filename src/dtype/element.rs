//! Element trait for device-transferable values

use super::Complex128;
use bytemuck::{Pod, Zeroable};

/// Trait for values that can live in a device buffer
///
/// Elements are plain-old-data so uploads and downloads are byte copies.
pub trait Element: Copy + Send + Sync + Pod + Zeroable + Default + 'static {
    /// Short type name used in kernel logs (CUDA spelling)
    const NAME: &'static str;
}

impl Element for u32 {
    const NAME: &'static str = "uint";
}

impl Element for f64 {
    const NAME: &'static str = "double";
}

impl Element for Complex128 {
    const NAME: &'static str = "double2";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element_size<T: Element>() -> usize {
        std::mem::size_of::<T>()
    }

    #[test]
    fn test_element_sizes() {
        assert_eq!(element_size::<u32>(), 4);
        assert_eq!(element_size::<f64>(), 8);
        assert_eq!(element_size::<Complex128>(), 16);
        assert_eq!(<Complex128 as Element>::NAME, "double2");
    }
}
