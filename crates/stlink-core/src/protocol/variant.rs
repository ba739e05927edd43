//! Known probe variants
//!
//! The order of [`VARIANTS`] is the order discovery tries them in.

use std::fmt;

/// One supported probe hardware revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceVariant {
    /// USB vendor ID
    pub vendor_id: u16,
    /// USB product ID
    pub product_id: u16,
    /// Bulk OUT endpoint address
    pub out_pipe: u8,
    /// Bulk IN endpoint address
    pub in_pipe: u8,
    /// Display name
    pub name: &'static str,
}

impl DeviceVariant {
    /// Check whether a USB identification pair belongs to this variant
    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }
}

impl fmt::Display for DeviceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:04x}:{:04x})",
            self.name, self.vendor_id, self.product_id
        )
    }
}

/// ST-Link/V2
pub const STLINK_V2: DeviceVariant = DeviceVariant {
    vendor_id: 0x0483,
    product_id: 0x3748,
    out_pipe: 0x02,
    in_pipe: 0x81,
    name: "V2",
};

/// ST-Link/V2-1
pub const STLINK_V2_1: DeviceVariant = DeviceVariant {
    vendor_id: 0x0483,
    product_id: 0x374b,
    out_pipe: 0x01,
    in_pipe: 0x81,
    name: "V2-1",
};

/// All known variants in probing priority order
pub const VARIANTS: &[DeviceVariant] = &[STLINK_V2, STLINK_V2_1];

/// Look up the first registered variant with the given identification pair
pub fn find_variant(vendor_id: u16, product_id: u16) -> Option<&'static DeviceVariant> {
    VARIANTS.iter().find(|v| v.matches(vendor_id, product_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order() {
        let names: Vec<&str> = VARIANTS.iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["V2", "V2-1"]);
    }

    #[test]
    fn test_pipe_addresses() {
        assert_eq!((STLINK_V2.out_pipe, STLINK_V2.in_pipe), (0x02, 0x81));
        assert_eq!((STLINK_V2_1.out_pipe, STLINK_V2_1.in_pipe), (0x01, 0x81));
    }

    #[test]
    fn test_find_variant() {
        assert_eq!(find_variant(0x0483, 0x374b), Some(&STLINK_V2_1));
        assert_eq!(find_variant(0x0483, 0x3748), Some(&STLINK_V2));
        assert_eq!(find_variant(0x0483, 0x0000), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(STLINK_V2_1.to_string(), "V2-1 (0483:374b)");
    }
}
