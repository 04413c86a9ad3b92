//! Utility functions and helpers

/// Block tag used when a bundle should be simulated on top of the newest state
pub const LATEST_BLOCK_TAG: &str = "latest";

/// Format a number as a `0x`-prefixed hex quantity
pub fn to_hex_quantity(value: u64) -> String {
    format!("0x{:x}", value)
}

/// Format a simulation state block, mapping zero to the `latest` tag
pub fn state_block_param(block: u64) -> String {
    if block == 0 {
        LATEST_BLOCK_TAG.to_string()
    } else {
        to_hex_quantity(block)
    }
}

/// Whether a state block string still needs to be replaced with `latest`
pub fn is_unset_state_block(block: &str) -> bool {
    block.is_empty() || block == "0x0"
}

/// Render a response body for diagnostics
pub fn body_to_string(body: &[u8]) -> String {
    String::from_utf8_lossy(body).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_quantity() {
        assert_eq!(to_hex_quantity(1000), "0x3e8");
        assert_eq!(to_hex_quantity(12345), "0x3039");
        assert_eq!(to_hex_quantity(0), "0x0");
    }

    #[test]
    fn test_state_block_param() {
        assert_eq!(state_block_param(0), "latest");
        assert_eq!(state_block_param(12639480), "0xc0dcf8");
        assert!(is_unset_state_block(""));
        assert!(is_unset_state_block("0x0"));
        assert!(!is_unset_state_block("latest"));
    }
}
