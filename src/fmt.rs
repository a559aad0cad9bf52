/// Format a number as an amount in the ledger currency: ₱1234.50
pub fn money(val: f64, symbol: &str) -> String {
    format!("{symbol}{val:.2}")
}

/// Human-readable file size: 512 B, 1.5 KB, 3.2 MB.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.5, "₱"), "₱1234.50");
        assert_eq!(money(0.0, "₱"), "₱0.00");
        assert_eq!(money(42.1, "$"), "$42.10");
        assert_eq!(money(-500.0, "₱"), "₱-500.00");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
