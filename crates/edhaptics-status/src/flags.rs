//! The ship status flag word, bit by bit.
//!
//! The order of this table is the emission order of the differ: fixed and
//! deterministic regardless of which bits changed. Field names follow the
//! spelling the rest of the event vocabulary uses (including the historical
//! `SrvHandbreak`/`SrvTurrent` spellings that existing settings files carry).

/// Ordered `(bit mask, field name)` pairs for the status flag word.
pub const STATUS_FLAG_FIELDS: &[(u64, &str)] = &[
    (1 << 0, "Docked"),
    (1 << 1, "Landed"),
    (1 << 2, "Gear"),
    (1 << 3, "Shields"),
    (1 << 4, "Supercruise"),
    (1 << 5, "FlightAssist"),
    (1 << 6, "Hardpoints"),
    (1 << 7, "Winging"),
    (1 << 8, "Lights"),
    (1 << 9, "CargoScoop"),
    (1 << 10, "SilentRunning"),
    (1 << 11, "Scooping"),
    (1 << 12, "SrvHandbreak"),
    (1 << 13, "SrvTurrent"),
    (1 << 14, "SrvNearShip"),
    (1 << 15, "SrvDriveAssist"),
    (1 << 16, "MassLocked"),
    (1 << 17, "FsdCharging"),
    (1 << 18, "FsdCooldown"),
    (1 << 19, "LowFuel"),
    (1 << 20, "Overheating"),
    (1 << 21, "HasLatLong"),
    (1 << 22, "InDanger"),
    (1 << 23, "InInterdiction"),
    (1 << 24, "InMothership"),
    (1 << 25, "InFighter"),
    (1 << 26, "InSrv"),
    (1 << 27, "AnalysisMode"),
    (1 << 28, "NightVision"),
    (1 << 29, "AltitudeFromAverageRadius"),
    (1 << 30, "FsdJump"),
    (1 << 31, "SrvHighBeam"),
];

/// Fields excluded from snapshot-derived emission by default.
///
/// Docking and landing transitions arrive through dedicated one-shot journal
/// events with richer payloads; emitting them here as well would double-fire.
pub const DEFAULT_SUPPRESSED_FIELDS: &[&str] = &["Docked", "Landed"];

/// Look up the bit mask for a field name (case-insensitive). Test helper and
/// diagnostic convenience; the differ itself walks the table in order.
pub fn mask_for_field(field: &str) -> Option<u64> {
    STATUS_FLAG_FIELDS
        .iter()
        .find(|(_, name)| name.eq_ignore_ascii_case(field))
        .map(|(mask, _)| *mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_masks_are_unique_single_bits() {
        let mut seen = 0u64;
        for (mask, _) in STATUS_FLAG_FIELDS {
            assert_eq!(mask.count_ones(), 1);
            assert_eq!(seen & mask, 0, "duplicate mask {mask:#x}");
            seen |= mask;
        }
    }

    #[test]
    fn test_mask_for_field() {
        assert_eq!(mask_for_field("Gear"), Some(1 << 2));
        assert_eq!(mask_for_field("gear"), Some(1 << 2));
        assert_eq!(mask_for_field("NotAField"), None);
    }

    #[test]
    fn test_suppressed_fields_exist_in_table() {
        for field in DEFAULT_SUPPRESSED_FIELDS {
            assert!(mask_for_field(field).is_some());
        }
    }
}
