/// Check the 8-bit additive checksum of an ACPI table. `bytes` should start at the table's base
/// and be exactly as long as the table's declared length. The table is valid if all of its bytes,
/// including the checksum byte itself, sum to zero modulo 256.
///
/// An empty slice is vacuously valid. [`Sdt`](crate::Sdt) never produces a view shorter than a
/// table header, so this can't make an absent table look trustworthy.
pub fn validate(bytes: &[u8]) -> bool {
    sum(bytes) == 0
}

/// The wrapping sum of every byte in `bytes`.
pub fn sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, &byte| sum.wrapping_add(byte))
}
