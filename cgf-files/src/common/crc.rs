// CRC-32 (IEEE 802.3, reflected), the flavour the engine uses for controller ids.

const CRC_POLYNOMIAL: u32 = 0xEDB8_8320;
const CRC_TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ CRC_POLYNOMIAL
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

pub fn crc32(data: &[u8]) -> u32 {
    let crc = data.iter().fold(!0u32, |crc, &byte| {
        CRC_TABLE[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8)
    });
    !crc
}

/// Hashes the ASCII-lowercased string, so `Bip01` and `bip01` share a controller id.
pub fn crc32_lowercase(text: &str) -> u32 {
    crc32(text.to_ascii_lowercase().as_bytes())
}
