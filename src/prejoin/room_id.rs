const ROOM_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a short shareable room id of the form `xxxx-xxxx`
pub fn generate_room_id() -> String {
    // Bytes 6 and 8 carry the uuid version/variant bits; skip them.
    let bytes = uuid::Uuid::new_v4().into_bytes();
    let pick = |b: u8| ROOM_ID_ALPHABET[b as usize % ROOM_ID_ALPHABET.len()] as char;

    let head: String = bytes[0..4].iter().map(|&b| pick(b)).collect();
    let tail: String = bytes[10..14].iter().map(|&b| pick(b)).collect();

    format!("{}-{}", head, tail)
}
