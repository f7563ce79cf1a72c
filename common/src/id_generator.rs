use crate::games::SessionRng;
use crate::identifiers::MatchCode;

pub const MATCH_CODE_LENGTH: usize = 6;

const MATCH_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub fn generate_match_code(rng: &mut SessionRng) -> MatchCode {
    let code: String = (0..MATCH_CODE_LENGTH)
        .map(|_| {
            let index = rng.random_range(0..MATCH_CODE_ALPHABET.len());
            MATCH_CODE_ALPHABET[index] as char
        })
        .collect();
    MatchCode::new(code)
}
