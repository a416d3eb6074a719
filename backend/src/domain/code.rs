//! Warranty code generation.
//!
//! Codes are meant to be read aloud and typed from a receipt, so the
//! alphabet drops the visually confusable characters (no I, L, O and no
//! digits 0 or 1). Generation is pure and stateless; uniqueness is the
//! caller's job (the issue path retries against the store on collision).

use rand::Rng;

/// Restricted alphabet: uppercase A-Z minus {I, L, O} plus digits 2-9.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Codes look like `CB-XXXX-XXXX`.
pub const CODE_PREFIX: &str = "CB";
const SEGMENT_LEN: usize = 4;

/// Generate a fresh warranty code in `CB-XXXX-XXXX` format.
///
/// No uniqueness guarantee is made here; the code space (31^8) makes
/// collisions rare but the issue path still checks the store.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    let mut segment = || -> String {
        (0..SEGMENT_LEN)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    };
    format!("{}-{}-{}", CODE_PREFIX, segment(), segment())
}

/// Normalize user-entered code input: trim whitespace, uppercase.
pub fn normalize_code(input: &str) -> String {
    input.trim().to_uppercase()
}

/// Check the canonical code shape. Legacy 3-character segments are accepted
/// because early codes in the wild used them; newly generated codes always
/// use 4-character segments.
pub fn is_well_formed(code: &str) -> bool {
    let mut parts = code.split('-');
    let (prefix, s1, s2) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(p), Some(a), Some(b), None) => (p, a, b),
        _ => return false,
    };
    prefix == CODE_PREFIX && is_valid_segment(s1) && is_valid_segment(s2)
}

fn is_valid_segment(segment: &str) -> bool {
    (segment.len() == 3 || segment.len() == SEGMENT_LEN)
        && segment.bytes().all(|b| CODE_ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_format() {
        for _ in 0..200 {
            let code = generate_code();
            let parts: Vec<&str> = code.split('-').collect();
            assert_eq!(parts.len(), 3, "code should have three segments: {}", code);
            assert_eq!(parts[0], "CB");
            assert_eq!(parts[1].len(), 4);
            assert_eq!(parts[2].len(), 4);
            for b in parts[1].bytes().chain(parts[2].bytes()) {
                assert!(
                    CODE_ALPHABET.contains(&b),
                    "character {} not in alphabet for code {}",
                    b as char,
                    code
                );
            }
        }
    }

    #[test]
    fn test_generated_codes_exclude_confusable_characters() {
        for _ in 0..200 {
            let code = generate_code();
            for confusable in ['I', 'L', 'O', '0', '1'] {
                assert!(
                    !code[3..].contains(confusable),
                    "code {} contains confusable character {}",
                    code,
                    confusable
                );
            }
        }
    }

    #[test]
    fn test_generated_codes_are_mostly_distinct() {
        let codes: std::collections::HashSet<String> = (0..500).map(|_| generate_code()).collect();
        // 31^8 possibilities; 500 draws colliding would indicate a broken RNG
        assert_eq!(codes.len(), 500);
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  cb-k9m3-p2qr "), "CB-K9M3-P2QR");
    }

    #[test]
    fn test_well_formedness() {
        assert!(is_well_formed("CB-K9M3-P2QR"));
        // legacy 3-character segments
        assert!(is_well_formed("CB-K9M-P2Q"));
        assert!(!is_well_formed("CB-K9M3"));
        assert!(!is_well_formed("XX-K9M3-P2QR"));
        // I, L, O, 0, 1 are not in the alphabet
        assert!(!is_well_formed("CB-K1M3-P2QR"));
        assert!(!is_well_formed("CB-KIM3-P2QR"));
        assert!(!is_well_formed("cb-k9m3-p2qr"));
    }

    #[test]
    fn test_alphabet_size() {
        assert_eq!(CODE_ALPHABET.len(), 31);
    }
}
