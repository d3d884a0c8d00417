//! Mathematical monospace letters (U+1D670..U+1D6A3).
//!
//! Plain-text platforms have no code styling; swapping ASCII letters for their
//! monospace look-alikes keeps code visually distinct. Everything that is not
//! an ASCII letter passes through.

const UPPER_A: u32 = 0x1D670;
const LOWER_A: u32 = 0x1D68A;

pub fn monospace(text: &str) -> String {
    text.chars().map(monospace_char).collect()
}

fn monospace_char(ch: char) -> char {
    let mapped = match ch {
        'A'..='Z' => char::from_u32(UPPER_A + (ch as u32 - 'A' as u32)),
        'a'..='z' => char::from_u32(LOWER_A + (ch as u32 - 'a' as u32)),
        _ => None,
    };
    mapped.unwrap_or(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_letters_only() {
        assert_eq!(monospace("Az 9_é"), "𝙰𝚣 9_é");
    }

    #[test]
    fn mapping_is_one_to_one() {
        let letters: String = ('a'..='z').chain('A'..='Z').collect();
        let mapped: Vec<char> = monospace(&letters).chars().collect();
        let mut unique = mapped.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 52);
        assert_eq!(mapped.len(), 52);
    }
}
