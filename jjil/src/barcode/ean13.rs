//! EAN-13 check digits and module patterns.
//!
//! A symbol is 95 modules: start guard, six left digits, centre guard, six
//! right digits, end guard. `true` is a dark bar. The first digit is not drawn;
//! it selects the L/G parity pattern of the left half.

use crate::error::{Error, Result};

pub const MODULES: usize = 95;
pub const DIGITS: usize = 13;

const STAGE: &str = "ean13";
const DIGIT_MODULES: usize = 7;
const START: [bool; 3] = [true, false, true];
const CENTRE: [bool; 5] = [false, true, false, true, false];

/// Odd-parity left-half codes, most significant bit first.
const L_CODES: [u8; 10] = [
    0b0001101, 0b0011001, 0b0010011, 0b0111101, 0b0100011, 0b0110001, 0b0101111, 0b0111011,
    0b0110111, 0b0001011,
];

/// Even-parity left-half codes: the right code read backwards.
const G_CODES: [u8; 10] = [
    0b0100111, 0b0110011, 0b0011011, 0b0100001, 0b0011101, 0b0111001, 0b0000101, 0b0010001,
    0b0001001, 0b0010111,
];

/// Right-half codes: the complement of the left code.
const R_CODES: [u8; 10] = [
    0b1110010, 0b1100110, 0b1101100, 0b1000010, 0b1011100, 0b1001110, 0b1010000, 0b1000100,
    0b1001000, 0b1110100,
];

/// Left-half parity per first digit; bit 5 is the second digit, set means G.
const PARITY: [u8; 10] = [
    0b000000, 0b001011, 0b001101, 0b001110, 0b010011, 0b011001, 0b011100, 0b010101, 0b010110,
    0b011010,
];

/// Check digit of the first twelve digits (each 0..=9).
pub fn check_digit(digits: &[u8; 12]) -> u8 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| d as u32 * if i % 2 == 0 { 1 } else { 3 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

/// True when `code` is thirteen ASCII digits ending in the right check digit.
pub fn verify_check_digit(code: &str) -> bool {
    let Some(digits) = parse_digits(code) else {
        return false;
    };
    if digits.len() != DIGITS {
        return false;
    }
    let mut head = [0u8; 12];
    head.copy_from_slice(&digits[..12]);
    check_digit(&head) == digits[12]
}

/// Module pattern of a twelve digit code, or of a thirteen digit code whose
/// check digit is verified.
pub fn encode(code: &str) -> Result<[bool; MODULES]> {
    let digits = parse_digits(code)
        .filter(|d| d.len() == DIGITS - 1 || d.len() == DIGITS)
        .ok_or_else(|| Error::parameter(STAGE, "code", format!("'{code}' is not 12 or 13 digits")))?;

    let mut head = [0u8; 12];
    head.copy_from_slice(&digits[..12]);
    let check = check_digit(&head);
    if digits.len() == DIGITS && digits[12] != check {
        return Err(Error::parameter(
            STAGE,
            "check digit",
            format!("'{code}' ends in {}, expected {check}", digits[12]),
        ));
    }

    let mut modules = [false; MODULES];
    let mut writer = ModuleWriter::new(&mut modules);
    writer.put_guard(&START);
    let parity = PARITY[head[0] as usize];
    for (i, &d) in head[1..7].iter().enumerate() {
        let g = parity & (1 << (5 - i)) != 0;
        writer.put_code(if g { G_CODES[d as usize] } else { L_CODES[d as usize] });
    }
    writer.put_guard(&CENTRE);
    for &d in head[7..].iter().chain(std::iter::once(&check)) {
        writer.put_code(R_CODES[d as usize]);
    }
    writer.put_guard(&START);

    Ok(modules)
}

/// Reads the thirteen digits back from a module pattern.
pub fn decode(modules: &[bool; MODULES]) -> Result<String> {
    let guards = [(0, &START[..]), (45, &CENTRE[..]), (92, &START[..])];
    for (at, guard) in guards {
        if &modules[at..at + guard.len()] != guard {
            return Err(Error::parameter(STAGE, "guard", format!("bad guard at module {at}")));
        }
    }

    let code_at = |i: usize| -> u8 {
        modules[i..i + DIGIT_MODULES]
            .iter()
            .fold(0u8, |acc, &m| (acc << 1) | m as u8)
    };
    let unknown = |at: usize| Error::parameter(STAGE, "digit", format!("unknown code at module {at}"));

    let mut digits = [0u8; DIGITS];
    let mut parity = 0u8;
    for i in 0..6 {
        let at = START.len() + i * DIGIT_MODULES;
        let code = code_at(at);
        let (digit, g) = match find(&L_CODES, code) {
            Some(d) => (d, false),
            None => (find(&G_CODES, code).ok_or_else(|| unknown(at))?, true),
        };
        digits[i + 1] = digit;
        parity |= (g as u8) << (5 - i);
    }
    digits[0] = find(&PARITY, parity)
        .ok_or_else(|| Error::parameter(STAGE, "parity", format!("{parity:06b}")))?;

    for i in 0..6 {
        let at = 50 + i * DIGIT_MODULES;
        digits[i + 7] = find(&R_CODES, code_at(at)).ok_or_else(|| unknown(at))?;
    }

    let text: String = digits.iter().map(|&d| char::from(b'0' + d)).collect();
    if !verify_check_digit(&text) {
        return Err(Error::parameter(STAGE, "check digit", text));
    }
    Ok(text)
}

fn find(table: &[u8; 10], code: u8) -> Option<u8> {
    table.iter().position(|&c| c == code).map(|d| d as u8)
}

fn parse_digits(code: &str) -> Option<Vec<u8>> {
    code.bytes()
        .map(|b| b.is_ascii_digit().then(|| b - b'0'))
        .collect()
}

struct ModuleWriter<'a> {
    modules: &'a mut [bool; MODULES],
    next: usize,
}

impl<'a> ModuleWriter<'a> {
    fn new(modules: &'a mut [bool; MODULES]) -> Self {
        Self { modules, next: 0 }
    }

    fn put_guard(&mut self, guard: &[bool]) {
        self.modules[self.next..self.next + guard.len()].copy_from_slice(guard);
        self.next += guard.len();
    }

    fn put_code(&mut self, code: u8) {
        for bit in (0..DIGIT_MODULES).rev() {
            self.modules[self.next] = code & (1 << bit) != 0;
            self.next += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(modules: &[bool]) -> String {
        modules.iter().map(|&m| if m { '1' } else { '0' }).collect()
    }

    #[test]
    fn known_codes_verify() {
        assert!(verify_check_digit("4006381333931"));
        assert!(verify_check_digit("5901234123457"));
        assert!(!verify_check_digit("4006381333932"));
        assert!(!verify_check_digit("400638133393"));
        assert!(!verify_check_digit("40063813339a1"));
    }

    #[test]
    fn check_digit_of_prefix() {
        assert_eq!(check_digit(&[4, 0, 0, 6, 3, 8, 1, 3, 3, 3, 9, 3]), 1);
        assert_eq!(check_digit(&[0; 12]), 0);
    }

    #[test]
    fn encodes_reference_symbol() {
        let modules = encode("5901234123457").unwrap();
        let bars = render(&modules);
        assert_eq!(bars.len(), MODULES);
        assert!(bars.starts_with("101"));
        assert!(bars.ends_with("101"));
        assert_eq!(&bars[45..50], "01010");
        // first digit 5 gives LGGLLG, so the second digit 9 uses its L code
        assert_eq!(&bars[3..10], "0001011");
        // third digit 0 uses its G code
        assert_eq!(&bars[10..17], "0100111");
        // last right digit is the check digit 7
        assert_eq!(&bars[85..92], "1000100");
    }

    #[test]
    fn twelve_digits_get_their_check_digit() {
        assert_eq!(encode("400638133393").unwrap(), encode("4006381333931").unwrap());
    }

    #[test]
    fn decode_reverses_encode() {
        for code in ["4006381333931", "5901234123457", "0000000000000", "9780306406157"] {
            assert_eq!(decode(&encode(code).unwrap()).unwrap(), code);
        }
    }

    #[test]
    fn rejects_bad_input() {
        assert!(encode("4006381333932").is_err());
        assert!(encode("12345").is_err());
        assert!(encode("40063813339x").is_err());

        let mut modules = encode("4006381333931").unwrap();
        modules[46] = !modules[46];
        assert!(decode(&modules).is_err());

        let mut modules = encode("4006381333931").unwrap();
        modules[55] = !modules[55];
        assert!(decode(&modules).is_err());
    }
}
