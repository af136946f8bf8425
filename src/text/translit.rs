use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Direction {
    ToLatin,
    ToCyrillic,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Cyrillic,
    Latin,
    Mixed,
    None,
}

const RU_TO_LATIN: &[(char, &str)] = &[
    ('а', "a"), ('б', "b"), ('в', "v"), ('г', "g"), ('д', "d"), ('е', "e"),
    ('ё', "e"), ('ж', "zh"), ('з', "z"), ('и', "i"), ('й', "i"), ('к', "k"),
    ('л', "l"), ('м', "m"), ('н', "n"), ('о', "o"), ('п', "p"), ('р', "r"),
    ('с', "s"), ('т', "t"), ('у', "u"), ('ф', "f"), ('х', "h"), ('ц', "ts"),
    ('ч', "ch"), ('ш', "sh"), ('щ', "sch"), ('ъ', ""), ('ы', "y"), ('ь', ""),
    ('э', "e"), ('ю', "yu"), ('я', "ya"),
];

// Longest chunks first; greedy matching relies on this order.
const LATIN_TO_RU: &[(&str, &str)] = &[
    ("shch", "щ"), ("sch", "щ"),
    ("zh", "ж"), ("ts", "ц"), ("ch", "ч"), ("sh", "ш"), ("kh", "х"),
    ("yu", "ю"), ("ya", "я"), ("yo", "е"), ("ph", "ф"),
    ("a", "а"), ("b", "б"), ("c", "к"), ("d", "д"), ("e", "е"), ("f", "ф"),
    ("g", "г"), ("h", "х"), ("i", "и"), ("j", "дж"), ("k", "к"), ("l", "л"),
    ("m", "м"), ("n", "н"), ("o", "о"), ("p", "п"), ("q", "к"), ("r", "р"),
    ("s", "с"), ("t", "т"), ("u", "у"), ("v", "в"), ("w", "в"), ("x", "кс"),
    ("y", "ы"), ("z", "з"),
];

lazy_static! {
    static ref RU_TO_LATIN_MAP: std::collections::HashMap<char, &'static str> =
        RU_TO_LATIN.iter().copied().collect();
}

pub fn is_cyrillic(c: char) -> bool {
    matches!(c, '\u{0400}'..='\u{04FF}')
}

pub fn detect_script(text: &str) -> Script {
    let mut cyrillic = false;
    let mut latin = false;
    for c in text.chars() {
        if is_cyrillic(c) {
            cyrillic = true;
        } else if c.is_ascii_alphabetic() {
            latin = true;
        }
    }
    match (cyrillic, latin) {
        (true, true) => Script::Mixed,
        (true, false) => Script::Cyrillic,
        (false, true) => Script::Latin,
        (false, false) => Script::None,
    }
}


pub fn transliterate(text: &str, direction: Direction) -> String {
    match direction {
        Direction::ToLatin => to_latin(text),
        Direction::ToCyrillic => to_cyrillic(text),
    }
}

fn to_latin(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if is_cyrillic(c) {
            let lower = c.to_lowercase().next().unwrap_or(c);
            match RU_TO_LATIN_MAP.get(&lower) {
                Some(latin) => out.push_str(latin),
                None => out.push(lower),
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn to_cyrillic(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut out = String::with_capacity(lower.len() * 2);
    let mut rest = lower.as_str();

    'outer: while let Some(c) = rest.chars().next() {
        if c.is_ascii_alphabetic() {
            for (latin, ru) in LATIN_TO_RU {
                if rest.starts_with(latin) {
                    out.push_str(ru);
                    rest = &rest[latin.len()..];
                    continue 'outer;
                }
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_latin() {
        assert_eq!(transliterate("камаз", Direction::ToLatin), "kamaz");
        assert_eq!(transliterate("ЖИГУЛИ", Direction::ToLatin), "zhiguli");
        assert_eq!(transliterate("щётка", Direction::ToLatin), "schetka");
        assert_eq!(transliterate("bosch 123", Direction::ToLatin), "bosch 123");
    }

    #[test]
    fn test_to_cyrillic_prefers_longest_chunk() {
        assert_eq!(transliterate("kamaz", Direction::ToCyrillic), "камаз");
        assert_eq!(transliterate("shantui", Direction::ToCyrillic), "шантуи");
        assert_eq!(transliterate("zhiguli", Direction::ToCyrillic), "жигули");
        assert_eq!(transliterate("Volvo 940", Direction::ToCyrillic), "волво 940");
    }

    #[test]
    fn test_round_trip_on_simple_brand() {
        let latin = transliterate("лукоил", Direction::ToLatin);
        assert_eq!(latin, "lukoil");
        assert_eq!(transliterate(&latin, Direction::ToCyrillic), "лукоил");
    }

    #[test]
    fn test_detect_script() {
        assert_eq!(detect_script("камаз"), Script::Cyrillic);
        assert_eq!(detect_script("kamaz"), Script::Latin);
        assert_eq!(detect_script("масло shell"), Script::Mixed);
        assert_eq!(detect_script("12-34"), Script::None);
    }
}
