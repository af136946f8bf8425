use super::normalize::{normalize, tokenize};
use super::translit::{transliterate, Direction};

const PHONETIC_DIGRAPHS: &[(&str, char)] = &[
    ("sch", 'X'),
    ("sh", 'X'),
    ("ch", 'X'),
    ("zh", 'J'),
    ("ts", 'S'),
    ("kh", 'H'),
    ("ph", 'F'),
    ("ck", 'K'),
];


pub fn phonetic_key(text: &str) -> String {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return String::new();
    }

    let latin = transliterate(&normalized, Direction::ToLatin);
    let mut codes: Vec<String> = Vec::new();
    for token in tokenize(&latin) {
        let code = encode_token(token);
        if !code.is_empty() && !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes.join(" ")
}

fn encode_token(token: &str) -> String {
    let ascii: String = token
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();
    if ascii.is_empty() {
        return String::new();
    }

    let mut classes: Vec<char> = Vec::with_capacity(ascii.len());
    let mut rest = ascii.as_str();
    'outer: while let Some(c) = rest.chars().next() {
        for (digraph, class) in PHONETIC_DIGRAPHS {
            if rest.starts_with(digraph) {
                classes.push(*class);
                rest = &rest[digraph.len()..];
                continue 'outer;
            }
        }
        classes.push(letter_class(c));
        rest = &rest[c.len_utf8()..];
    }

    let mut code = String::with_capacity(classes.len());
    let mut last: Option<char> = None;
    for (i, class) in classes.into_iter().enumerate() {
        if class == 'A' && i > 0 {
            last = Some(class);
            continue;
        }
        if Some(class) != last {
            code.push(class);
        }
        last = Some(class);
    }
    code
}

fn letter_class(c: char) -> char {
    match c {
        'a' | 'e' | 'i' | 'o' | 'u' | 'y' => 'A',
        'b' | 'p' => 'P',
        'f' | 'v' | 'w' => 'F',
        'c' | 'k' | 'q' | 'g' => 'K',
        'x' => 'K',
        's' | 'z' => 'S',
        'd' | 't' => 'T',
        'j' => 'J',
        'h' => 'H',
        'l' => 'L',
        'm' | 'n' => 'N',
        'r' => 'R',
        other => other.to_ascii_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_script_spellings_share_a_key() {
        assert_eq!(phonetic_key("bosch"), phonetic_key("бош"));
        assert_eq!(phonetic_key("kamaz"), phonetic_key("КАМАЗ"));
        assert_eq!(phonetic_key("shantui"), phonetic_key("шантуй"));
    }

    #[test]
    fn test_misspelling_tolerance() {
        assert_eq!(phonetic_key("caterpillar"), phonetic_key("катерпилар"));
        assert_eq!(phonetic_key("doosan"), phonetic_key("дусан"));
    }

    #[test]
    fn test_empty_and_dedup() {
        assert_eq!(phonetic_key(""), "");
        assert_eq!(phonetic_key("!!"), "");
        assert_eq!(phonetic_key("volvo volvo"), phonetic_key("volvo"));
    }
}
