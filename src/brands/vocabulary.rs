use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;

use crate::text::{latin_key, normalize, normalize_token, tokenize};

// Descriptive nouns, legal forms and place names. Never brand tokens.
const GENERIC_LABEL_WORDS: &[&str] = &[
    "group", "company", "co", "inc", "corp", "corporation", "limited", "ltd", "llc", "plc",
    "pte", "pty", "gmbh", "srl", "sro", "spa", "sa", "sas", "sasu", "ab", "ag", "oy", "oyj",
    "nv", "bv", "ptc", "holding", "holdings", "motor", "motors", "moto", "auto", "automobile",
    "automobiles", "automotive", "factory", "industries", "industry", "parts", "detail",
    "details", "service", "services", "equipment", "machines", "machinery", "construction",
    "products", "product", "systems", "system", "brand", "electronics", "electronic",
    "electric", "electrical", "oil", "lubricant", "lubricants", "fluid", "fluids", "liquid",
    "grease", "filter", "filters", "bearing", "bearings", "seal", "seals", "gasket", "gaskets",
    "ring", "rings", "belt", "belts", "hose", "hoses", "pipe", "pipes", "tube", "tubes",
    "pump", "pumps", "valve", "valves", "cylinder", "cylinders", "liner", "liners", "piston",
    "pistons", "bolt", "bolts", "nut", "nuts", "washer", "washers", "stud", "studs", "pin",
    "pins", "rod", "rods", "spring", "springs", "gear", "gears", "block", "blocks", "boot",
    "boots", "gidroprivod", "gidro", "nasos", "podshipnik", "kronshtein", "koromyslo",
    "завод", "компания", "ооо", "зао", "ooo", "zao", "группа", "детали", "деталь", "запчасти",
    "запчасть", "масло", "масла", "маслосъемный", "маслосъемная", "масл", "жидкость",
    "жидкости", "подшипник", "подшипники", "колпачок", "колодка", "колодки", "прокладка",
    "прокладки", "втулка", "втулки", "болт", "болты", "гайка", "гайки", "шайба", "шайбы",
    "шланг", "шланги", "насос", "насосы", "трубка", "трубки", "кольцо", "кольца", "ремень",
    "ремни", "уплотнение", "уплотнения", "уплотнитель", "уплотнители", "уплотнительная",
    "уплотнительные", "уплотнительный", "фильтр", "фильтры", "сальник", "сальники", "клапан",
    "клапаны", "гидроцилиндр", "цилиндр", "цилиндры", "гидромотор", "поршень", "поршни",
    "шестерня", "шестерни", "корпус", "кронштейн", "рычаг", "рычаги", "пружина", "кардан",
    "фара", "лампа", "лампы", "поддон", "насадка", "насадки", "крышка", "крышки", "кожух",
    "комплект", "комплекты", "опора", "опоры", "распылитель", "распылители", "шкворень",
    "сайлентблок", "сайлентблоки", "колесо", "колеса", "блок", "пыльник", "пыльники",
    "quanzhou", "shanghai", "moscow", "moskva", "saint", "petersburg", "china", "germany",
    "italy", "japan", "korea", "turkey", "russia", "usa", "europe",
];

// Longer suffixes first so the longest inflection is removed.
const GENERIC_SUFFIXES: &[&str] = &[
    "yakh", "yami", "ami", "yah", "akh", "ogo", "ego", "omu", "emu", "iyu", "uyu",
    "aya", "yam", "ov", "ev", "iy", "yy", "oy", "ey", "im", "ym", "om", "em", "am", "iu",
    "ya", "ia", "es", "a", "y", "i", "u", "e", "s",
];

const NOISE_STARTERS: &[&str] = &[
    "замок", "прокладка", "прокладки", "палец", "пальц", "шланг", "шланги", "втулка", "втулки",
    "масло", "масла", "масел", "маслосъемный", "жидкость", "жидкости", "подшипник",
    "подшипники", "колпачок", "кольцо", "кольца", "насос", "насосы", "для", "пружина",
    "пружины", "поршень", "поршни", "ремень", "ремни", "кронштейн", "крышка", "болт", "гайка",
    "шайба", "фильтр", "фильтры", "уплотнение", "уплотнения", "уплотнитель", "уплотнители",
    "опора", "опоры", "гидроцилиндр", "гидромотор", "деталь", "детали", "комплект",
    "комплекты",
];

const QUERY_STOPWORDS: &[&str] = &[
    "the", "a", "an", "to", "for", "with", "and", "of", "и", "в", "на", "для", "с", "без",
    "под", "из", "до", "по", "от", "как", "к",
];

// Colloquial brand names that no spelling correction reaches.
const BRAND_ALIASES: &[(&str, &str)] = &[
    ("бмв", "bmw"),
    ("беха", "bmw"),
    ("бэха", "bmw"),
    ("мерс", "mercedes"),
    ("мерседес", "mercedes"),
    ("vw", "volkswagen"),
    ("фольксваген", "volkswagen"),
    ("фольцваген", "volkswagen"),
    ("chevy", "chevrolet"),
    ("шевроле", "chevrolet"),
    ("рено", "renault"),
    ("пежо", "peugeot"),
    ("ситроен", "citroen"),
    ("шкода", "skoda"),
    ("вольво", "volvo"),
    ("ивеко", "iveco"),
    ("скания", "scania"),
    ("ваз", "lada"),
    ("vaz", "lada"),
    ("газель", "gaz"),
    ("газон", "gaz"),
    ("комацу", "komatsu"),
    ("хитачи", "hitachi"),
    ("дусан", "doosan"),
    ("дэу", "daewoo"),
    ("хавал", "haval"),
    ("джили", "geely"),
    ("черри", "chery"),
    ("донгфенг", "dongfeng"),
    ("шантуй", "shantui"),
    ("cat", "caterpillar"),
];

lazy_static! {
    static ref ARTICLE_CODE_RE: Regex =
        Regex::new(r"(?i)^(?:[a-z]{2}\d{3,}|\d{3,}[-/]\d+)$").expect("article pattern");
    static ref CODE_CHARSET_RE: Regex =
        Regex::new(r"(?i)^[a-z0-9-]{6,}$").expect("code charset pattern");

    static ref GENERIC_KEYS: HashSet<String> = {
        let mut keys = HashSet::new();
        for word in GENERIC_LABEL_WORDS {
            for token in normalize(word).split(' ').filter(|t| !t.is_empty()) {
                let key = latin_key(token);
                keys.insert(strip_generic_suffix(&key));
                keys.insert(key);
            }
        }
        keys
    };

    static ref NOISE_STARTER_SET: HashSet<String> =
        NOISE_STARTERS.iter().map(|w| normalize(w)).collect();

    static ref STOPWORD_SET: HashSet<String> =
        QUERY_STOPWORDS.iter().map(|w| normalize(w)).collect();

    static ref BRAND_ALIAS_MAP: HashMap<String, &'static str> = BRAND_ALIASES
        .iter()
        .filter_map(|(alias, id)| normalize_token(alias).map(|key| (key, *id)))
        .collect();
}


pub fn strip_generic_suffix(token: &str) -> String {
    let mut base = token;
    loop {
        let stripped = GENERIC_SUFFIXES.iter().find_map(|suffix| {
            base.strip_suffix(suffix)
                .filter(|rest| rest.chars().count() >= 4)
        });
        match stripped {
            Some(rest) => base = rest,
            None => return base.to_string(),
        }
    }
}


pub fn is_generic_token(normalized: &str) -> bool {
    if normalized.is_empty() {
        return true;
    }
    let key = latin_key(normalized);
    GENERIC_KEYS.contains(&key) || GENERIC_KEYS.contains(&strip_generic_suffix(&key))
}

pub fn is_stopword(normalized: &str) -> bool {
    STOPWORD_SET.contains(normalized)
}

pub fn brand_alias(normalized: &str) -> Option<&'static str> {
    BRAND_ALIAS_MAP.get(normalized).copied()
}


pub fn looks_like_article_code(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    let digits = token.chars().filter(char::is_ascii_digit).count();
    if ARTICLE_CODE_RE.is_match(token) || (digits > 0 && CODE_CHARSET_RE.is_match(token)) {
        return true;
    }
    let letters = token.chars().filter(|c| c.is_alphabetic()).count();
    digits >= 3 && digits >= letters
}


pub fn is_noise_line(line: &str) -> bool {
    let tokens: Vec<&str> = tokenize(line).collect();
    let Some(first) = tokens.first() else {
        return true;
    };
    if tokens.len() > 1 && looks_like_article_code(first) {
        return true;
    }
    if normalize_token(first).is_some_and(|t| NOISE_STARTER_SET.contains(&t)) {
        return true;
    }
    let digits = line.chars().filter(char::is_ascii_digit).count();
    let letters = line.chars().filter(|c| c.is_alphabetic()).count();
    digits > 0 && digits >= letters * 2
}
