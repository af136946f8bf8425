pub mod normalize;
pub mod phonetic;
pub mod translit;

pub use normalize::{latin_key, normalize, normalize_code, normalize_token, spelling_key, tokenize};
pub use phonetic::phonetic_key;
pub use translit::{detect_script, transliterate, Direction, Script};
