//! Fixed translation tables keyed by `"{source}-{target}"`.

use std::collections::HashMap;
use std::sync::OnceLock;

type Table = HashMap<&'static str, &'static str>;

const EN_ES: &[(&str, &str)] = &[
    ("hello", "hola"),
    ("hello world", "hola mundo"),
    ("goodbye", "adiós"),
    ("thank you", "gracias"),
    ("thanks", "gracias"),
    ("please", "por favor"),
    ("yes", "sí"),
    ("good morning", "buenos días"),
    ("good night", "buenas noches"),
    ("how are you", "¿cómo estás?"),
    ("i love you", "te quiero"),
    ("welcome", "bienvenido"),
    ("friend", "amigo"),
    ("world", "mundo"),
    ("water", "agua"),
    ("food", "comida"),
    ("good", "bueno"),
    ("morning", "mañana"),
    ("house", "casa"),
    ("cat", "gato"),
    ("dog", "perro"),
    ("the", "el"),
    ("test", "prueba"),
    ("message", "mensaje"),
];

const EN_FR: &[(&str, &str)] = &[
    ("hello", "bonjour"),
    ("hello world", "bonjour le monde"),
    ("goodbye", "au revoir"),
    ("thank you", "merci"),
    ("thanks", "merci"),
    ("please", "s'il vous plaît"),
    ("yes", "oui"),
    ("no", "non"),
    ("good morning", "bonjour"),
    ("good night", "bonne nuit"),
    ("how are you", "comment allez-vous ?"),
    ("friend", "ami"),
    ("world", "monde"),
    ("water", "eau"),
    ("house", "maison"),
    ("cat", "chat"),
    ("dog", "chien"),
];

const EN_DE: &[(&str, &str)] = &[
    ("hello", "hallo"),
    ("hello world", "hallo welt"),
    ("goodbye", "auf wiedersehen"),
    ("thank you", "danke"),
    ("thanks", "danke"),
    ("please", "bitte"),
    ("yes", "ja"),
    ("no", "nein"),
    ("good morning", "guten morgen"),
    ("good night", "gute nacht"),
    ("how are you", "wie geht es dir?"),
    ("friend", "freund"),
    ("world", "welt"),
    ("water", "wasser"),
    ("house", "haus"),
    ("cat", "katze"),
    ("dog", "hund"),
    ("message", "nachricht"),
];

const ES_EN: &[(&str, &str)] = &[
    ("hola", "hello"),
    ("hola mundo", "hello world"),
    ("adiós", "goodbye"),
    ("gracias", "thank you"),
    ("por favor", "please"),
    ("sí", "yes"),
    ("buenos días", "good morning"),
    ("buenas noches", "good night"),
    ("mundo", "world"),
    ("amigo", "friend"),
    ("agua", "water"),
    ("casa", "house"),
];

const FR_EN: &[(&str, &str)] = &[
    ("bonjour", "hello"),
    ("au revoir", "goodbye"),
    ("merci", "thank you"),
    ("oui", "yes"),
    ("non", "no"),
    ("monde", "world"),
    ("ami", "friend"),
];

const DE_EN: &[(&str, &str)] = &[
    ("hallo", "hello"),
    ("auf wiedersehen", "goodbye"),
    ("danke", "thank you"),
    ("ja", "yes"),
    ("nein", "no"),
    ("welt", "world"),
    ("freund", "friend"),
];

/// Supported languages in display order.
const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ja", "Japanese"),
    ("zh", "Chinese"),
];

fn tables() -> &'static HashMap<&'static str, Table> {
    static TABLES: OnceLock<HashMap<&'static str, Table>> = OnceLock::new();
    TABLES.get_or_init(|| {
        [
            ("en-es", EN_ES),
            ("en-fr", EN_FR),
            ("en-de", EN_DE),
            ("es-en", ES_EN),
            ("fr-en", FR_EN),
            ("de-en", DE_EN),
        ]
        .into_iter()
        .map(|(pair, entries)| (pair, entries.iter().copied().collect()))
        .collect()
    })
}

/// Lowercase, trim, and drop trailing sentence punctuation.
fn normalize(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .trim_end_matches(['.', '!', '?'])
        .trim_end()
        .to_string()
}

/// Translate `text` from `source` to `target`.
///
/// Same-language requests return the text unchanged. Otherwise the whole
/// normalized phrase is looked up first, then each word; unknown words pass
/// through. When nothing was translated the original text is returned with
/// a `[TARGET] ` prefix.
pub fn translate(text: &str, source: &str, target: &str) -> String {
    if source.eq_ignore_ascii_case(target) {
        return text.to_string();
    }

    let normalized = normalize(text);
    let pair = format!("{}-{}", source.to_lowercase(), target.to_lowercase());
    let table = tables().get(pair.as_str());

    if let Some(phrase) = table.and_then(|t| t.get(normalized.as_str())) {
        return (*phrase).to_string();
    }

    let word_by_word = normalized
        .split_whitespace()
        .map(|word| table.and_then(|t| t.get(word).copied()).unwrap_or(word))
        .collect::<Vec<_>>()
        .join(" ");

    if word_by_word == normalized {
        format!("[{}] {}", target.to_uppercase(), text)
    } else {
        word_by_word
    }
}

/// Static list of `(code, display name)` pairs.
pub fn supported_languages() -> &'static [(&'static str, &'static str)] {
    LANGUAGES
}
