//! String helpers for URLs and type names.
//!
//! Provides the slug transformation used by URL rewriting schemes, the
//! short-name extraction used to key content-type schemes, and slash
//! collapsing for generated paths.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum length of an urlized string.
pub const URLIZE_LENGTH_LIMIT: usize = 250;

static SEPARATORS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.'’ ]+").expect("Invalid separators regex"));

static DASHES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("Invalid dashes regex"));

static SLASHES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/+").expect("Invalid slashes regex"));

/// Convert free text to a lowercase, hyphen-separated URL segment.
///
/// Performs the following transformations:
/// 1. Replaces a few symbols with words (`%` → `percent`, `€` → `euro`)
/// 2. Turns dots, apostrophes and spaces into single separators
/// 3. Folds accented Latin letters to ASCII and drops other punctuation
/// 4. Collapses runs of separators into one hyphen and lowercases
/// 5. Truncates to [`URLIZE_LENGTH_LIMIT`] and trims leading/trailing hyphens
///
/// # Examples
///
/// ```
/// use backbee_core::util::strings::urlize;
///
/// assert_eq!(urlize("My Title"), "my-title");
/// assert_eq!(urlize("L'été à Paris"), "l-ete-a-paris");
/// assert_eq!(urlize("  100% sure!  "), "100percent-sure");
/// ```
pub fn urlize(value: &str) -> String {
    let replaced = value
        .replace('®', "")
        .replace('%', "percent")
        .replace('€', "euro")
        .replace(['“', '”'], "\"")
        .replace('…', "...");
    let spaced = SEPARATORS_RE.replace_all(&replaced, " ");

    let mut path = String::with_capacity(spaced.len());
    for c in spaced.chars() {
        match fold_latin(c) {
            Some(folded) => path.push_str(folded),
            None if c.is_ascii_alphanumeric() || c == '-' || c.is_whitespace() => path.push(c),
            None => {}
        }
    }

    let dashed = DASHES_RE.replace_all(&path, "-").to_lowercase();
    let limited: String = dashed.chars().take(URLIZE_LENGTH_LIMIT).collect();
    limited.trim_matches('-').to_string()
}

/// Extract the short name of a possibly namespaced type name.
///
/// Both `\` and `::` separators are understood.
///
/// # Examples
///
/// ```
/// use backbee_core::util::strings::short_type_name;
///
/// assert_eq!(short_type_name("BackBee\\ClassContent\\Article"), "Article");
/// assert_eq!(short_type_name("content::Block"), "Block");
/// assert_eq!(short_type_name("Page"), "Page");
/// ```
pub fn short_type_name(type_name: &str) -> &str {
    let after_backslash = type_name.rsplit('\\').next().unwrap_or(type_name);
    after_backslash
        .rsplit("::")
        .next()
        .unwrap_or(after_backslash)
}

/// Collapse every run of slashes into a single slash.
///
/// # Examples
///
/// ```
/// use backbee_core::util::strings::collapse_slashes;
///
/// assert_eq!(collapse_slashes("/parent//u1///title"), "/parent/u1/title");
/// ```
pub fn collapse_slashes(path: &str) -> String {
    SLASHES_RE.replace_all(path, "/").into_owned()
}

fn fold_latin(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "A",
        'æ' => "ae",
        'Æ' => "AE",
        'ç' => "c",
        'Ç' => "C",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'È' | 'É' | 'Ê' | 'Ë' => "E",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'Ì' | 'Í' | 'Î' | 'Ï' => "I",
        'ñ' => "n",
        'Ñ' => "N",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => "O",
        'œ' => "oe",
        'Œ' => "OE",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'Ù' | 'Ú' | 'Û' | 'Ü' => "U",
        'ý' | 'ÿ' => "y",
        'Ý' => "Y",
        'ß' => "ss",
        _ => return None,
    };
    Some(folded)
}
