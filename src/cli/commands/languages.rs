use crate::translation::SUPPORTED_LANGUAGES;

/// Prints all supported language codes to stdout.
pub fn print_languages() {
    println!("Supported language codes (ISO 639-1)");
    for (code, name) in SUPPORTED_LANGUAGES {
        println!("  {code:5} {name}");
    }
}
