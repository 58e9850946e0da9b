use lazy_static::lazy_static;
use regex::Regex;

/// URL-friendly form of a post title: lowercase ASCII words joined by `-`.
pub fn slugify(title: &str) -> String {
    lazy_static! {
        static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
    }
    let lowered = title.to_lowercase();
    let slug = NON_ALNUM.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "post".to_string()
    } else {
        slug.to_string()
    }
}
