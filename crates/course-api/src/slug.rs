use deunicode::deunicode_with_tofu;

/// URL-safe identifier for a title: transliterated to ASCII, lowercase, runs
/// of anything that is not alphanumeric collapse to a single `-`, `@` reads
/// as `at`, no leading or trailing separator.
pub fn slugify(title: &str) -> String {
    // Characters without a transliteration become separators.
    let ascii = deunicode_with_tofu(title, " ");
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_sep = false;

    for ch in ascii.chars() {
        if ch == '@' {
            pending_sep = true;
            push_word(&mut slug, &mut pending_sep, "at");
            pending_sep = true;
        } else if ch.is_ascii_alphanumeric() {
            push_char(&mut slug, &mut pending_sep, ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }

    slug
}

fn push_word(slug: &mut String, pending_sep: &mut bool, word: &str) {
    separate(slug, pending_sep);
    slug.push_str(word);
}

fn push_char(slug: &mut String, pending_sep: &mut bool, ch: char) {
    separate(slug, pending_sep);
    slug.push(ch);
}

fn separate(slug: &mut String, pending_sep: &mut bool) {
    if *pending_sep && !slug.is_empty() {
        slug.push('-');
    }
    *pending_sep = false;
}
