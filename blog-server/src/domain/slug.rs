/// Turns free text into a URL segment.
///
/// Trims, lowercases, spells out `&` as `and`, drops everything outside
/// `[a-z0-9- ]`, and joins the remaining words with single hyphens. The result
/// is either empty or matches `^[a-z0-9]+(-[a-z0-9]+)*$`, so applying it twice
/// changes nothing.
pub fn slugify(text: &str) -> String {
    let lowered = text.trim().to_lowercase().replace('&', "and");
    let mut slug = String::with_capacity(lowered.len());
    let mut separator = false;

    for ch in lowered.chars() {
        match ch {
            'a'..='z' | '0'..='9' => {
                if separator && !slug.is_empty() {
                    slug.push('-');
                }
                separator = false;
                slug.push(ch);
            }
            ' ' | '-' => separator = true,
            _ => {}
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::slugify;

    fn is_well_formed(slug: &str) -> bool {
        slug.is_empty()
            || slug
                .split('-')
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()))
    }

    #[test]
    fn spells_out_ampersand_and_drops_punctuation() {
        assert_eq!(slugify("React & Next.js!"), "react-and-nextjs");
    }

    #[test]
    fn collapses_whitespace_and_hyphens() {
        assert_eq!(slugify("  Hello   --  World  "), "hello-world");
        assert_eq!(slugify("a - b"), "a-b");
        assert_eq!(slugify("rust---lang"), "rust-lang");
    }

    #[test]
    fn strips_tabs_and_non_ascii_without_separating() {
        assert_eq!(slugify("Caf\u{e9} Cr\u{e8}me"), "caf-crme");
        assert_eq!(slugify("tab\there"), "tabhere");
    }

    #[test]
    fn never_leaves_edge_hyphens() {
        assert_eq!(slugify("-leading"), "leading");
        assert_eq!(slugify("trailing !"), "trailing");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn is_idempotent_and_well_formed() {
        let inputs = [
            "React & Next.js!",
            "  Mixed CASE title with 123 numbers ",
            "---",
            "emoji \u{1F600} in title",
            "under_score and/slash",
            "Next.js",
            "next js",
            "&&&",
        ];
        for input in inputs {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "input {input:?}");
            assert!(is_well_formed(&once), "input {input:?} gave {once:?}");
        }
    }
}
