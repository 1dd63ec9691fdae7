use serde::Serialize;

use crate::domain::post::BlogPost;
use crate::domain::slug::slugify;

/// Splits a comma-separated keyword string into trimmed, de-duplicated tags,
/// keeping the first spelling of each.
pub fn extract_tags(keywords: Option<&str>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for raw in keywords.unwrap_or_default().split(',') {
        let tag = raw.trim();
        if tag.is_empty() || tags.iter().any(|t| t == tag) {
            continue;
        }
        tags.push(tag.to_string());
    }
    tags
}

/// Matching key for a tag or tag segment: its slug with the hyphens removed,
/// so `Next.js`, `next js` and `next-js` all land on the same page.
/// Hyphens carry no meaning here: `go-lang` and `golang` match as well.
pub fn tag_key(tag: &str) -> String {
    slugify(tag).replace('-', "")
}

/// A post belongs to a tag page when any of its tags shares the segment's key.
/// This is looser than comparing slugs, since `web-dev` also finds `webdev`.
pub fn has_tag(post: &BlogPost, segment: &str) -> bool {
    let key = tag_key(segment);
    !key.is_empty() && post.tags().iter().any(|tag| tag_key(tag) == key)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSummary {
    pub name: String,
    pub slug: String,
    pub post_count: usize,
}

/// Every distinct tag across `posts`, merged by key, most used first.
pub fn summarize_tags<'a>(posts: impl IntoIterator<Item = &'a BlogPost>) -> Vec<TagSummary> {
    let mut summaries: Vec<TagSummary> = Vec::new();
    for post in posts {
        let mut seen: Vec<String> = Vec::new();
        for tag in post.tags() {
            let key = tag_key(&tag);
            if key.is_empty() || seen.contains(&key) {
                continue;
            }
            match summaries.iter_mut().find(|s| tag_key(&s.slug) == key) {
                Some(summary) => summary.post_count += 1,
                None => summaries.push(TagSummary {
                    slug: slugify(&tag),
                    name: tag,
                    post_count: 1,
                }),
            }
            seen.push(key);
        }
    }
    summaries.sort_by(|a, b| b.post_count.cmp(&a.post_count).then_with(|| a.slug.cmp(&b.slug)));
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::post::PostStatus;
    use chrono::Utc;

    fn post(id: &str, keywords: Option<&str>) -> BlogPost {
        BlogPost {
            id: id.into(),
            title: id.into(),
            slug: id.into(),
            content: String::new(),
            category: vec![],
            created_at: Utc::now(),
            status: PostStatus::Published,
            banner_image: None,
            ad_tag: None,
            source_code: None,
            keywords: keywords.map(str::to_string),
            meta_description: None,
        }
    }

    #[test]
    fn extracts_trimmed_unique_tags() {
        assert_eq!(
            extract_tags(Some(" rust, web ,rust,, actix ")),
            vec!["rust", "web", "actix"]
        );
        assert!(extract_tags(None).is_empty());
        assert!(extract_tags(Some(" , ,")).is_empty());
    }

    #[test]
    fn differently_spelled_tags_share_a_page() {
        let a = post("a", Some("Next.js, react"));
        let b = post("b", Some("next js"));
        let c = post("c", Some("nextjs-adjacent, next"));
        let segment = slugify("Next.js");

        assert!(has_tag(&a, &segment));
        assert!(has_tag(&b, &segment));
        assert!(!has_tag(&c, &segment));
    }

    #[test]
    fn hyphens_do_not_separate_tags() {
        let joined = post("a", Some("golang"));
        let split = post("b", Some("Go-Lang"));

        assert_eq!(tag_key("go-lang"), tag_key("golang"));
        assert!(has_tag(&joined, "go-lang"));
        assert!(has_tag(&split, "golang"));
        assert!(!has_tag(&joined, "go"));
    }

    #[test]
    fn summary_merges_by_key_and_counts_posts_once() {
        let posts = [
            post("a", Some("Rust, rust!, web")),
            post("b", Some("RUST, Next.js")),
            post("c", Some("web, next js")),
        ];
        let tags = summarize_tags(posts.iter());
        let slugs: Vec<&str> = tags.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(slugs, vec!["nextjs", "rust", "web"]);
        assert_eq!(tags[1].name, "Rust");
        assert!(tags.iter().all(|t| t.post_count == 2));
    }
}
