use scraper::Html;

/// Strips markup from a job description and collapses whitespace.
pub fn clean_text(text: &str) -> String {
    let fragment = Html::parse_fragment(text);
    let joined = fragment
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ");

    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_decodes_entities() {
        let html = "<p>Experience with <b>React</b>&amp;Node.js</p>\n<ul><li>AWS</li></ul>";
        assert_eq!(clean_text(html), "Experience with React &Node.js AWS");
    }

    #[test]
    fn separates_adjacent_blocks() {
        assert_eq!(
            clean_text("<li>Docker</li><li>Kubernetes</li>"),
            "Docker Kubernetes"
        );
    }

    #[test]
    fn plain_text_only_loses_extra_whitespace() {
        assert_eq!(
            clean_text("  Python,\n\tDjango   and\r\nAWS  "),
            "Python, Django and AWS"
        );
    }

    #[test]
    fn empty_input_is_empty() {
        assert_eq!(clean_text(""), "");
    }
}
