// src/page/document.rs
// =============================================================================
// The host page: the hand-written HTML file that holds the card templates,
// the containers the cards go into, and the alerts shown on failure.
//
// Parsing does two things with the same source:
// - `scraper` checks the DOM contract (every id exists, the templates really
//   are <template> elements)
// - a scan of the raw text finds the byte range of every element we will
//   touch, skipping comments, <script>/<style> text and <template> content,
//   and checks that each tag found is the element scraper saw
//
// Template markup and rendering both work on the original text, so everything
// we do not touch (whitespace, comments, attribute order) comes out
// byte-for-byte unchanged.
//
// Rendering a section:
// - its cards are inserted at the start of its container
// - a failed section gets `hidden` on its container, and its alert gets the
//   message as text with its own `hidden` attribute removed
// =============================================================================

use scraper::{ElementRef, Html, Selector};
use std::ops::Range;
use thiserror::Error;
use tracing::debug;

use super::section::{PageSections, Section};
use super::template::{escape_html, CardTemplate};
use crate::config::DomContract;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("the host page has no element with id \"{0}\"")]
    MissingElement(String),

    #[error("#{0} must be a <template> element")]
    NotATemplate(String),

    #[error("\"{0}\" is not a usable element id")]
    InvalidId(String),

    #[error("could not find the tags of #{0} in the page source")]
    Unlocatable(String),
}

#[derive(Debug, Clone)]
pub struct HostPage {
    source: String,
    repo_tags: SectionTags,
    gist_tags: SectionTags,
    repo_template: CardTemplate,
    gist_template: CardTemplate,
}

// Where one section lives in the page source
#[derive(Debug, Clone)]
struct SectionTags {
    /// Opening tag of the card container
    container: Range<usize>,
    /// Opening tag of the alert
    alert: Range<usize>,
    /// Everything between the alert's opening and closing tags
    alert_text: Range<usize>,
}

// One text replacement in the page source
struct Edit {
    range: Range<usize>,
    text: String,
}

// The page source with the regions where tags are not real elements
struct SourceScan<'a> {
    source: &'a str,
    lower: String,
    inert: Vec<Range<usize>>,
}

impl HostPage {
    /// Parses the page and checks that every element of the contract exists
    pub fn parse(source: impl Into<String>, dom: &DomContract) -> Result<Self, PageError> {
        let source = source.into();
        let document = Html::parse_document(&source);
        let scan = SourceScan::new(&source);

        let repo_tags = SectionTags::locate(&document, &scan, &dom.repo_container, &dom.repo_alert)?;
        let gist_tags = SectionTags::locate(&document, &scan, &dom.gist_container, &dom.gist_alert)?;
        let repo_template = read_template(&document, &scan, &dom.repo_template)?;
        let gist_template = read_template(&document, &scan, &dom.gist_template)?;

        Ok(Self {
            source,
            repo_tags,
            gist_tags,
            repo_template,
            gist_template,
        })
    }

    pub fn repo_template(&self) -> &CardTemplate {
        &self.repo_template
    }

    pub fn gist_template(&self) -> &CardTemplate {
        &self.gist_template
    }

    /// Writes both sections into the page and returns the finished HTML
    pub fn render(&self, sections: &PageSections) -> String {
        let mut edits = Vec::new();
        self.section_edits(&sections.repos, &self.repo_template, &self.repo_tags, &mut edits);
        self.section_edits(&sections.gists, &self.gist_template, &self.gist_tags, &mut edits);

        // Apply back to front so earlier offsets stay valid
        edits.sort_by(|a, b| (b.range.start, b.range.end).cmp(&(a.range.start, a.range.end)));

        let mut html = self.source.clone();
        for edit in edits {
            html.replace_range(edit.range, &edit.text);
        }
        html
    }

    fn section_edits(
        &self,
        section: &Section,
        template: &CardTemplate,
        tags: &SectionTags,
        edits: &mut Vec<Edit>,
    ) {
        let container = tags.container.clone();

        if !section.cards().is_empty() {
            let mut cards = String::new();
            for card in section.cards() {
                cards.push('\n');
                cards.push_str(&template.render(card));
            }
            edits.push(Edit {
                range: container.end..container.end,
                text: cards,
            });
        }

        if section.is_hidden() {
            let at = attribute_insert_point(&self.source[container.clone()]) + container.start;
            edits.push(Edit {
                range: at..at,
                text: " hidden".to_string(),
            });
        }

        if let Some(message) = section.alert() {
            // Replace the alert's existing content, like setting textContent
            edits.push(Edit {
                range: tags.alert_text.clone(),
                text: escape_html(message),
            });
            edits.push(Edit {
                range: tags.alert.clone(),
                text: strip_hidden_attribute(&self.source[tags.alert.clone()]),
            });
        }
    }
}

impl SectionTags {
    fn locate(
        document: &Html,
        scan: &SourceScan<'_>,
        container_id: &str,
        alert_id: &str,
    ) -> Result<Self, PageError> {
        let container = locate_element(document, scan, container_id)?;
        let alert = locate_element(document, scan, alert_id)?;

        // Alerts hold text; a nested element of the same tag is matched as a pair
        let name = tag_name(&scan.source[alert.clone()]).to_ascii_lowercase();
        let close = scan
            .close_tag(alert.end, &name, true)
            .ok_or_else(|| PageError::Unlocatable(alert_id.to_string()))?;

        Ok(Self {
            container,
            alert_text: alert.end..close,
            alert,
        })
    }
}

impl<'a> SourceScan<'a> {
    fn new(source: &'a str) -> Self {
        let mut scan = Self {
            source,
            lower: source.to_ascii_lowercase(),
            inert: Vec::new(),
        };
        scan.inert = scan.inert_ranges();
        scan
    }

    // Comments, raw text of <script>/<style>, and <template> content
    fn inert_ranges(&self) -> Vec<Range<usize>> {
        let lower = self.lower.as_str();
        let mut ranges = Vec::new();
        let mut at = 0;

        while let Some(offset) = lower[at..].find('<') {
            let start = at + offset;
            let rest = &lower[start..];

            if rest.starts_with("<!--") {
                let end = lower[start + 4..]
                    .find("-->")
                    .map_or(lower.len(), |close| start + 4 + close + 3);
                ranges.push(start..end);
                at = end;
                continue;
            }

            let raw = ["script", "style", "template"]
                .into_iter()
                .find(|name| is_tag_named(&rest[1..], name));
            if let Some(name) = raw {
                let Some(open_end) = rest.find('>').map(|end| start + end + 1) else {
                    break;
                };
                let end = self
                    .close_tag(open_end, name, name == "template")
                    .unwrap_or(lower.len());
                ranges.push(open_end..end);
                at = end;
                continue;
            }

            at = start + 1;
        }

        ranges
    }

    fn is_inert(&self, at: usize) -> bool {
        self.inert.iter().any(|range| range.contains(&at))
    }

    // Byte range of the opening tag carrying id="..." (or id='...') outside
    // the inert regions. Matches inside another attribute (data-id="x") are skipped.
    fn open_tag(&self, id: &str) -> Option<Range<usize>> {
        let source = self.source;
        let bytes = source.as_bytes();

        for (at, _) in source.match_indices("id=") {
            if at == 0 || !bytes[at - 1].is_ascii_whitespace() || self.is_inert(at) {
                continue;
            }
            let value = &source[at + 3..];
            let Some(quote) = value.chars().next().filter(|c| *c == '"' || *c == '\'') else {
                continue;
            };
            let matches_id = value[1..]
                .strip_prefix(id)
                .is_some_and(|after| after.starts_with(quote));
            if !matches_id {
                continue;
            }
            let Some(start) = source[..at].rfind('<') else {
                continue;
            };
            if source[start..at].contains('>') {
                continue;
            }
            let Some(close) = source[at..].find('>') else {
                continue;
            };
            return Some(start..at + close + 1);
        }

        None
    }

    // Start of the `</name>` closing an element whose content begins at `from`.
    // With `nested`, same-name elements opened in between are paired off first.
    fn close_tag(&self, from: usize, name: &str, nested: bool) -> Option<usize> {
        let lower = self.lower.as_str();
        let mut depth = 0usize;
        let mut at = from;

        while let Some(offset) = lower[at..].find('<') {
            let start = at + offset;
            if self.is_inert(start) {
                at = start + 1;
                continue;
            }
            let rest = &lower[start..];
            if rest.starts_with("</") && is_tag_named(&rest[2..], name) {
                if depth == 0 {
                    return Some(start);
                }
                depth -= 1;
            } else if nested && is_tag_named(&rest[1..], name) {
                depth += 1;
            }
            at = start + 1;
        }

        None
    }
}

// "div class=x>" is named "div"; "divider>" is not
fn is_tag_named(rest: &str, name: &str) -> bool {
    rest.strip_prefix(name).is_some_and(|after| {
        after.is_empty() || after.starts_with(|c: char| c == '>' || c == '/' || c.is_ascii_whitespace())
    })
}

fn selector_for(id: &str) -> Result<Selector, PageError> {
    if id.is_empty() || id.contains(|c: char| c.is_whitespace() || c == '"' || c == '\'') {
        return Err(PageError::InvalidId(id.to_string()));
    }
    Selector::parse(&format!("[id=\"{id}\"]")).map_err(|_| PageError::InvalidId(id.to_string()))
}

fn find_element<'a>(document: &'a Html, id: &str) -> Result<ElementRef<'a>, PageError> {
    let selector = selector_for(id)?;
    document
        .select(&selector)
        .next()
        .ok_or_else(|| PageError::MissingElement(id.to_string()))
}

// The opening tag of element `id`, which must be the element scraper parsed
fn locate_element(document: &Html, scan: &SourceScan<'_>, id: &str) -> Result<Range<usize>, PageError> {
    let element = find_element(document, id)?;
    let tag = scan
        .open_tag(id)
        .ok_or_else(|| PageError::Unlocatable(id.to_string()))?;

    if !tag_name(&scan.source[tag.clone()]).eq_ignore_ascii_case(element.value().name()) {
        return Err(PageError::Unlocatable(id.to_string()));
    }
    Ok(tag)
}

fn read_template(document: &Html, scan: &SourceScan<'_>, id: &str) -> Result<CardTemplate, PageError> {
    let element = find_element(document, id)?;
    if element.value().name() != "template" {
        return Err(PageError::NotATemplate(id.to_string()));
    }

    let open = locate_element(document, scan, id)?;
    let close = scan
        .close_tag(open.end, "template", true)
        .ok_or_else(|| PageError::Unlocatable(id.to_string()))?;

    let template = CardTemplate::new(scan.source[open.end..close].trim());
    debug!(id, bytes = template.markup().len(), "read card template");
    Ok(template)
}

// Offset inside an opening tag where a new attribute can go: before `>` or `/>`
fn attribute_insert_point(tag: &str) -> usize {
    let trimmed = tag.trim_end_matches('>');
    let trimmed = trimmed.trim_end_matches('/');
    trimmed.trim_end().len()
}

// "<div class=x>" -> "div"
fn tag_name(tag: &str) -> &str {
    let name = tag.trim_start_matches('<');
    let end = name
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(name.len());
    &name[..end]
}

/// Removes every `hidden` attribute (with its value, if any) from an opening tag
fn strip_hidden_attribute(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut rest = tag;

    while let Some(at) = find_attribute(rest, "hidden") {
        // drop the whitespace before the attribute too
        out.push_str(&rest[..at - 1]);
        let after = &rest[at + "hidden".len()..];
        rest = &after[attribute_value_len(after)..];
    }

    out.push_str(rest);
    out
}

// Position of attribute `name` in a tag, ignoring quoted attribute values.
// The match is always preceded by one ASCII whitespace byte.
fn find_attribute(tag: &str, name: &str) -> Option<usize> {
    let bytes = tag.as_bytes();
    let mut quote: Option<u8> = None;

    for (i, &b) in bytes.iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None => {
                if i == 0 || !bytes[i - 1].is_ascii_whitespace() {
                    continue;
                }
                if !bytes[i..].starts_with(name.as_bytes()) {
                    continue;
                }
                match bytes.get(i + name.len()) {
                    None | Some(b'=' | b'>' | b'/') => return Some(i),
                    Some(c) if c.is_ascii_whitespace() => return Some(i),
                    Some(_) => {}
                }
            }
        }
    }

    None
}

// Length of `="value"`, `='value'` or `=value` at the start of `after`, or 0
fn attribute_value_len(after: &str) -> usize {
    let Some(value) = after.strip_prefix('=') else {
        return 0;
    };

    match value.chars().next() {
        Some(q @ ('"' | '\'')) => match value[1..].find(q) {
            Some(close) => 1 + 1 + close + 1,
            None => after.len(),
        },
        _ => {
            1 + value
                .find(|c: char| c.is_whitespace() || c == '>')
                .unwrap_or(value.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnimationConfig;
    use crate::page::card::CardContent;
    use crate::page::section::SectionKind;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<body>
  <template id="repo-card-template">
    <div class="card card--async {{state}}" style="animation-delay: {{animation_delay}}"><a href="{{url}}">{{name}}</a></div>
  </template>
  <template id="gist-card-template">
    <div class="card {{state}}"><h5>{{title}}</h5></div>
  </template>
  <div class="row" id="my-pinned-repos"></div>
  <div class="alert alert-danger" id="pinned-repos-errors" hidden="hidden"></div>
  <div class="row" id="my-gists"><!-- gists --></div>
  <p class="alert" id='gists-errors' hidden>Loading failed</p>
</body>
</html>
"#;

    fn page() -> HostPage {
        HostPage::parse(PAGE, &DomContract::default()).unwrap()
    }

    fn sections(page: &HostPage) -> PageSections {
        let animation = AnimationConfig::default();
        PageSections {
            repos: Section::new(SectionKind::Repos, page.repo_template().instantiate(2, &animation)),
            gists: Section::new(SectionKind::Gists, page.gist_template().instantiate(1, &animation)),
        }
    }

    #[test]
    fn test_parse_reads_templates() {
        let page = page();
        assert!(page.repo_template().markup().starts_with(r#"<div class="card card--async {{state}}""#));
        assert_eq!(page.gist_template().markup(), r#"<div class="card {{state}}"><h5>{{title}}</h5></div>"#);
    }

    #[test]
    fn test_parse_missing_container() {
        let source = PAGE.replace("my-gists", "somewhere-else");
        let err = HostPage::parse(source, &DomContract::default()).unwrap_err();
        assert!(matches!(err, PageError::MissingElement(id) if id == "my-gists"));
    }

    #[test]
    fn test_parse_rejects_non_template() {
        let dom = DomContract {
            gist_template: "my-gists".to_string(),
            ..Default::default()
        };
        let err = HostPage::parse(PAGE, &dom).unwrap_err();
        assert!(matches!(err, PageError::NotATemplate(_)));
    }

    #[test]
    fn test_render_inserts_cards_and_keeps_the_rest() {
        let page = page();
        let mut sections = sections(&page);
        let cards = sections.repos.take_cards();
        sections.repos.set_cards(vec![cards[0]
            .clone()
            .populate(CardContent::new().slot("name", "mini-pomodoro").slot("url", "https://github.com/jens1101/mini-pomodoro"))]);

        let html = page.render(&sections);

        assert!(html.contains(
            "<div class=\"row\" id=\"my-pinned-repos\">\n<div class=\"card card--async \" style=\"animation-delay: -2s\"><a href=\"https://github.com/jens1101/mini-pomodoro\">mini-pomodoro</a></div></div>"
        ));
        assert!(html.contains(
            "<div class=\"row\" id=\"my-gists\">\n<div class=\"card card--loading\"><h5></h5></div><!-- gists --></div>"
        ));
        // untouched parts survive as written
        assert!(html.starts_with("<!DOCTYPE html>\n<html>"));
        assert!(html.contains(r#"<div class="alert alert-danger" id="pinned-repos-errors" hidden="hidden"></div>"#));
    }

    #[test]
    fn test_render_failed_section() {
        let page = page();
        let mut sections = sections(&page);
        sections.gists.fail(&"Could not retrieve <gists>");

        let html = page.render(&sections);

        assert!(html.contains(r#"<div class="row" id="my-gists" hidden>"#));
        assert!(html.contains(r#"<p class="alert" id='gists-errors'>Could not retrieve &lt;gists&gt;</p>"#));
        // the repo section is unaffected
        assert!(html.contains(r#"<div class="row" id="my-pinned-repos">"#));
        assert!(html.contains(r#"id="pinned-repos-errors" hidden="hidden""#));
    }

    #[test]
    fn test_locate_skips_data_attributes() {
        let source = r#"<a data-id="x">one</a><b id="x">two</b>"#;
        let range = SourceScan::new(source).open_tag("x").unwrap();
        assert_eq!(&source[range], r#"<b id="x">"#);
    }

    #[test]
    fn test_locate_skips_comments_scripts_and_template_content() {
        let source = r#"<!-- old layout: <div id="x"> -->
<script>const html = '<p id="x">';</script>
<template id="t"><i id="x"></i></template>
<b id="x">two</b>"#;
        let range = SourceScan::new(source).open_tag("x").unwrap();
        assert_eq!(&source[range], r#"<b id="x">"#);
    }

    #[test]
    fn test_render_ignores_commented_out_container() {
        let source = PAGE.replace(
            "<body>",
            "<body>\n  <!-- old layout: <div id=\"my-gists\"> -->",
        );
        let page = HostPage::parse(source, &DomContract::default()).unwrap();
        let html = page.render(&sections(&page));

        assert!(html.contains(r#"<!-- old layout: <div id="my-gists"> -->"#));
        assert!(html.contains(
            "<div class=\"row\" id=\"my-gists\">\n<div class=\"card card--loading\"><h5></h5></div><!-- gists --></div>"
        ));
    }

    #[test]
    fn test_template_markup_is_taken_verbatim() {
        let source = PAGE.replace(
            r#"<div class="card {{state}}"><h5>{{title}}</h5></div>"#,
            r#"<div class="card" style="x" data-a="1" title="t"><br><h5>&amp; {{title}}</h5></div>"#,
        );
        let first = HostPage::parse(source.as_str(), &DomContract::default()).unwrap();
        let second = HostPage::parse(source.as_str(), &DomContract::default()).unwrap();

        assert_eq!(
            first.gist_template().markup(),
            r#"<div class="card" style="x" data-a="1" title="t"><br><h5>&amp; {{title}}</h5></div>"#
        );
        assert_eq!(first.gist_template(), second.gist_template());
    }

    #[test]
    fn test_alert_close_tag_is_matched_by_name() {
        let source = PAGE
            .replace(
                "<p class=\"alert\" id='gists-errors' hidden>Loading failed</p>",
                "<p class=\"alert\" id='gists-errors' hidden><pre>trace</pre> failed</p>",
            )
            .replace(
                r#"hidden="hidden"></div>"#,
                r#"hidden="hidden"><div>old</div> text</div>"#,
            );
        let page = HostPage::parse(source, &DomContract::default()).unwrap();
        let mut sections = sections(&page);
        sections.gists.fail(&"Could not retrieve gists");
        sections.repos.fail(&"Could not retrieve repositories");

        let html = page.render(&sections);

        assert!(html.contains(r#"<p class="alert" id='gists-errors'>Could not retrieve gists</p>"#));
        assert!(html.contains(
            r#"<div class="alert alert-danger" id="pinned-repos-errors">Could not retrieve repositories</div>"#
        ));
        assert!(!html.contains("trace"));
        assert!(!html.contains("old"));
    }

    #[test]
    fn test_strip_hidden_attribute() {
        assert_eq!(strip_hidden_attribute(r#"<div id="a" hidden>"#), r#"<div id="a">"#);
        assert_eq!(strip_hidden_attribute(r#"<div hidden="hidden" id="a">"#), r#"<div id="a">"#);
        assert_eq!(strip_hidden_attribute("<div hidden=''/>"), "<div/>");
        // class values and similar names are left alone
        assert_eq!(
            strip_hidden_attribute(r#"<div class="x hidden" data-hidden="1">"#),
            r#"<div class="x hidden" data-hidden="1">"#
        );
    }

    #[test]
    fn test_attribute_insert_point() {
        assert_eq!(attribute_insert_point("<div id=\"a\">"), 11);
        assert_eq!(attribute_insert_point("<div id=\"a\" />"), 11);
    }
}
