use crate::types::{AggregatorError, Extractor, Record, Result};
use interfaces::ValidationError;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Where one record field lives inside a candidate item.
#[derive(Debug, Clone, Copy)]
pub enum FieldRule {
    /// Text content of the first element matching the selector.
    Text(&'static str),
    /// Attribute value of the first element matching the selector.
    Attr(&'static str, &'static str),
}

/// Static description of a news site's front-page markup.
#[derive(Debug, Clone, Copy)]
pub struct SiteLayout {
    pub site_name: &'static str,
    pub item: &'static str,
    pub title: FieldRule,
    pub description: FieldRule,
    pub published_at: FieldRule,
}

struct CompiledField {
    selector: Selector,
    attr: Option<&'static str>,
}

impl CompiledField {
    fn compile(rule: FieldRule) -> Result<Self> {
        let (css, attr) = match rule {
            FieldRule::Text(css) => (css, None),
            FieldRule::Attr(css, attr) => (css, Some(attr)),
        };
        Ok(Self {
            selector: compile_selector(css)?,
            attr,
        })
    }

    /// Missing elements and attributes read as an empty string.
    fn read(&self, item: ElementRef<'_>) -> String {
        let Some(element) = item.select(&self.selector).next() else {
            return String::new();
        };
        match self.attr {
            Some(attr) => element.value().attr(attr).unwrap_or_default().trim().to_string(),
            None => element_text(element),
        }
    }
}

fn compile_selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| AggregatorError::General(format!("invalid selector `{}`: {}", css, e)))
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// CSS-selector driven extractor for one [`SiteLayout`].
pub struct HtmlSiteExtractor {
    layout: SiteLayout,
    head_title: Selector,
    item: Selector,
    title: CompiledField,
    description: CompiledField,
    published_at: CompiledField,
}

impl HtmlSiteExtractor {
    pub fn new(layout: SiteLayout) -> Result<Self> {
        Ok(Self {
            layout,
            head_title: compile_selector("head > title")?,
            item: compile_selector(layout.item)?,
            title: CompiledField::compile(layout.title)?,
            description: CompiledField::compile(layout.description)?,
            published_at: CompiledField::compile(layout.published_at)?,
        })
    }

    fn site_name(&self, document: &Html) -> String {
        document
            .select(&self.head_title)
            .next()
            .map(element_text)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.layout.site_name.to_string())
    }

    fn extract_item(
        &self,
        item: ElementRef<'_>,
        site_name: &str,
    ) -> std::result::Result<Record, ValidationError> {
        Record::new(
            site_name,
            self.title.read(item),
            self.description.read(item),
            self.published_at.read(item),
        )
    }
}

impl Extractor for HtmlSiteExtractor {
    fn name(&self) -> &str {
        self.layout.site_name
    }

    fn extract(&self, raw_content: &str) -> Vec<Record> {
        let document = Html::parse_document(raw_content);
        let site_name = self.site_name(&document);

        let mut records = Vec::new();
        for item in document.select(&self.item) {
            match self.extract_item(item, &site_name) {
                Ok(record) => records.push(record),
                Err(e) => debug!(site = self.layout.site_name, error = %e, "skipping incomplete item"),
            }
        }

        debug!(
            site = self.layout.site_name,
            records = records.len(),
            parse_errors = document.errors.len(),
            "extracted"
        );
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: SiteLayout = SiteLayout {
        site_name: "Fallback",
        item: "div.card",
        title: FieldRule::Text("h3"),
        description: FieldRule::Text("p"),
        published_at: FieldRule::Attr("time", "datetime"),
    };

    #[test]
    fn skips_only_the_broken_item() {
        let html = r#"
            <html><head><title>Example Site</title></head><body>
                <div class="card"><h3>First</h3><p>One</p><time datetime="t1"></time></div>
                <div class="card"><h3>Broken</h3><time datetime="t2"></time></div>
                <div class="card"><h3>Third</h3><p>Three</p><time datetime="t3"></time></div>
            </body></html>
        "#;

        let records = HtmlSiteExtractor::new(LAYOUT).unwrap().extract(html);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title(), "First");
        assert_eq!(records[1].title(), "Third");
        assert!(records.iter().all(|r| r.source_name() == "Example Site"));
    }

    #[test]
    fn falls_back_to_layout_name_without_head_title() {
        let html = r#"<div class="card"><h3>T</h3><p>D</p><time datetime="x"></time></div>"#;
        let records = HtmlSiteExtractor::new(LAYOUT).unwrap().extract(html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source_name(), "Fallback");
    }

    #[test]
    fn garbage_input_yields_nothing() {
        let extractor = HtmlSiteExtractor::new(LAYOUT).unwrap();
        assert!(extractor.extract("").is_empty());
        assert!(extractor.extract("<<<not html>>>").is_empty());
    }

    #[test]
    fn invalid_selector_fails_at_construction() {
        let layout = SiteLayout {
            item: "div[",
            ..LAYOUT
        };
        assert!(HtmlSiteExtractor::new(layout).is_err());
    }
}
