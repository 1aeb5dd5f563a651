use super::html_site::{FieldRule, SiteLayout};

pub const LIPUTAN6: SiteLayout = SiteLayout {
    site_name: "Liputan6",
    item: "div.headline--main__wrapper",
    title: FieldRule::Text("h1.headline--main__title"),
    description: FieldRule::Text("p.headline--main__short-desc"),
    published_at: FieldRule::Attr("time.timeago", "datetime"),
};

pub const BISNIS: SiteLayout = SiteLayout {
    site_name: "Bisnis",
    item: "li.big.style2",
    title: FieldRule::Attr("h2 a.bigteks", "title"),
    description: FieldRule::Text("div.description"),
    published_at: FieldRule::Text("div.channel div.date"),
};

// Class names carry build hashes and break whenever the site redeploys.
pub const ABC_INDONESIAN: SiteLayout = SiteLayout {
    site_name: "ABC News",
    item: r#"div[data-id="103068804"].GenericCard_card__oqpe3"#,
    title: FieldRule::Text("a.GenericCard_link__EMXqX"),
    description: FieldRule::Text("div.Typography_base__sj2RP.GenericCard_synopsis__mgnzs"),
    published_at: FieldRule::Text("time.Typography_base__sj2RP.DynamicTimestamp_printDate__OVPa2"),
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::HtmlSiteExtractor;
    use crate::types::Extractor;

    fn extract(layout: SiteLayout, html: &str) -> Vec<crate::types::Record> {
        HtmlSiteExtractor::new(layout).unwrap().extract(html)
    }

    #[test]
    fn liputan6_headline() {
        let html = r#"
            <html><head><title>Liputan6.com</title></head><body>
                <div class="headline--main__wrapper">
                    <h1 class="headline--main__title">Test Title</h1>
                    <p class="headline--main__short-desc">Test Description</p>
                    <time class="timeago" datetime="2023-01-01T12:00:00">2 jam lalu</time>
                </div>
                <div class="headline--main__wrapper"></div>
            </body></html>
        "#;

        let records = extract(LIPUTAN6, html);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source_name(), "Liputan6.com");
        assert_eq!(records[0].title(), "Test Title");
        assert_eq!(records[0].description(), "Test Description");
        assert_eq!(records[0].published_at(), "2023-01-01T12:00:00");
    }

    #[test]
    fn bisnis_big_items() {
        let html = r#"
            <html><head><title>Bisnis.com</title></head><body><ul>
                <li class="big style2">
                    <div class="channel"><div class="date">01 Jan 2023 | 10:00 WIB</div></div>
                    <h2><a class="bigteks" title="Rupiah Menguat" href="/a">Rupiah Menguat</a></h2>
                    <div class="description">Nilai tukar rupiah menguat pagi ini.</div>
                </li>
                <li class="big style2">
                    <h2><a class="bigteks" href="/b">No title attribute</a></h2>
                    <div class="description">Skipped.</div>
                </li>
            </ul></body></html>
        "#;

        let records = extract(BISNIS, html);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title(), "Rupiah Menguat");
        assert_eq!(records[0].published_at(), "01 Jan 2023 | 10:00 WIB");
    }

    #[test]
    fn abc_cards() {
        let html = r#"
            <html><body>
                <div data-id="103068804" class="GenericCard_card__oqpe3">
                    <a class="GenericCard_link__EMXqX" href="/x">Berita Utama</a>
                    <div class="Typography_base__sj2RP GenericCard_synopsis__mgnzs">Ringkasan berita.</div>
                    <time class="Typography_base__sj2RP DynamicTimestamp_printDate__OVPa2">Sun 1 Jan</time>
                </div>
                <div data-id="999" class="GenericCard_card__oqpe3">
                    <a class="GenericCard_link__EMXqX" href="/y">Other card</a>
                </div>
            </body></html>
        "#;

        let records = extract(ABC_INDONESIAN, html);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source_name(), "ABC News");
        assert_eq!(records[0].title(), "Berita Utama");
        assert_eq!(records[0].published_at(), "Sun 1 Jan");
    }
}
