use eml_analyzer::extracted::*;

const SAMPLE_HTML: &str = r#"
        https://www.unittest.de/test
        <img src=3D"cid:ae0357e57f04b8347f7621662cb63855.gif">
        <a class="clearLink" href="https://test-link2.com"/>
        <img src="https://www.reloaded-domain.com/abc.png"/>
        "#;

// --- Reloaded content ---

#[test]
fn test_reloaded_content_skips_cid() {
    let sources = reloaded_content_from_html(SAMPLE_HTML);
    assert_eq!(sources, ["https://www.reloaded-domain.com/abc.png"]);
}

#[test]
fn test_reloaded_content_scenario() {
    let html = r#"<img src="cid:abc.gif"><a href="https://x.com"/><img src="https://reload.example/px.png"/>"#;

    assert_eq!(
        reloaded_content_from_html(html),
        ["https://reload.example/px.png"]
    );
    let urls = embedded_urls_from_html(html);
    assert_eq!(urls.len(), 1);
    assert!(urls.contains("https://x.com"));
}

#[test]
fn test_reloaded_content_attribute_variants() {
    let html = "<IMG SRC='https://a.example/1.png'>\
                <td Background=\"https://a.example/bg.jpg\">\
                <img src=\"data:image/png;base64,iVBORw0KGgo=\">\
                <img src=\"CID:upper.png\">\
                <img data-src=\"https://lazy.example/never.png\">\
                <img src=\"https://a.example/1.png\">";

    assert_eq!(
        reloaded_content_from_html(html),
        [
            "https://a.example/1.png",
            "https://a.example/bg.jpg",
            "https://a.example/1.png",
        ]
    );
}

#[test]
fn test_reloaded_content_is_percent_decoded() {
    let html = r#"<img src="https://t.example/open?u=a%40b.com&amp;id=%E2%9C%93">"#;

    assert_eq!(
        reloaded_content_from_html(html),
        ["https://t.example/open?u=a@b.com&amp;id=✓"]
    );
}

#[test]
fn test_html_without_reloaded_content() {
    let html = r#"<img src="https://a.example/x.png" alt="x">"#;
    assert_eq!(html_without_reloaded_content(html), r#"<img alt="x">"#);
}

// --- Attribute links ---

#[test]
fn test_clickable_urls_from_html() {
    let found = clickable_urls_from_html(SAMPLE_HTML);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].url, "https://test-link2.com");
    assert_eq!(found[0].original, "https://test-link2.com");
}

#[test]
fn test_clickable_urls_are_unescaped_and_decoded() {
    let html = r#"<a href="https://x.example/?a=1&amp;b=%20two&c=3">x</a>"#;
    let found = clickable_urls_from_html(html);

    assert_eq!(found[0].url, "https://x.example/?a=1&b= two&c=3");
    assert_eq!(found[0].original, "https://x.example/?a=1&amp;b=%20two&c=3");
}

#[test]
fn test_character_references_in_links() {
    let html = r#"<a href="https://x.example/&#0;">a</a>
        <a href="https://x.example/?a=1&ampb=2&lang=en">b</a>
        <a href="https://x.example/&#x41&#150;&#1;">c</a>
        <a href="https://x.example/&AElig;&copy">d</a>"#;
    let urls: Vec<String> = clickable_urls_from_html(html)
        .into_iter()
        .map(|found| found.url)
        .collect();

    assert_eq!(
        urls,
        [
            "https://x.example/\u{fffd}",
            "https://x.example/?a=1&b=2&lang=en",
            "https://x.example/A\u{2013}",
            "https://x.example/\u{c6}\u{a9}",
        ]
    );
}

#[test]
fn test_safelink_original_source() {
    let html = r#"<a href='https://eur01.safelinks.protection.outlook.com/?url=https%3A%2F%2Freal.example%2F' originalsrc="https://real.example/">link</a>"#;
    let urls = embedded_urls_from_html(html);

    assert_eq!(urls.len(), 2);
    assert!(urls.contains("https://eur01.safelinks.protection.outlook.com/?url=https://real.example/"));
    assert!(urls.contains("https://real.example/"));
}

#[test]
fn test_href_requires_leading_space() {
    let html = r#"<a data-href="https://hidden.example/">x</a>"#;
    assert!(clickable_urls_from_html(html).is_empty());
}

#[test]
fn test_anchor_text_is_not_reported_twice() {
    let html = r#"<a href="https://x.example/page">https://x.example/page</a>"#;
    let urls = embedded_urls_from_html(html);

    assert_eq!(urls.len(), 1);
    assert!(urls.contains("https://x.example/page"));
}

#[test]
fn test_image_source_is_not_clickable() {
    let html = r#"<p>Hello</p><img src="https://img.example/pixel.gif">"#;
    assert!(embedded_urls_from_html(html).is_empty());
}

#[test]
fn test_html_without_found_urls() {
    let found = vec![
        FoundUrl {
            url: "https://x.example".into(),
            original: "https://x.example".into(),
        },
        FoundUrl {
            url: "https://x.example/long".into(),
            original: "https://x.example/long".into(),
        },
    ];
    let html = r#"<a href="https://x.example/long">https://x.example</a>"#;

    assert_eq!(html_without_found_urls(html, &found), r#"<a href=""></a>"#);
}

#[test]
fn test_longer_url_sharing_a_link_prefix_is_kept() {
    let html = r#"<a href="https://a.com/x">see https://a.com/xyz today</a>"#;
    let urls = embedded_urls_from_html(html);

    assert_eq!(urls.len(), 2);
    assert!(urls.contains("https://a.com/x"));
    assert!(urls.contains("https://a.com/xyz"));
}

// --- Freeform text ---

#[test]
fn test_urls_from_text() {
    let urls = urls_from_text(SAMPLE_HTML);

    assert_eq!(urls.len(), 3);
    assert_eq!(urls[0], "https://www.unittest.de/test");
    assert_eq!(urls[1], "https://test-link2.com");
    assert_eq!(urls[2], "https://www.reloaded-domain.com/abc.png\"/>");
}

#[test]
fn test_urls_from_text_needs_scheme() {
    assert!(urls_from_text("facebook.com/asdasd and www.example.com").is_empty());
}

#[test]
fn test_urls_from_text_schemes() {
    let urls = urls_from_text("FTP://files.example.org/a.zip ftps://secure.example.net http://plain.io");

    assert_eq!(
        urls,
        [
            "FTP://files.example.org/a.zip",
            "ftps://secure.example.net",
            "http://plain.io",
        ]
    );
}

#[test]
fn test_urls_from_text_keeps_trailing_markup() {
    let urls = urls_from_text("<p>see https://a.com/test</p> now");
    assert_eq!(urls, ["https://a.com/test</p>"]);
}
