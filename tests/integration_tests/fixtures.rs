//! Test fixtures for integration tests
//!
//! Mock knowledge-base answers for a small architecture vocabulary
//! (lexical) and a labour-law vocabulary (taxonomic).

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{literal, mount_ask, mount_fallbacks, mount_select, tagged, uri};

/// Dictionary page for "architettura"
pub const ARCHITETTURA_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
<div class="mw-heading mw-heading2"><h2 id="Italian">Italian</h2></div>
<div class="mw-heading mw-heading3"><h3 id="Etymology">Etymology</h3></div>
<p>Borrowed from Latin <i>architectūra</i>.</p>
<div class="mw-heading mw-heading3"><h3 id="Noun">Noun</h3></div>
<p><strong class="Latn headword" lang="it">architettura</strong>&nbsp;<span class="gender"><abbr>f</abbr></span> (<i>plural</i> <b>architetture</b>)</p>
<ol><li>architecture</li></ol>
</body></html>"#;

pub fn entity(id: &str) -> serde_json::Value {
    uri(&format!("http://www.wikidata.org/entity/{id}"))
}

/// "architettura" resolves to Q12280 under "architecture" (Q12271) with an
/// Italian and an English article; "colonna" resolves but matches no anchor.
pub async fn mount_architecture(server: &MockServer) {
    mount_select(server, "\"architettura\"@it", vec![json!({ "item": entity("Q12280") })]).await;
    mount_select(server, "\"colonna\"@it", vec![json!({ "item": entity("Q4202") })]).await;
    mount_ask(server, "wd:Q12280 (wdt:P361|wdt:P279|wdt:P31)+ wd:Q12271", true).await;
    mount_select(
        server,
        "schema:about wd:Q12280",
        vec![
            json!({
                "article": uri("https://it.wikipedia.org/wiki/Architettura"),
                "lang": literal("it"),
                "name": tagged("architettura", "it"),
            }),
            json!({
                "article": uri("https://en.wikipedia.org/wiki/Architecture"),
                "lang": literal("en"),
                "name": tagged("architecture", "en"),
            }),
        ],
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/wiki/architettura"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARCHITETTURA_PAGE))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wiki/colonna"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;

    mount_fallbacks(server).await;
}

/// "law" resolves to Q7748 with labels and a broader concept; "annual leave"
/// resolves to Q13561011, which has no facts. Every entity is a "policy".
pub async fn mount_labour_law(server: &MockServer) {
    mount_select(server, "\"law\"@en", vec![json!({ "item": entity("Q7748") })]).await;
    mount_select(server, "\"annual leave\"@en", vec![json!({ "item": entity("Q13561011") })]).await;
    mount_ask(server, "+ wd:Q1156854", true).await;
    mount_select(
        server,
        "?kind ?target ?label",
        vec![
            json!({
                "kind": literal("broader"),
                "target": entity("Q2135465"),
                "label": tagged("legal concept", "en"),
            }),
            json!({
                "kind": literal("broader"),
                "target": entity("Q2135465"),
                "label": tagged("Rechtsbegriff", "de"),
            }),
            json!({
                "kind": literal("related"),
                "target": entity("Q628967"),
            }),
        ],
    )
    .await;
    mount_select(
        server,
        "schema:about wd:Q7748",
        vec![
            json!({
                "lang": literal("de"),
                "name": tagged("Recht", "de"),
                "desc": tagged("Gesamtheit von Normen", "de"),
            }),
            json!({
                "lang": literal("en"),
                "name": tagged("law", "en"),
                "desc": tagged("system of rules", "en"),
            }),
        ],
    )
    .await;

    mount_fallbacks(server).await;
}
