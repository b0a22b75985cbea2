//! Markup rendering for the card grid.
//!
//! Fragments live in `templates/partials/` and are compiled by askama, which
//! HTML-escapes every interpolated value.

use askama::Template;

use super::{Card, GridView};

/// Icon shown when an asset image fails to load: a grey circle with a `?`.
pub const PLACEHOLDER_ICON: &str = "data:image/svg+xml;base64,PHN2ZyB3aWR0aD0iNDAiIGhlaWdodD0iNDAiIHZpZXdCb3g9IjAgMCA0MCA0MCIgZmlsbD0ibm9uZSI+PGNpcmNsZSBjeD0iMjAiIGN5PSIyMCIgcj0iMjAiIGZpbGw9IiNmMGYwZjAiLz48dGV4dCB4PSI1MCUiIHk9IjUwJSIgZm9udC1mYW1pbHk9IkFyaWFsIiBmb250LXNpemU9IjEyIiBmaWxsPSIjOTk5IiB0ZXh0LWFuY2hvcj0ibWlkZGxlIiBkb21pbmFudC1iYXNlbGluZT0ibWlkZGxlIj4/PC90ZXh0Pjwvc3ZnPg==";

#[derive(Template)]
#[template(path = "partials/loading.html")]
struct LoadingFragment;

#[derive(Template)]
#[template(path = "partials/no_results.html")]
struct NoResultsFragment<'a> {
    term: &'a str,
}

#[derive(Template)]
#[template(path = "partials/card.html")]
struct CardFragment<'a> {
    card: &'a Card,
    classes: String,
    placeholder: &'static str,
}

impl<'a> CardFragment<'a> {
    fn new(card: &'a Card) -> Self {
        let mut classes = vec!["crypto-card"];
        if card.updated {
            classes.push("updated");
        }
        if let Some(splash) = card.splash_class {
            classes.push(splash);
        }
        Self {
            card,
            classes: classes.join(" "),
            placeholder: PLACEHOLDER_ICON,
        }
    }
}

/// Render a grid into markup.
pub fn render_html(grid: &GridView) -> Result<String, askama::Error> {
    match grid {
        GridView::Loading => LoadingFragment.render(),
        GridView::NoResults { term } => NoResultsFragment { term }.render(),
        GridView::Cards(cards) => {
            let mut html = String::new();
            for card in cards {
                html.push_str(&CardFragment::new(card).render()?);
                html.push('\n');
            }
            Ok(html)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::AssetId;

    fn card() -> Card {
        Card {
            id: AssetId::from("bitcoin"),
            name: "Bitcoin".into(),
            symbol: "BTC".into(),
            image: "https://img/btc.png".into(),
            price_text: "$45,231.50".into(),
            change_text: "+1.25%".into(),
            change_class: "positive",
            updated: true,
            splash_class: Some("price-splash-up"),
        }
    }

    fn render(grid: &GridView) -> String {
        render_html(grid).unwrap()
    }

    #[test]
    fn test_loading_placeholder() {
        let html = render(&GridView::Loading);
        assert!(html.contains(r#"class="loading""#));
        assert!(html.contains("Waiting for data..."));
    }

    #[test]
    fn test_no_results_contains_literal_term() {
        let html = render(&GridView::NoResults { term: "shib".into() });
        assert!(html.contains(r#"No results for "shib""#));
    }

    #[test]
    fn test_no_results_escapes_term() {
        let html = render(&GridView::NoResults {
            term: "<script>".into(),
        });
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_card_markup() {
        let html = render(&GridView::Cards(vec![card()]));
        assert!(html.contains(r#"class="crypto-card updated price-splash-up""#));
        assert!(html.contains(r#"data-id="bitcoin""#));
        assert!(html.contains(r#"alt="Bitcoin""#));
        assert!(html.contains(PLACEHOLDER_ICON));
        assert!(html.contains(">Bitcoin</div>"));
        assert!(html.contains(">BTC</div>"));
        assert!(html.contains(r#"<div class="price-value">$45,231.50</div>"#));
        assert!(html.contains(r#"<div class="price-change positive">+1.25%</div>"#));
    }

    #[test]
    fn test_settled_card_has_plain_class() {
        let mut c = card();
        c.updated = false;
        c.splash_class = None;
        let html = render(&GridView::Cards(vec![c]));
        assert!(html.contains(r#"class="crypto-card" "#));
    }

    #[test]
    fn test_cards_rendered_in_order() {
        let mut second = card();
        second.id = AssetId::from("ethereum");
        second.name = "Ethereum".into();
        let html = render(&GridView::Cards(vec![card(), second]));
        let btc = html.find("Bitcoin").unwrap();
        let eth = html.find("Ethereum").unwrap();
        assert!(btc < eth);
    }

    #[test]
    fn test_feed_text_escaped_in_content_and_attributes() {
        let mut c = card();
        c.name = r#"Bit"coin <b>&"#.into();
        let html = render(&GridView::Cards(vec![c]));
        assert!(html.contains(r#"title="Bit&quot;coin &lt;b&gt;&amp;""#));
        assert!(html.contains(">Bit&quot;coin &lt;b&gt;&amp;</div>"));
        assert!(!html.contains("<b>"));
    }
}
