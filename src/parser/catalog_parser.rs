// Books to Scrape catalog page parsing
use crate::config::ExtractionPolicy;
use crate::model::{ListedBook, ParserError, Rating};
use crate::utils::{collapse_whitespace, first_decimal};
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

pub trait Parser {
    /// Decodes every catalog entry on the page, one result per entry, in page order.
    fn parse_items(&self, html: &str) -> Result<Vec<Result<ListedBook, ParserError>>, ParserError>;

    fn parse(&self, html: &str, policy: ExtractionPolicy) -> Result<Vec<ListedBook>, ParserError> {
        let items = self.parse_items(html)?;
        match policy {
            ExtractionPolicy::FailFast => items.into_iter().collect(),
            ExtractionPolicy::SkipInvalid => Ok(items
                .into_iter()
                .enumerate()
                .filter_map(|(index, item)| match item {
                    Ok(book) => Some(book),
                    Err(e) => {
                        warn!("Skipping catalog entry #{}: {}", index + 1, e);
                        None
                    }
                })
                .collect()),
        }
    }
}

pub struct CatalogParser {
    item: Selector,
    title: Selector,
    price: Selector,
    stock: Selector,
    rating: Selector,
}

impl CatalogParser {
    pub fn new() -> Result<Self, ParserError> {
        Ok(Self {
            item: compile("article.product_pod")?,
            title: compile("h3 > a")?,
            price: compile(".price_color")?,
            stock: compile(".availability")?,
            rating: compile("p.star-rating")?,
        })
    }

    fn parse_item(&self, element: ElementRef<'_>) -> Result<ListedBook, ParserError> {
        let title = element
            .select(&self.title)
            .next()
            .and_then(|a| a.value().attr("title"))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ParserError::MissingField("title"))?
            .to_string();

        let price_text = element
            .select(&self.price)
            .next()
            .map(|node| node.text().collect::<String>())
            .ok_or(ParserError::MissingField("price"))?;
        let price = first_decimal(price_text.trim()).ok_or_else(|| ParserError::InvalidField {
            field: "price",
            value: price_text.trim().to_string(),
        })?;

        let stock = element
            .select(&self.stock)
            .next()
            .map(|node| collapse_whitespace(&node.text().collect::<String>()))
            .filter(|s| !s.is_empty())
            .ok_or(ParserError::MissingField("stock"))?;

        let rating_node = element
            .select(&self.rating)
            .next()
            .ok_or(ParserError::MissingField("rating"))?;
        let rating = decode_rating(rating_node)?;

        Ok(ListedBook {
            title,
            price,
            stock,
            rating,
        })
    }
}

impl Parser for CatalogParser {
    fn parse_items(&self, html: &str) -> Result<Vec<Result<ListedBook, ParserError>>, ParserError> {
        let document = Html::parse_document(html);
        Ok(document
            .select(&self.item)
            .map(|element| self.parse_item(element))
            .collect())
    }
}

fn compile(selector: &str) -> Result<Selector, ParserError> {
    Selector::parse(selector).map_err(|e| ParserError::Selector(format!("{}: {}", selector, e)))
}

/// The rating is whichever class token is a rating word, e.g. `star-rating Three`.
/// Class order is not significant.
fn decode_rating(node: ElementRef<'_>) -> Result<Rating, ParserError> {
    let element = node.value();
    if let Some(rating) = element.classes().find_map(|class| class.parse::<Rating>().ok()) {
        return Ok(rating);
    }

    let mut others: Vec<&str> = element
        .classes()
        .filter(|class| *class != "star-rating")
        .collect();
    if others.is_empty() {
        return Err(ParserError::MissingField("rating"));
    }
    others.sort_unstable();
    Err(ParserError::InvalidField {
        field: "rating",
        value: others.join(" "),
    })
}
