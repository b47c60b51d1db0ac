//! CSS selectors for the supported archive sites
//!
//! Each site lists its archive entries and article bodies with a different
//! HTML shape. The shapes are captured here once and handed to the archive
//! parser through [`SiteSelectors`].

use lazy_static::lazy_static;
use scraper::Selector;

use crate::models::SiteKind;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    // Diario Correo archive: one div.story-item per entry
    static ref CORREO_ITEM: Selector = parse_selector!("div.story-item");
    static ref CORREO_TITLE: Selector = parse_selector!("h2.story-item__content-title a");
    static ref CORREO_SECTION: Selector = parse_selector!("a.story-item__section");
    static ref CORREO_BODY: Selector = parse_selector!("div.story-contents__content");
    static ref CORREO_NOISE: Vec<Selector> = vec![
        parse_selector!("script"),
        parse_selector!("style"),
    ];

    // Peru21 archive: Drupal node teasers, paginated with rel=next
    static ref PERU21_ITEM: Selector = parse_selector!("article[data-history-node-id]");
    static ref PERU21_LINK: Selector = parse_selector!("a[href]");
    static ref PERU21_TITLE: Selector = parse_selector!("h2");
    static ref PERU21_SECTION: Selector = parse_selector!("div.field--name-field-seccion a");
    static ref PERU21_DATE: Selector =
        parse_selector!("div.field--name-field-fecha-actualizacion");
    static ref PERU21_NEXT: Selector = parse_selector!("a[rel='next']");
    static ref PERU21_BODY: Selector = parse_selector!("div.field--name-body");
    static ref PERU21_NOISE: Vec<Selector> = vec![
        parse_selector!("script"),
        parse_selector!("style"),
        parse_selector!("article"),
    ];
}

/// Selector set describing one site's archive and article layout
pub struct SiteSelectors {
    /// One match per listed entry
    pub item: &'static Selector,
    /// Element holding the entry title, searched inside `item`
    pub title: &'static Selector,
    /// Element holding the entry link, searched inside `item`
    pub link: &'static Selector,
    /// Section label inside `item`
    pub section: &'static Selector,
    /// Per-entry publish date inside `item`, when the site shows one
    pub date: Option<&'static Selector>,
    /// Link to the next archive page, when the site paginates
    pub next_page: Option<&'static Selector>,
    /// Article body container
    pub body: &'static Selector,
    /// Elements inside the body whose text is discarded
    pub body_noise: &'static [Selector],
}

impl SiteSelectors {
    pub fn for_site(kind: SiteKind) -> Self {
        match kind {
            SiteKind::DiarioCorreo => Self {
                item: &CORREO_ITEM,
                title: &CORREO_TITLE,
                link: &CORREO_TITLE,
                section: &CORREO_SECTION,
                date: None,
                next_page: None,
                body: &CORREO_BODY,
                body_noise: &CORREO_NOISE,
            },
            SiteKind::Peru21 => Self {
                item: &PERU21_ITEM,
                title: &PERU21_TITLE,
                link: &PERU21_LINK,
                section: &PERU21_SECTION,
                date: Some(&*PERU21_DATE),
                next_page: Some(&*PERU21_NEXT),
                body: &PERU21_BODY,
                body_noise: &PERU21_NOISE,
            },
        }
    }

    /// Whether the site spreads one day over several archive pages
    pub fn paginates(&self) -> bool {
        self.next_page.is_some()
    }
}
