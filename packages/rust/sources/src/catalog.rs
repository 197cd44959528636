//! Built-in source catalogs: the regular monitoring set and the Google News
//! backfill set.

use regwatch_shared::{Category, Priority, RegulationType, SourceDefinition};

/// Commentary, personnel, and media patterns that mark an entry as noise.
pub const GENERAL_EXCLUSIONS: &[&str] = &[
    // personnel
    "personnel",
    "appointment",
    "joins",
    "rejoins",
    "named",
    "promoted",
    // infrastructure
    "school bus",
    "electric vehicle",
    "ev charging",
    // general fraud
    "fraud",
    "accounting fraud",
    "misleading",
    "settlement payment",
    "charges against",
    // commodities
    "biodiesel",
    "renewable fuel",
    // academic
    "harvard law",
    "yale law",
    "stanford law",
    "columbia law",
    "law school",
    "law program",
    "environmental and energy law program",
    "certificate program",
    "continuing education",
    // commentary about regulation
    "investors concerned",
    "study shows",
    "survey finds",
    "report reveals",
    "companies struggle",
    "will reduce",
    "may impact",
    "could affect",
    "efrag study",
    "new research",
    "analysis shows",
    "experts say",
    "calls for",
    "demands",
    "urges",
    "recommends",
    // explainers
    "what is",
    "what are",
    "understanding",
    "explained",
    "primer on",
    "introduction to",
    "basics of",
    "overview of",
    "everything you need to know",
    "complete guide",
    "beginner's guide",
    // blogs
    "webinar",
    "podcast",
    "episode",
    "what employers need to know",
    "guide to",
    "how to",
    "what to do",
    "prepare for",
    "navigating",
    "back-to-school",
    "employer obligations",
    "compliance considerations",
    "what to know",
    "here's what",
    "growing concerned",
    "investors prioritize",
    "pressure leads to",
    "creating confusion",
    "emerging divergence",
    // law firm marketing
    "what it means for employers",
    "implications for employers",
    "key takeaways for",
    "employers should know",
    "practical guidance",
    "client alert",
    "legal update:",
    "advisory:",
    // media outlets
    "time magazine",
    "governing",
    "inquirer",
    "business wire",
    "hr dive",
    "hr digest",
    "business journals",
    "technical.ly",
    "the conversation",
    "esg today",
    "esg news",
    "sustainability magazine",
    // business commentary
    "are board diversity mandates legal",
    "employers can prepare",
    "use new pay transparency laws",
    "became the epicenter",
];

/// Terms that exempt an entry from [`GENERAL_EXCLUSIONS`].
pub const STRONG_REGULATORY_TERMS: &[&str] = &[
    "final rule",
    "proposed rule",
    "regulation",
    "sec adopts",
    "sec proposes",
    "sec finalizes",
    "epa adopts",
    "epa finalizes",
    "csrd",
    "issb",
    "tcfd",
    "sb 253",
    "sb 261",
    "esrs",
    "eeoc settlement",
    "consent decree",
    "doj announces",
    "sec charges",
    "court ruling",
    "injunction",
    "federal register",
    "judge blocks",
    "blocks enforcement",
    "halts",
    "stays",
    "overturns",
    "suspends",
    "bill passed",
    "law enacted",
    "legislation",
    "statute",
    "guidance issued",
    "directive",
    "mandate issued",
    "requirement published",
    "standard issued",
];

const REUTERS_LEGAL_FEED: &str = "https://www.reuters.com/rssfeed/legal";
const GOOGLE_NEWS_SEARCH: &str =
    "https://news.google.com/rss/search?q={query}&hl=en-US&gl=US&ceid=US:en";

const REUTERS_ENV_JUNK: &[&str] = &[
    "what companies should know",
    "what employers should know",
    "guide to",
    "how to",
    "countdown to",
];

const BACKFILL_JUNK: &[&str] = &[
    "what employers should know",
    "what companies should know",
    "guide to",
    "how to",
    "webinar",
    "podcast",
    "laboremploymentlawblog",
    "day 1",
    "rejoins",
    "deputy director",
];

const BACKFILL_MAX_ENTRIES: usize = 50;

// ---------------------------------------------------------------------------
// Regular catalog
// ---------------------------------------------------------------------------

/// Official regulator feeds plus filtered Reuters Legal coverage.
pub fn builtin_sources() -> Vec<SourceDefinition> {
    vec![
        official("sec-official", "SEC Official", Category::Environmental, "sec")
            .feed("https://www.sec.gov/news/pressreleases.rss")
            .include(&["climate", "esg", "sustainability", "greenhouse", "emissions", "disclosure"]),
        SourceDefinition::new("federal-register-sec", "Federal Register - SEC", Category::Environmental, "sec")
            .feed("https://www.federalregister.gov/documents/search.rss?conditions%5Bagencies%5D%5B%5D=securities-and-exchange-commission&conditions%5Bterm%5D=climate")
            .max_entries(10),
        SourceDefinition::new("federal-register-epa", "Federal Register - EPA", Category::Environmental, "federal")
            .feed("https://www.federalregister.gov/documents/search.rss?conditions%5Bagencies%5D%5B%5D=environmental-protection-agency&conditions%5Bterm%5D=climate")
            .max_entries(10),
        official("eurlex-official", "EUR-Lex Official", Category::Environmental, "eu")
            .feed("https://eur-lex.europa.eu/EN/display-feed.do?do-feed=allnew")
            .max_entries(30)
            .include(&["csrd", "esrs", "sustainability", "climate", "taxonomy", "esg"]),
        official("carb-official", "CARB Official", Category::Environmental, "california")
            .feed("https://ww2.arb.ca.gov/rss.xml")
            .max_entries(15)
            .include(&[
                "sb 253",
                "sb253",
                "sb 261",
                "sb261",
                "climate disclosure",
                "greenhouse gas",
                "emissions",
            ])
            .extra_tags(&["California"]),
        official("ifrs-official", "IFRS/ISSB Official", Category::Environmental, "international")
            .feed("https://www.ifrs.org/news-and-events/news.xml")
            .max_entries(10)
            .include(&["issb", "ifrs s1", "ifrs s2", "sustainability", "climate"]),
        official("fca-official", "FCA Official", Category::Environmental, "uk")
            .feed("https://www.fca.org.uk/news/news.rss")
            .max_entries(15)
            .include(&["sdr", "sustainability", "disclosure", "esg", "climate"]),
        official("osc-official", "OSC Official", Category::Environmental, "canada")
            .feed("https://www.osc.ca/en/news-events/news.rss")
            .max_entries(15)
            .include(&["climate", "esg", "sustainability", "disclosure"]),
        SourceDefinition::new("reuters-environmental", "Reuters Legal", Category::Environmental, "international")
            .feed(REUTERS_LEGAL_FEED)
            .include(&[
                "climate",
                "esg",
                "sustainability",
                "greenhouse",
                "emissions",
                "sb 253",
                "sb 261",
                "csrd",
                "greenwashing",
            ])
            .require_action(&[
                "lawsuit",
                "sues",
                "sued",
                "court",
                "judge",
                "injunction",
                "blocks",
                "ruling",
                "settlement",
            ])
            .exclude(REUTERS_ENV_JUNK)
            .jurisdiction_rule("sb 2", "california")
            .priority(Priority::Critical)
            .regulation_type(RegulationType::Enforcement)
            .extra_tags(&["Reuters"]),
        SourceDefinition::new("eeoc-official", "EEOC Official", Category::Social, "eeoc")
            .feed("https://www.eeoc.gov/rss/eeoc.xml")
            .regulation_type(RegulationType::Enforcement),
        SourceDefinition::new("fcc-official", "FCC Official", Category::Social, "fcc")
            .feed("https://www.fcc.gov/news-events/rss/allnews.rss")
            .include(&["diversity", "inclusion", "equal employment", "dei"]),
        SourceDefinition::new("w3c-wai", "W3C WAI", Category::Governance, "wcag")
            .feed("https://www.w3.org/WAI/feed.xml")
            .max_entries(10)
            .include(&["wcag", "guideline", "standard", "accessibility"])
            .regulation_type(RegulationType::Reporting),
        SourceDefinition::new("reuters-social", "Reuters Legal", Category::Social, "federal")
            .feed(REUTERS_LEGAL_FEED)
            .include(&[
                "eeoc",
                "discrimination",
                "diversity",
                "ada",
                "accessibility",
                "pay equity",
                "harassment",
                "fcc",
                "equal employment",
            ])
            .require_action(&[
                "lawsuit",
                "sues",
                "sued",
                "investigation",
                "investigates",
                "settlement",
                "court",
                "judge",
                "ruling",
                "files lawsuit",
                "eeoc files",
                "fcc probes",
                "consent decree",
            ])
            .exclude(&[
                "what companies should know",
                "what employers should know",
                "guide to",
                "how to",
                "countdown to",
                "day 1",
                "laboremploymentlawblog",
                "sheppard, mullin",
            ])
            .priority(Priority::High)
            .regulation_type(RegulationType::Enforcement)
            .extra_tags(&["Reuters"]),
        SourceDefinition::new("doj-ada", "DOJ ADA News", Category::Governance, "ada-doj")
            .feed(GOOGLE_NEWS_SEARCH)
            .queries(&["DOJ ADA web accessibility OR WCAG"])
            .exclude(BACKFILL_JUNK),
    ]
}

/// Regulator feed gated by the general exclusion list.
fn official(id: &str, name: &str, category: Category, jurisdiction: &str) -> SourceDefinition {
    SourceDefinition::new(id, name, category, jurisdiction)
        .exclude(GENERAL_EXCLUSIONS)
        .exclude_unless(STRONG_REGULATORY_TERMS)
}

// ---------------------------------------------------------------------------
// Backfill catalog
// ---------------------------------------------------------------------------

/// Google News searches used to seed the store with historical entries.
pub fn backfill_sources() -> Vec<SourceDefinition> {
    vec![
        backfill("sec-backfill", Category::Environmental, "sec", &[
            "SEC climate disclosure rule",
            "SEC adopts climate OR sustainability",
            "SEC greenwashing enforcement OR charges",
        ]),
        backfill("california-backfill", Category::Environmental, "california", &[
            "SB 253 California climate",
            "SB 261 California climate",
            "\"SB 253\" injunction OR lawsuit",
        ]),
        backfill("eu-backfill", Category::Environmental, "eu", &[
            "CSRD EU sustainability reporting",
            "EU ESRS sustainability standards",
        ]),
        backfill("issb-backfill", Category::Environmental, "international", &[
            "ISSB climate disclosure standard",
            "IFRS S1 OR S2 sustainability",
        ]),
        backfill("uk-backfill", Category::Environmental, "uk", &[
            "UK FCA sustainability disclosure",
        ]),
        backfill("eeoc-backfill", Category::Social, "eeoc", &[
            "EEOC lawsuit OR settlement discrimination",
            "EEOC investigation OR charges",
            "EEOC files lawsuit",
        ]),
        backfill("state-dei-backfill", Category::Social, "state-dei", &[
            "pay transparency law enacted OR passed",
            "pay equity disclosure requirement",
        ]),
        backfill("inclusion-backfill", Category::Social, "inclusion", &[
            "board diversity mandate OR requirement",
            "Nasdaq diversity rule",
        ]),
        backfill("fcc-backfill", Category::Social, "fcc", &[
            "FCC diversity OR investigation DEI",
        ]),
        backfill("ada-backfill", Category::Governance, "ada", &[
            "ADA lawsuit website accessibility",
            "ADA settlement accessibility",
        ]),
        backfill("executive-order-backfill", Category::Social, "executive-order", &[
            "executive order DEI OR diversity",
        ]),
    ]
}

fn backfill(id: &str, category: Category, jurisdiction: &str, queries: &[&str]) -> SourceDefinition {
    SourceDefinition::new(id, "Google News Backfill", category, jurisdiction)
        .feed(GOOGLE_NEWS_SEARCH)
        .queries(queries)
        .max_entries(BACKFILL_MAX_ENTRIES)
        .exclude(BACKFILL_JUNK)
}
