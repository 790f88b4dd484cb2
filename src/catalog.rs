use serde::Deserialize;

/// How to turn search terms into a product URL for one vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlBuilder {
    /// Vendor search page; `{query}` is replaced by the URL-encoded terms.
    Template(String),
    /// No usable search page: go through a web search restricted to the
    /// vendor's host.
    SiteSearch,
}

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub name: String,
    pub keywords: Vec<String>,
    pub homepage: String,
    pub url: UrlBuilder,
}

impl CatalogEntry {
    fn builtin(name: &str, keywords: &[&str], homepage: &str, url: UrlBuilder) -> Self {
        CatalogEntry {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            homepage: homepage.to_string(),
            url,
        }
    }

    pub fn matches(&self, company: &str) -> bool {
        let company = company.to_lowercase();
        self.keywords.iter().any(|k| company.contains(k.as_str()))
    }
}

/// Catalogue entry as written in a config file:
///
/// ```toml
/// [[catalog]]
/// name = "Example Bio"
/// keywords = ["example bio"]
/// homepage = "https://www.example-bio.com"
/// search_url = "https://www.example-bio.com/search?q={query}"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntryConfig {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub homepage: String,
    pub search_url: Option<String>,
}

impl From<CatalogEntryConfig> for CatalogEntry {
    fn from(c: CatalogEntryConfig) -> Self {
        let keywords = if c.keywords.is_empty() {
            vec![c.name.to_lowercase()]
        } else {
            c.keywords.iter().map(|k| k.to_lowercase()).collect()
        };
        CatalogEntry {
            name: c.name,
            keywords,
            homepage: c.homepage,
            url: match c.search_url {
                Some(t) => UrlBuilder::Template(t),
                None => UrlBuilder::SiteSearch,
            },
        }
    }
}

/// Ordered vendor table. Lookup returns the first entry whose keywords match,
/// so more specific names must come before generic ones.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Catalog { entries }
    }

    /// Configured entries first, then the built-in table.
    pub fn with_extra(extra: Vec<CatalogEntryConfig>) -> Self {
        let mut entries: Vec<CatalogEntry> = extra.into_iter().map(CatalogEntry::from).collect();
        entries.extend(builtin_entries());
        Catalog { entries }
    }

    pub fn lookup(&self, company: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.matches(company))
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::new(builtin_entries())
    }
}

fn builtin_entries() -> Vec<CatalogEntry> {
    use UrlBuilder::{SiteSearch, Template};
    let t = |s: &str| Template(s.to_string());

    vec![
        CatalogEntry::builtin(
            "Thermo Fisher Scientific",
            &["thermo fisher", "thermofisher", "life technologies", "invitrogen", "gibco", "applied biosystems"],
            "https://www.thermofisher.com",
            t("https://www.thermofisher.com/search/results?query={query}"),
        ),
        CatalogEntry::builtin(
            "Fisher Scientific",
            &["fisher scientific", "fishersci"],
            "https://www.fishersci.com",
            t("https://www.fishersci.com/us/en/catalog/search/products?keyword={query}"),
        ),
        CatalogEntry::builtin(
            "Sigma-Aldrich",
            &["sigma", "millipore", "merck"],
            "https://www.sigmaaldrich.com",
            t("https://www.sigmaaldrich.com/US/en/search/{query}?focus=products&page=1&perpage=30&sort=relevance&term={query}&type=product"),
        ),
        CatalogEntry::builtin(
            "Abcam",
            &["abcam"],
            "https://www.abcam.com",
            t("https://www.abcam.com/en-us/search?keywords={query}"),
        ),
        CatalogEntry::builtin(
            "Addgene",
            &["addgene"],
            "https://www.addgene.org",
            t("https://www.addgene.org/search/catalog/plasmids/?q={query}"),
        ),
        CatalogEntry::builtin(
            "Bio-Rad Laboratories",
            &["bio-rad", "biorad", "bio rad"],
            "https://www.bio-rad.com",
            t("https://www.bio-rad.com/search?search_api_fulltext={query}"),
        ),
        CatalogEntry::builtin(
            "QIAGEN",
            &["qiagen"],
            "https://www.qiagen.com",
            t("https://www.qiagen.com/us/search?query={query}"),
        ),
        CatalogEntry::builtin(
            "STEMCELL Technologies",
            &["stemcell"],
            "https://www.stemcell.com",
            t("https://www.stemcell.com/catalogsearch/result/?q={query}"),
        ),
        CatalogEntry::builtin(
            "Zymo Research",
            &["zymo"],
            "https://www.zymoresearch.com",
            t("https://www.zymoresearch.com/search?q={query}"),
        ),
        CatalogEntry::builtin(
            "VWR / Avantor",
            &["vwr", "avantor"],
            "https://us.vwr.com",
            t("https://us.vwr.com/store/search?keyword={query}"),
        ),
        CatalogEntry::builtin(
            "Cell Signaling Technology",
            &["cell signaling"],
            "https://www.cellsignal.com",
            t("https://www.cellsignal.com/browse?search={query}"),
        ),
        CatalogEntry::builtin(
            "New England Biolabs",
            &["new england biolabs"],
            "https://www.neb.com",
            SiteSearch,
        ),
        CatalogEntry::builtin(
            "Promega",
            &["promega"],
            "https://www.promega.com",
            t("https://www.promega.com/search-results/?q={query}"),
        ),
        CatalogEntry::builtin(
            "Santa Cruz Biotechnology",
            &["santa cruz"],
            "https://www.scbt.com",
            t("https://www.scbt.com/search?Ntt={query}"),
        ),
        CatalogEntry::builtin(
            "R&D Systems",
            &["r&d systems", "bio-techne", "biotechne"],
            "https://www.rndsystems.com",
            t("https://www.rndsystems.com/search?keywords={query}"),
        ),
        CatalogEntry::builtin(
            "Novus Biologicals",
            &["novus"],
            "https://www.novusbio.com",
            t("https://www.novusbio.com/search?keywords={query}"),
        ),
        CatalogEntry::builtin(
            "Tocris Bioscience",
            &["tocris"],
            "https://www.tocris.com",
            t("https://www.tocris.com/search?keywords={query}"),
        ),
        CatalogEntry::builtin(
            "Agilent Technologies",
            &["agilent"],
            "https://www.agilent.com",
            t("https://www.agilent.com/search/?Ntt={query}"),
        ),
        CatalogEntry::builtin(
            "Takara Bio",
            &["takara", "clontech"],
            "https://www.takarabio.com",
            t("https://www.takarabio.com/search?q={query}"),
        ),
        CatalogEntry::builtin(
            "GenScript",
            &["genscript"],
            "https://www.genscript.com",
            SiteSearch,
        ),
        CatalogEntry::builtin(
            "Integrated DNA Technologies",
            &["integrated dna"],
            "https://www.idtdna.com",
            SiteSearch,
        ),
        CatalogEntry::builtin(
            "BioLegend",
            &["biolegend"],
            "https://www.biolegend.com",
            t("https://www.biolegend.com/en-us/search-results?Keywords={query}"),
        ),
        CatalogEntry::builtin(
            "Cayman Chemical",
            &["cayman"],
            "https://www.caymanchem.com",
            t("https://www.caymanchem.com/search?q={query}"),
        ),
        CatalogEntry::builtin(
            "MedChemExpress",
            &["medchemexpress"],
            "https://www.medchemexpress.com",
            t("https://www.medchemexpress.com/search.html?q={query}"),
        ),
        CatalogEntry::builtin(
            "Selleck Chemicals",
            &["selleck"],
            "https://www.selleckchem.com",
            t("https://www.selleckchem.com/search.html?searchDTO.searchParam={query}"),
        ),
        CatalogEntry::builtin(
            "TCI America",
            &["tci america", "tokyo chemical"],
            "https://www.tcichemicals.com",
            t("https://www.tcichemicals.com/US/en/search/?text={query}"),
        ),
        CatalogEntry::builtin(
            "Proteintech",
            &["proteintech", "ptglab"],
            "https://www.ptglab.com",
            SiteSearch,
        ),
        CatalogEntry::builtin(
            "Jackson ImmunoResearch",
            &["jackson immuno"],
            "https://www.jacksonimmuno.com",
            SiteSearch,
        ),
        CatalogEntry::builtin(
            "Miltenyi Biotec",
            &["miltenyi"],
            "https://www.miltenyibiotec.com",
            SiteSearch,
        ),
        CatalogEntry::builtin(
            "Enzo Life Sciences",
            &["enzo"],
            "https://www.enzolifesciences.com",
            SiteSearch,
        ),
        CatalogEntry::builtin(
            "Lonza",
            &["lonza"],
            "https://bioscience.lonza.com",
            SiteSearch,
        ),
        CatalogEntry::builtin(
            "Corning Life Sciences",
            &["corning"],
            "https://ecatalog.corning.com",
            SiteSearch,
        ),
        CatalogEntry::builtin(
            "Eppendorf",
            &["eppendorf"],
            "https://www.eppendorf.com",
            SiteSearch,
        ),
    ]
}

/// `"name catalog"` search terms, URL-encoded for a query string.
pub fn encode_query(terms: &str) -> String {
    url::form_urlencoded::byte_serialize(terms.as_bytes()).collect()
}

/// Fill a `{query}` template with encoded search terms. Placeholders in the
/// query string are form-encoded; placeholders in the path are
/// percent-encoded, since a `+` there is a literal plus.
pub fn fill_template(template: &str, terms: &str) -> String {
    let query = encode_query(terms);
    // byte_serialize escapes a literal '+' as %2B, so every '+' left is a space
    let segment = query.replace('+', "%20");
    match template.split_once('?') {
        Some((path, params)) => format!(
            "{}?{}",
            path.replace("{query}", &segment),
            params.replace("{query}", &query)
        ),
        None => template.replace("{query}", &segment),
    }
}
